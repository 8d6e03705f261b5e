use clap::Parser;
use reqwest::Url;
use std::{
    env,
    net::{AddrParseError, IpAddr, SocketAddr},
};

use crate::{assertion::IAP_ISSUER, jwks::IAP_PUBLIC_KEYS_URL, metadata::Detection};

const DEFAULT_PORT: u16 = 8080;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Server socket; a bare IP listens on $PORT
    #[arg(short, long, env = "HOST", value_parser=parse_bind_addr, value_name = "ADDRESS", default_value = "0.0.0.0")]
    pub bind: SocketAddr,

    /// Expected `iss` claim of assertions
    #[arg(long, env = "IAP_ISSUER", default_value = IAP_ISSUER)]
    pub issuer: String,

    /// JWK set holding the assertion signing keys
    #[arg(long, env = "IAP_PUBLIC_KEYS_URL", default_value = IAP_PUBLIC_KEYS_URL)]
    pub public_keys_url: Url,

    /// Metadata server host used to discover the project
    #[arg(long, env = "GCE_METADATA_HOST", default_value = "metadata.google.internal")]
    pub metadata_host: String,

    /// How to detect the metadata server
    #[arg(long, env = "METADATA_SERVER_DETECTION", value_enum, default_value_t = Detection::Ping)]
    pub metadata_detection: Detection,

    /// Timeout in seconds for each outbound request
    #[arg(long, env = "OUTBOUND_TIMEOUT_SECS", default_value_t = 10)]
    pub outbound_timeout_secs: u64,
}

fn parse_bind_addr(s: &str) -> Result<SocketAddr, AddrParseError> {
    s.parse()
        .or_else(|_| -> Result<SocketAddr, AddrParseError> {
            let ip: IpAddr = s.parse()?;
            let port: u16 = env::var("PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(DEFAULT_PORT);

            Ok(SocketAddr::new(ip, port))
        })
}
