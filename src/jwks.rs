use crate::error::InvalidTokenError;
use axum::async_trait;
use jsonwebtoken::{decode_header, jwk::{Jwk, JwkSet}, DecodingKey};
use reqwest::Url;

/// IAP signing keys
///
/// See <https://cloud.google.com/iap/docs/signed-headers-howto#verifying_the_jwt_payload>
pub const IAP_PUBLIC_KEYS_URL: &str = "https://www.gstatic.com/iap/verify/public_key-jwk";

/// Source of the keys that assertions are signed with.
#[async_trait]
pub trait KeyProvider: Send + Sync {
    async fn public_keys(&self) -> Result<Signers, InvalidTokenError>;
}

/// Fetches the published key set on every call; keys rotate and nothing is cached.
pub struct IapPublicKeys {
    client: reqwest::Client,
    uri: Url,
}

impl IapPublicKeys {
    pub fn new(client: reqwest::Client, uri: Url) -> Self {
        IapPublicKeys { client, uri }
    }
}

#[async_trait]
impl KeyProvider for IapPublicKeys {
    async fn public_keys(&self) -> Result<Signers, InvalidTokenError> {
        let fetch = |err: reqwest::Error| InvalidTokenError::KeyFetch(err.to_string());

        let response = self
            .client
            .get(self.uri.clone())
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(fetch)?;

        let jwk_set = response.json::<JwkSet>().await.map_err(fetch)?;

        Ok(Signers::from(jwk_set))
    }
}

/// A snapshot of the signing keys, indexed by `kid`.
#[derive(Debug, Clone)]
pub struct Signers {
    keys: Vec<Jwk>,
}

impl From<JwkSet> for Signers {
    fn from(set: JwkSet) -> Self {
        Self { keys: set.keys }
    }
}

impl Signers {
    pub fn get_key_from_jwt(&self, token: &str) -> Result<DecodingKey, InvalidTokenError> {
        let header = decode_header(token).map_err(InvalidTokenError::Decode)?;
        let Some(kid) = header.kid else {
            return Err(InvalidTokenError::KeyIdMissing);
        };

        self.get_key(&kid)
    }

    fn get_key(&self, kid: &str) -> Result<DecodingKey, InvalidTokenError> {
        let Some(jwk) = self.find(kid)? else {
            return Err(InvalidTokenError::UnknownSigner);
        };

        DecodingKey::from_jwk(jwk).map_err(InvalidTokenError::Decode)
    }

    /// Find the key in the set that matches the given key id, if any.
    fn find(&self, kid: &str) -> Result<Option<&Jwk>, InvalidTokenError> {
        if self.keys.is_empty() {
            return Err(InvalidTokenError::NoSigners);
        }

        Ok(self
            .keys
            .iter()
            .find(|jwk| jwk.common.key_id.as_deref() == Some(kid)))
    }
}
