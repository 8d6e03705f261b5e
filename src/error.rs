use std::fmt;

use axum::{response::{IntoResponse, Response}, http::StatusCode};
use tracing::error;

#[non_exhaustive]
#[derive(Clone, Debug)]
pub enum InvalidTokenError {
	/// The assertion header is not a visible ASCII string.
	Malformed,
	Decode(jsonwebtoken::errors::Error),
	/// JWT missing the `kid` header.
	KeyIdMissing,
	/// Signing key lookup using `kid` header failed for JWT.
	UnknownSigner,
	NoSigners,
	/// The public key set could not be retrieved.
	KeyFetch(String),
	/// `iat` is further in the future than the allowed clock skew.
	UsedTooEarly,
	/// `exp` is a day or more in the future.
	ExpiresTooLate,
}

impl fmt::Display for InvalidTokenError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			InvalidTokenError::Malformed => write!(f, "Malformed"),
			InvalidTokenError::Decode(err) => write!(f, "Decode error: {}", err),
			InvalidTokenError::KeyIdMissing => write!(f, "Missing 'kid'"),
			InvalidTokenError::UnknownSigner => write!(f, "Unknown signer"),
			InvalidTokenError::NoSigners => write!(f, "No signer keys"),
			InvalidTokenError::KeyFetch(err) => write!(f, "Public key fetch failed: {}", err),
			InvalidTokenError::UsedTooEarly => write!(f, "Token used too early"),
			InvalidTokenError::ExpiresTooLate => write!(f, "Expiration time too far in future"),
		}
	}
}

#[non_exhaustive]
#[derive(Clone, Debug)]
pub enum MetadataError {
	Request(String),
	Status(u16),
	/// The response did not carry `Metadata-Flavor: Google`.
	NotMetadataServer,
}

impl fmt::Display for MetadataError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			MetadataError::Request(err) => write!(f, "Metadata request failed: {}", err),
			MetadataError::Status(status) => write!(f, "Metadata server returned {}", status),
			MetadataError::NotMetadataServer => write!(f, "Response is not from the metadata server"),
		}
	}
}

impl From<reqwest::Error> for MetadataError {
	fn from(error: reqwest::Error) -> Self {
		Self::Request(error.to_string())
	}
}

#[non_exhaustive]
#[derive(Clone, Debug)]
pub enum RequestError {
	/// The assertion did not verify.
	InvalidToken(InvalidTokenError),
	/// The expected audience could not be discovered.
	Discovery(MetadataError),
}

impl fmt::Display for RequestError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RequestError::InvalidToken(err) => write!(f, "Invalid token: {}", err),
			RequestError::Discovery(err) => write!(f, "Audience discovery failed: {}", err),
		}
	}
}

impl From<InvalidTokenError> for RequestError {
	fn from(error: InvalidTokenError) -> Self {
		Self::InvalidToken(error)
	}
}

impl From<MetadataError> for RequestError {
	fn from(error: MetadataError) -> Self {
		Self::Discovery(error)
	}
}

/// Callers only ever see a bare 500; the reason stays in the server log.
impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        error!("{}", self);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}
