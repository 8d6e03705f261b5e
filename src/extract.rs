use axum::{async_trait, extract::FromRequestParts, http::{request::Parts, HeaderName}};

use crate::error::{InvalidTokenError, RequestError};

static IAP_JWT_ASSERTION: HeaderName = HeaderName::from_static("x-goog-iap-jwt-assertion");

/// The `X-Goog-IAP-JWT-Assertion` header, if the request carries one.
pub struct ExtractAssertionToken(pub(crate) Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for ExtractAssertionToken
where
    S: Send + Sync,
{
    type Rejection = RequestError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(&IAP_JWT_ASSERTION) else {
            return Ok(Self(None));
        };

        let token = value
            .to_str()
            .map_err(|_| RequestError::InvalidToken(InvalidTokenError::Malformed))?;

        Ok(Self(Some(token.to_owned())))
    }
}
