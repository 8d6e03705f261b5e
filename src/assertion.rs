use crate::{
    audience::AudienceResolver,
    error::{InvalidTokenError, RequestError},
    jwks::KeyProvider,
};
use jsonwebtoken::{decode, get_current_timestamp, Algorithm, Validation};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

pub const IAP_ISSUER: &str = "https://cloud.google.com/iap";

/// Allowed drift on `exp`, `nbf` and `iat`.
const CLOCK_SKEW_SECS: u64 = 300;

/// Assertions must expire less than a day from now.
const MAX_TOKEN_LIFETIME_SECS: u64 = 86400;

/// Signed header payload
///
/// See <https://cloud.google.com/iap/docs/signed-headers-howto#verifying_the_jwt_payload>
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Claims {
    #[cfg(test)]
    pub aud: String,
    pub exp: u64,
    pub iat: u64,
    #[cfg(test)]
    pub iss: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
}

/// The authenticated principal, empty when no assertion was presented.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub email: Option<String>,
    pub sub: Option<String>,
}

/// Renders as `"{email} {sub}"`, with `undefined` standing in for a missing field.
impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let email = self.email.as_deref().unwrap_or("undefined");
        let sub = self.sub.as_deref().unwrap_or("undefined");
        write!(f, "{} {}", email, sub)
    }
}

pub struct AssertionValidator {
    audience: AudienceResolver,
    keys: Arc<dyn KeyProvider>,
    issuer: String,
}

impl AssertionValidator {
    pub fn new(audience: AudienceResolver, keys: Arc<dyn KeyProvider>, issuer: &str) -> Self {
        Self {
            audience,
            keys,
            issuer: issuer.to_owned(),
        }
    }

    pub async fn validate(&self, assertion: Option<&str>) -> Result<Identity, RequestError> {
        let Some(assertion) = assertion.filter(|assertion| !assertion.is_empty()) else {
            return Ok(Identity::default());
        };

        let audience = self.audience.resolve().await?;

        let mut validation = Validation::new(Algorithm::ES256);
        validation.leeway = CLOCK_SKEW_SECS;
        validation.set_issuer(&[&self.issuer]);
        match audience {
            Some(audience) => {
                validation.set_audience(&[audience]);
                validation.set_required_spec_claims(&["exp", "iss", "aud"]);
            }
            // Without a known audience any `aud` is accepted.
            None => {
                validation.validate_aud = false;
                validation.set_required_spec_claims(&["exp", "iss"]);
            }
        }

        let key = self.keys.public_keys().await?.get_key_from_jwt(assertion)?;
        let token = decode::<Claims>(assertion, &key, &validation).map_err(InvalidTokenError::Decode)?;

        let now = get_current_timestamp();
        if token.claims.iat > now + CLOCK_SKEW_SECS {
            return Err(InvalidTokenError::UsedTooEarly.into());
        }
        if token.claims.exp >= now + MAX_TOKEN_LIFETIME_SECS {
            return Err(InvalidTokenError::ExpiresTooLate.into());
        }

        Ok(Identity {
            email: token.claims.email,
            sub: token.claims.sub,
        })
    }
}
