use crate::models::CallerIdentity;
use crate::ports::IdentityVerifier;
use anyhow::Result;
use async_trait::async_trait;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Reference identity hook (spec §6): verifies a bearer JWT and maps its
/// claims to a `CallerIdentity`. A real deployment swaps this adapter for
/// whatever its external auth provider issues.
pub struct JwtIdentityVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct Claims {
    sub: String,
    exp: usize,
    #[serde(default)]
    role: Option<String>,
}

impl JwtIdentityVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }
}

#[async_trait]
impl IdentityVerifier for JwtIdentityVerifier {
    async fn verify(&self, bearer: &str) -> Result<Option<CallerIdentity>> {
        let token_data = match decode::<Claims>(bearer, &self.decoding_key, &self.validation) {
            Ok(data) => data,
            Err(e) => {
                debug!(error = %e, "bearer token failed verification");
                return Ok(None);
            }
        };

        let claims = token_data.claims;
        if claims.role.as_deref() == Some("internal") {
            return Ok(Some(CallerIdentity::Internal));
        }

        Ok(Some(CallerIdentity::User(claims.sub)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn token(secret: &str, sub: &str, role: Option<&str>) -> String {
        let exp = (SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() + 3600) as usize;
        let claims = Claims { sub: sub.to_string(), exp, role: role.map(|r| r.to_string()) };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[tokio::test]
    async fn verifies_user_token() {
        let verifier = JwtIdentityVerifier::new("test-secret");
        let bearer = token("test-secret", "user-42", None);

        let identity = verifier.verify(&bearer).await.unwrap();
        assert_eq!(identity, Some(CallerIdentity::User("user-42".to_string())));
    }

    #[tokio::test]
    async fn verifies_internal_token() {
        let verifier = JwtIdentityVerifier::new("test-secret");
        let bearer = token("test-secret", "service-a", Some("internal"));

        let identity = verifier.verify(&bearer).await.unwrap();
        assert_eq!(identity, Some(CallerIdentity::Internal));
    }

    #[tokio::test]
    async fn rejects_bad_signature() {
        let verifier = JwtIdentityVerifier::new("test-secret");
        let bearer = token("wrong-secret", "user-42", None);

        let identity = verifier.verify(&bearer).await.unwrap();
        assert_eq!(identity, None);
    }
}
