use crate::config::settings::AuthConfig;
use crate::{Error, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier};
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// Ed25519 seed length in bytes
pub const SEED_SIZE: usize = 32;

#[derive(Debug, ThisError)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    BadSignature,

    #[error("token has expired")]
    Expired,
}

impl From<TokenError> for Error {
    fn from(e: TokenError) -> Self {
        Error::Forbidden(e.to_string())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id the token was issued for
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies bearer tokens of the form
/// `base64url(claims JSON) . base64url(ed25519 signature)`.
///
/// Issuance is stateless: no session record is kept and tokens cannot
/// be revoked before they expire.
#[derive(Clone)]
pub struct TokenSigner {
    signing_key: SigningKey,
    ttl_secs: i64,
}

impl TokenSigner {
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        let seed: [u8; SEED_SIZE] = match &config.signing_key {
            Some(hex_seed) => {
                let bytes = hex::decode(hex_seed)
                    .map_err(|e| Error::Internal(format!("invalid auth.signing_key hex: {}", e)))?;
                bytes.try_into().map_err(|_| {
                    Error::Internal(format!(
                        "auth.signing_key must be {} bytes of hex",
                        SEED_SIZE
                    ))
                })?
            }
            None => {
                warn!("no auth.signing_key configured, using an ephemeral key; tokens will not survive a restart");
                rand::random::<[u8; SEED_SIZE]>()
            }
        };

        Ok(Self {
            signing_key: SigningKey::from_bytes(&seed),
            ttl_secs: config.token_ttl_days as i64 * 24 * 60 * 60,
        })
    }

    pub fn issue(&self, user_id: &str) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.ttl_secs,
        };

        let payload = serde_json::to_vec(&claims).map_err(|e| Error::Internal(e.to_string()))?;
        let signature = self.signing_key.sign(&payload);

        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(signature.to_bytes())
        ))
    }

    pub fn verify(&self, token: &str) -> std::result::Result<Claims, TokenError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    fn verify_at(&self, token: &str, now: i64) -> std::result::Result<Claims, TokenError> {
        let (payload_b64, signature_b64) = token.split_once('.').ok_or(TokenError::Malformed)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| TokenError::Malformed)?;
        let signature_bytes: [u8; 64] = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::Malformed)?
            .try_into()
            .map_err(|_| TokenError::Malformed)?;

        let signature = Signature::from_bytes(&signature_bytes);
        self.signing_key
            .verifying_key()
            .verify(&payload, &signature)
            .map_err(|_| TokenError::BadSignature)?;

        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

        if claims.exp < now {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::from_config(&AuthConfig {
            signing_key: Some(hex::encode([7u8; SEED_SIZE])),
            token_ttl_days: 30,
        })
        .unwrap()
    }

    #[test]
    fn issued_token_verifies_and_carries_subject() {
        let signer = signer();
        let token = signer.issue("64f000000000000000000001").unwrap();

        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.sub, "64f000000000000000000001");
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 60 * 60);
    }

    #[test]
    fn expired_token_is_rejected() {
        let signer = signer();
        let token = signer.issue("user").unwrap();
        let past_expiry = Utc::now().timestamp() + 31 * 24 * 60 * 60;

        assert!(matches!(
            signer.verify_at(&token, past_expiry),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let signer = signer();
        let token = signer.issue("user").unwrap();

        let (_, signature) = token.split_once('.').unwrap();
        let forged_claims = serde_json::json!({
            "sub": "someone-else",
            "iat": 0,
            "exp": i64::MAX,
        });
        let forged = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(forged_claims.to_string()),
            signature
        );

        assert!(matches!(
            signer.verify(&forged),
            Err(TokenError::BadSignature)
        ));
    }

    #[test]
    fn token_from_another_key_is_rejected() {
        let other = TokenSigner::from_config(&AuthConfig {
            signing_key: Some(hex::encode([9u8; SEED_SIZE])),
            token_ttl_days: 30,
        })
        .unwrap();

        let token = other.issue("user").unwrap();
        assert!(matches!(
            signer().verify(&token),
            Err(TokenError::BadSignature)
        ));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let signer = signer();

        assert!(matches!(signer.verify(""), Err(TokenError::Malformed)));
        assert!(matches!(
            signer.verify("no-separator"),
            Err(TokenError::Malformed)
        ));
        assert!(matches!(
            signer.verify("!!!.???"),
            Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn rejects_wrong_seed_length() {
        let result = TokenSigner::from_config(&AuthConfig {
            signing_key: Some("abcd".to_string()),
            token_ttl_days: 30,
        });

        assert!(matches!(result, Err(Error::Internal(_))));
    }
}
