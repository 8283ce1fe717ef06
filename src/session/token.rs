//! Signed session tokens.
//!
//! # Responsibilities
//! - Mint `id.signature` tokens from a CSPRNG id and an HMAC-SHA256 tag
//! - Verify presented tokens without ever panicking on malformed input
//! - Resolve the signing secret per deployment mode
//!
//! # Design Decisions
//! - Verification failures return None, never an error: malformed
//!   client input must not disturb handler control flow
//! - Signature comparison is constant-time (subtle) to resist timing
//!   probes against the HMAC tag
//! - base64url without padding keeps tokens cookie-safe

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::config::Environment;

type HmacSha256 = Hmac<Sha256>;

/// Random id length in bytes, before base64 encoding.
pub const SESSION_ID_BYTES: usize = 16;

/// Minimum secret length accepted in production.
pub const MIN_SECRET_LEN: usize = 16;

/// Separator between the id and signature portions of a token.
const SEPARATOR: char = '.';

/// Fixed fallback secret for local development only.
const DEV_SECRET: &str = "dev-session-secret-min-16ch";

/// Raised when production runs without a usable signing secret.
#[derive(Debug, Error)]
#[error("session secret must be set to at least {MIN_SECRET_LEN} characters in production")]
pub struct SecretError;

/// Mints and verifies signed session tokens.
pub struct TokenSigner {
    secret: Vec<u8>,
}

impl TokenSigner {
    /// Resolve the signing secret for the given deployment mode.
    ///
    /// A missing or short secret is fatal in production. Development
    /// substitutes a fixed local secret so the gateway stays usable
    /// without any environment setup.
    pub fn new(environment: Environment, secret: Option<&str>) -> Result<Self, SecretError> {
        match secret {
            Some(secret) if secret.len() >= MIN_SECRET_LEN => Ok(Self {
                secret: secret.as_bytes().to_vec(),
            }),
            _ if environment.is_production() => Err(SecretError),
            _ => Ok(Self {
                secret: DEV_SECRET.as_bytes().to_vec(),
            }),
        }
    }

    /// Mint a fresh token: random id, HMAC-SHA256 signature, joined
    /// as `id.signature` in unpadded base64url.
    pub fn create_token(&self) -> String {
        let mut id_bytes = [0u8; SESSION_ID_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut id_bytes);
        let id = URL_SAFE_NO_PAD.encode(id_bytes);
        let signature = URL_SAFE_NO_PAD.encode(self.sign(&id));
        format!("{id}{SEPARATOR}{signature}")
    }

    /// Verify a presented token and return the embedded session id.
    ///
    /// Rejects tokens with no separator, an empty id, or an empty
    /// signature; otherwise recomputes the expected signature and
    /// compares in constant time. Returns None on any failure.
    pub fn verify_token(&self, token: &str) -> Option<String> {
        let idx = token.find(SEPARATOR)?;
        if idx == 0 || idx == token.len() - 1 {
            return None;
        }

        let (id, signature) = (&token[..idx], &token[idx + 1..]);
        let provided = URL_SAFE_NO_PAD.decode(signature).ok()?;
        let expected = self.sign(id);

        if provided.len() != expected.len() {
            return None;
        }
        bool::from(provided.ct_eq(&expected)).then(|| id.to_string())
    }

    fn sign(&self, id: &str) -> [u8; 32] {
        // HMAC accepts keys of any length, so this cannot fail.
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC key length is unrestricted");
        mac.update(id.as_bytes());
        mac.finalize().into_bytes().into()
    }
}
