//! Signed bearer tokens with an embedded expiry.
//!
//! # Responsibility
//! - Issue opaque bearer credentials after a successful start flow.
//! - Verify presented credentials back into an owner id.
//!
//! # Invariants
//! - A token is valid only until the expiry encoded inside it.
//! - Tampering with payload or signature is rejected before expiry checks.
//! - The signing key never appears inside the token.

use crate::model::user::UserId;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use uuid::Uuid;

const KEY_LEN: usize = 32;

/// Credential validity window: seven days.
pub const TOKEN_TTL_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Current wall-clock time as unix epoch milliseconds.
pub fn now_unix_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Why a presented token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Malformed,
    BadSignature,
    Expired,
}

impl Display for TokenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed => write!(f, "token is malformed"),
            Self::BadSignature => write!(f, "token signature does not verify"),
            Self::Expired => write!(f, "token has expired"),
        }
    }
}

impl Error for TokenError {}

/// Failure loading or creating the signing key file.
#[derive(Debug)]
pub enum TokenKeyError {
    Io(std::io::Error),
    Decode(base64::DecodeError),
    InvalidLength(usize),
}

impl Display for TokenKeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Decode(err) => write!(f, "decode error: {err}"),
            Self::InvalidLength(len) => {
                write!(f, "signing key must be {KEY_LEN} bytes, got {len}")
            }
        }
    }
}

impl Error for TokenKeyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Decode(err) => Some(err),
            Self::InvalidLength(_) => None,
        }
    }
}

impl From<std::io::Error> for TokenKeyError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<base64::DecodeError> for TokenKeyError {
    fn from(value: base64::DecodeError) -> Self {
        Self::Decode(value)
    }
}

/// Issues and verifies bearer tokens with a fixed signing key.
#[derive(Clone)]
pub struct TokenSigner {
    key: [u8; KEY_LEN],
}

impl TokenSigner {
    pub fn new(key: [u8; KEY_LEN]) -> Self {
        Self { key }
    }

    /// Loads the signing key from `path`, creating a random one on first use.
    ///
    /// The key file is written with owner-only permissions on unix.
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self, TokenKeyError> {
        let path = path.as_ref();
        if path.exists() {
            let encoded = fs::read_to_string(path)?;
            let decoded = BASE64.decode(encoded.trim().as_bytes())?;
            let len = decoded.len();
            let key: [u8; KEY_LEN] = decoded
                .try_into()
                .map_err(|_| TokenKeyError::InvalidLength(len))?;
            return Ok(Self::new(key));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        write_new_file_restricted(path, BASE64.encode(key).as_bytes())?;
        Ok(Self::new(key))
    }

    /// Issues a token for `user` valid for [`TOKEN_TTL_MS`] from `now_ms`.
    pub fn issue(&self, user: UserId, now_ms: i64) -> String {
        let payload = format!("{user}:{}", now_ms + TOKEN_TTL_MS);
        let signature = self.sign(payload.as_bytes());
        format!(
            "{}.{}",
            BASE64.encode(payload.as_bytes()),
            BASE64.encode(signature)
        )
    }

    /// Verifies a presented token and returns the owner it was issued for.
    ///
    /// # Errors
    /// - `Malformed` when the token does not decode into payload + signature.
    /// - `BadSignature` when the signature does not match the payload.
    /// - `Expired` when the embedded expiry is at or before `now_ms`.
    pub fn verify(&self, token: &str, now_ms: i64) -> Result<UserId, TokenError> {
        let (payload_b64, signature_b64) =
            token.split_once('.').ok_or(TokenError::Malformed)?;
        let payload = BASE64
            .decode(payload_b64.as_bytes())
            .map_err(|_| TokenError::Malformed)?;
        let signature = BASE64
            .decode(signature_b64.as_bytes())
            .map_err(|_| TokenError::Malformed)?;

        let expected = self.sign(&payload);
        if !constant_time_eq(&signature, &expected) {
            return Err(TokenError::BadSignature);
        }

        let payload = String::from_utf8(payload).map_err(|_| TokenError::Malformed)?;
        let (user_text, expiry_text) = payload.split_once(':').ok_or(TokenError::Malformed)?;
        let user = Uuid::parse_str(user_text).map_err(|_| TokenError::Malformed)?;
        let expires_at_ms: i64 = expiry_text.parse().map_err(|_| TokenError::Malformed)?;

        if expires_at_ms <= now_ms {
            return Err(TokenError::Expired);
        }
        Ok(user)
    }

    fn sign(&self, payload: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.key);
        hasher.update([0x1f]);
        hasher.update(payload);
        let mut signature = [0u8; 32];
        signature.copy_from_slice(&hasher.finalize());
        signature
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

fn write_new_file_restricted(path: &Path, data: &[u8]) -> Result<(), TokenKeyError> {
    let mut file = OpenOptions::new().create_new(true).write(true).open(path)?;
    file.write_all(data)?;
    file.flush()?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{TokenError, TokenSigner, TOKEN_TTL_MS};
    use uuid::Uuid;

    fn signer() -> TokenSigner {
        TokenSigner::new([7u8; 32])
    }

    #[test]
    fn issue_then_verify_returns_owner() {
        let user = Uuid::new_v4();
        let token = signer().issue(user, 1_000);
        assert_eq!(signer().verify(&token, 2_000), Ok(user));
    }

    #[test]
    fn token_expires_after_ttl() {
        let user = Uuid::new_v4();
        let token = signer().issue(user, 1_000);
        let err = signer().verify(&token, 1_000 + TOKEN_TTL_MS).unwrap_err();
        assert_eq!(err, TokenError::Expired);
    }

    #[test]
    fn tampered_payload_is_rejected_before_expiry_check() {
        let user = Uuid::new_v4();
        let token = signer().issue(user, 1_000);
        let (_, signature) = token.split_once('.').unwrap();
        let forged = format!("AAAA.{signature}");
        assert_eq!(
            signer().verify(&forged, 2_000),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn token_from_other_key_is_rejected() {
        let user = Uuid::new_v4();
        let token = TokenSigner::new([9u8; 32]).issue(user, 1_000);
        assert_eq!(signer().verify(&token, 2_000), Err(TokenError::BadSignature));
    }

    #[test]
    fn garbage_tokens_are_malformed() {
        assert_eq!(signer().verify("", 0), Err(TokenError::Malformed));
        assert_eq!(signer().verify("no-dot", 0), Err(TokenError::Malformed));
        assert_eq!(signer().verify("*bad*.*bad*", 0), Err(TokenError::Malformed));
    }

    #[test]
    fn load_or_create_roundtrips_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.key");

        let first = TokenSigner::load_or_create(&path).unwrap();
        let second = TokenSigner::load_or_create(&path).unwrap();

        let user = Uuid::new_v4();
        let token = first.issue(user, 1_000);
        assert_eq!(second.verify(&token, 2_000), Ok(user));
    }
}
