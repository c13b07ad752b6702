//! Signed Token Codec
//!
//! Compact tamper-evident credential binding an email address to the moment it
//! was issued. Wire form: `base64(email:issuedAtMillis) + "." + hex(hmac)`.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::clock::Clock;

type HmacSha256 = Hmac<Sha256>;

/// Maximum token age: 30 days in milliseconds.
pub const TOKEN_MAX_AGE_MS: i64 = 30 * 24 * 60 * 60 * 1000;

/// Length of a hex-encoded HMAC-SHA256 digest.
const SIGNATURE_HEX_LEN: usize = 64;

// == Signed Token ==
/// A decoded credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken {
    pub subject_email: String,
    pub issued_at_millis: i64,
    /// Lowercase hex HMAC-SHA256 over `subject_email:issued_at_millis`
    pub signature: String,
}

impl SignedToken {
    /// Serializes to the cookie wire form.
    pub fn encode(&self) -> String {
        let payload = format!("{}:{}", self.subject_email, self.issued_at_millis);
        format!("{}.{}", STANDARD.encode(payload), self.signature)
    }
}

// == Verification Result ==
/// Outcome of [`TokenCodec::verify`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenVerification {
    pub valid: bool,
    pub email: Option<String>,
}

impl TokenVerification {
    fn invalid() -> Self {
        Self::default()
    }
}

// == Token Codec ==
/// Issues and verifies signed tokens under a server secret.
#[derive(Clone)]
pub struct TokenCodec {
    mac: HmacSha256,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Creates a codec keyed with `secret`.
    pub fn new(secret: impl AsRef<[u8]>, clock: Arc<dyn Clock>) -> Self {
        let mac = HmacSha256::new_from_slice(secret.as_ref())
            .expect("HMAC-SHA256 accepts keys of any length");
        Self { mac, clock }
    }

    /// Issues a token for `email` stamped with the current time.
    pub fn issue(&self, email: &str) -> String {
        self.sign(email, self.clock.now_millis()).encode()
    }

    /// Builds a token for `email` stamped with `issued_at_millis`.
    pub fn sign(&self, email: &str, issued_at_millis: i64) -> SignedToken {
        let payload = format!("{}:{}", email, issued_at_millis);
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());

        SignedToken {
            subject_email: email.to_string(),
            issued_at_millis,
            signature: hex::encode(mac.finalize().into_bytes()),
        }
    }

    /// Verifies a token. Never fails: anything malformed is simply invalid.
    pub fn verify(&self, token: &str) -> TokenVerification {
        match self.decode(token) {
            Some(decoded) => TokenVerification {
                valid: true,
                email: Some(decoded.subject_email),
            },
            None => TokenVerification::invalid(),
        }
    }

    /// Returns the decoded token if it is authentic and not expired.
    pub fn decode(&self, token: &str) -> Option<SignedToken> {
        let (payload_b64, signature) = token.rsplit_once('.')?;

        if signature.len() != SIGNATURE_HEX_LEN
            || !signature
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return None;
        }

        let payload = STANDARD.decode(payload_b64).ok()?;
        let expected = hex::decode(signature).ok()?;

        let mut mac = self.mac.clone();
        mac.update(&payload);
        mac.verify_slice(&expected).ok()?;

        let payload = String::from_utf8(payload).ok()?;
        let (email, issued_at) = payload.rsplit_once(':')?;
        if email.is_empty() {
            return None;
        }
        let issued_at_millis: i64 = issued_at.parse().ok()?;

        let age = self.clock.now_millis().checked_sub(issued_at_millis)?;
        if !(0..=TOKEN_MAX_AGE_MS).contains(&age) {
            return None;
        }

        Some(SignedToken {
            subject_email: email.to_string(),
            issued_at_millis,
            signature: signature.to_string(),
        })
    }
}
