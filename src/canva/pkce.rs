//! PKCE verifier / challenge generation (RFC 7636, S256)

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Random bytes behind a code verifier; encodes to 86 characters
const VERIFIER_BYTES: usize = 64;
/// Random bytes behind the `state` parameter
const STATE_BYTES: usize = 24;

pub const CHALLENGE_METHOD: &str = "S256";

/// A code verifier and the challenge derived from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkcePair {
    pub verifier: String,
    pub challenge: String,
}

impl PkcePair {
    pub fn generate() -> Self {
        let verifier = random_token(VERIFIER_BYTES);
        let challenge = challenge_for(&verifier);
        Self { verifier, challenge }
    }
}

/// base64url(SHA-256(verifier)) without padding
pub fn challenge_for(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Opaque anti-CSRF value for the authorize redirect
pub fn generate_state() -> String {
    random_token(STATE_BYTES)
}

fn random_token(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
