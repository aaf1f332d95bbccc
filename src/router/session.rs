//! Router admin session token (`urn` cookie)
//!
//! Generated the same way the router's own login page does it, alphabet typos included.
//! The firmware only checks that the cookie is stable across requests, so this is a
//! compatibility shim and not a secret.

use rand::Rng;

/// Alphabet used by the firmware's `randomString()`. Missing `Y` and `j`, `T` appears twice.
const FIRMWARE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXTZabcdefghiklmnopqrstuvwxyz";

/// Default token length used by the admin panel
pub const SESSION_TOKEN_LEN: usize = 16;

/// Per-client pseudo-session identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn generate() -> Self {
        Self(random_string(SESSION_TOKEN_LEN))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Cookie header value carried on every admin request
    pub fn cookie(&self) -> String {
        format!("urn={}; logout=not", self.0)
    }
}

/// A zero length picks a random length below the alphabet size, like the firmware.
pub fn random_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    let length = if length == 0 {
        rng.gen_range(0..FIRMWARE_ALPHABET.len())
    } else {
        length
    };

    (0..length)
        .map(|_| FIRMWARE_ALPHABET[rng.gen_range(0..FIRMWARE_ALPHABET.len())] as char)
        .collect()
}
