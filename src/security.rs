use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compare a provided admin key against the configured one in constant time
///
/// Both keys are run through HMAC-SHA256 keyed with the configured secret,
/// and the tags are compared with `verify_slice`, so neither the length
/// nor the content of the secret leaks through timing.
pub fn verify_admin_key(provided: &str, expected: &str) -> bool {
    if expected.is_empty() {
        return false;
    }

    let expected_tag = match HmacSha256::new_from_slice(expected.as_bytes()) {
        Ok(mut mac) => {
            mac.update(expected.as_bytes());
            mac.finalize().into_bytes()
        }
        Err(_) => {
            tracing::error!("Failed to create HMAC instance");
            return false;
        }
    };

    let mut mac = match HmacSha256::new_from_slice(expected.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            tracing::error!("Failed to create HMAC instance");
            return false;
        }
    };
    mac.update(provided.as_bytes());

    mac.verify_slice(&expected_tag).is_ok()
}
