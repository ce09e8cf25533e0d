use base64::Engine as _;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed OAuth state, in seconds.
pub const STATE_MAX_AGE_SECS: i64 = 600;

/// Helper to create an HMAC instance, resolving trait ambiguity.
fn new_hmac(key: &[u8]) -> Result<HmacSha256, AppError> {
    <HmacSha256 as Mac>::new_from_slice(key)
        .map_err(|e| AppError::Internal(format!("HMAC init failed: {e}")))
}

/// Signs and verifies the OAuth `state` parameter.
///
/// The key is SHA-256 of the configured session secret, so any secret length works.
pub struct StateSigner {
    hmac_key: Vec<u8>,
}

impl StateSigner {
    pub fn new(session_secret: &str) -> Self {
        let hmac_key = Sha256::digest(session_secret.as_bytes()).to_vec();
        Self { hmac_key }
    }

    /// Issue a fresh state for a login started at `now` (Unix seconds).
    /// Returns base64url(hmac || "nonce:timestamp").
    pub fn issue(&self, now: i64) -> Result<String, AppError> {
        let mut nonce = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut nonce);
        let nonce = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(nonce);
        self.sign(&format!("{nonce}:{now}"))
    }

    /// Verify a state returned by the provider and check it is not older than
    /// [`STATE_MAX_AGE_SECS`].
    pub fn verify(&self, signed: &str, now: i64) -> Result<(), AppError> {
        let payload = self.open(signed)?;
        let issued_at: i64 = payload
            .rsplit_once(':')
            .and_then(|(_, ts)| ts.parse().ok())
            .ok_or_else(|| AppError::Authorization("malformed state parameter".into()))?;

        if now - issued_at > STATE_MAX_AGE_SECS {
            return Err(AppError::Authorization("login session expired".into()));
        }
        Ok(())
    }

    fn sign(&self, payload: &str) -> Result<String, AppError> {
        let mut mac = new_hmac(&self.hmac_key)?;
        mac.update(payload.as_bytes());
        let signature = mac.finalize().into_bytes();

        let mut combined = signature.to_vec();
        combined.extend_from_slice(payload.as_bytes());

        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&combined))
    }

    fn open(&self, signed: &str) -> Result<String, AppError> {
        let invalid = || AppError::Authorization("invalid state parameter".into());

        let combined = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(signed)
            .map_err(|_| invalid())?;

        if combined.len() < 32 {
            return Err(invalid());
        }

        let (signature, payload_bytes) = combined.split_at(32);

        let mut mac = new_hmac(&self.hmac_key)?;
        mac.update(payload_bytes);
        mac.verify_slice(signature).map_err(|_| invalid())?;

        String::from_utf8(payload_bytes.to_vec()).map_err(|_| invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn issued_state_verifies() {
        let signer = StateSigner::new("dev_secret");
        let state = signer.issue(NOW).unwrap();
        assert!(signer.verify(&state, NOW + 5).is_ok());
    }

    #[test]
    fn states_are_unique() {
        let signer = StateSigner::new("dev_secret");
        assert_ne!(signer.issue(NOW).unwrap(), signer.issue(NOW).unwrap());
    }

    #[test]
    fn tampered_state_rejected() {
        let signer = StateSigner::new("dev_secret");
        let state = signer.issue(NOW).unwrap();
        let tampered = format!("{state}X");
        assert!(matches!(
            signer.verify(&tampered, NOW),
            Err(AppError::Authorization(_))
        ));
    }

    #[test]
    fn other_secret_rejected() {
        let state = StateSigner::new("one").issue(NOW).unwrap();
        assert!(StateSigner::new("two").verify(&state, NOW).is_err());
    }

    #[test]
    fn stale_state_rejected() {
        let signer = StateSigner::new("dev_secret");
        let state = signer.issue(NOW).unwrap();
        assert!(signer.verify(&state, NOW + STATE_MAX_AGE_SECS).is_ok());
        assert!(signer.verify(&state, NOW + STATE_MAX_AGE_SECS + 1).is_err());
    }

    #[test]
    fn garbage_rejected() {
        let signer = StateSigner::new("dev_secret");
        assert!(signer.verify("", NOW).is_err());
        assert!(signer.verify("not base64 at all!", NOW).is_err());
    }
}
