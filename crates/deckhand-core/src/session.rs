//! Launchpad session signatures
//!
//! A perishable token handed to a browser to establish a session:
//! `<user_id>.<expires_at_unix>.<hex hmac-sha256>`. Verification yields the
//! user id or [`DeckhandError::Unauthorized`]; it never reports why beyond a
//! short reason, and never confuses a bad signature with any other failure.
use crate::error::DeckhandError;
use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub struct SessionSigner {
    secret: Vec<u8>,
}

impl SessionSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
        }
    }

    pub fn sign(&self, user_id: &str, expires_at: DateTime<Utc>) -> String {
        let payload = format!("{}.{}", user_id, expires_at.timestamp());
        let signature = hex::encode(self.mac(&payload).finalize().into_bytes());
        format!("{}.{}", payload, signature)
    }

    /// Check `sig` at instant `now` and return the user id it was issued for.
    pub fn verify(&self, sig: &str, now: DateTime<Utc>) -> Result<String, DeckhandError> {
        let mut parts = sig.rsplitn(3, '.');
        let (Some(signature), Some(expires), Some(user_id)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(DeckhandError::Unauthorized("malformed signature".into()));
        };

        if user_id.is_empty() {
            return Err(DeckhandError::Unauthorized("malformed signature".into()));
        }

        let expected = hex::decode(signature)
            .map_err(|_| DeckhandError::Unauthorized("malformed signature".into()))?;

        self.mac(&format!("{}.{}", user_id, expires))
            .verify_slice(&expected)
            .map_err(|_| DeckhandError::Unauthorized("signature mismatch".into()))?;

        let expires_at = expires
            .parse::<i64>()
            .ok()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .ok_or_else(|| DeckhandError::Unauthorized("malformed expiry".into()))?;

        if expires_at <= now {
            tracing::debug!(user_id, "launchpad signature expired");
            return Err(DeckhandError::Unauthorized("signature expired".into()));
        }

        Ok(user_id.to_string())
    }

    fn mac(&self, payload: &str) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC can accept any key length");
        mac.update(payload.as_bytes());
        mac
    }
}
