//! Request token validation.
//!
//! Tokens are short HMAC-SHA256 nonces keyed by a shared secret and scoped to
//! an action context. A nonce is bound to a time tick of half the configured
//! lifetime and stays valid for the current and the previous tick, so an
//! issued token survives between one half and one full lifetime.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Number of MAC bytes carried by a token (hex encoded to twice as many chars).
pub const TOKEN_BYTES: usize = 10;

/// Decides whether a request token is acceptable for a context.
pub trait TokenValidator: Send + Sync {
    /// Returns `true` when `token` is valid for `context`. Never panics, and an
    /// empty token is always rejected.
    fn validate(&self, token: &str, context: &str) -> bool;
}

/// Source of the current time for tick computation.
pub trait Clock: Send + Sync {
    /// Returns the current wall-clock time.
    fn now(&self) -> SystemTime;
}

/// Clock backed by [`SystemTime::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Errors raised while constructing a validator.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The shared secret was empty.
    #[error("token secret must not be empty")]
    EmptySecret,
    /// The MAC rejected the key material.
    #[error("invalid token key: {0}")]
    InvalidKey(#[from] hmac::digest::InvalidLength),
}

/// Keyed, context-scoped nonce validator.
pub struct HmacNonceValidator {
    mac: HmacSha256,
    tick_secs: u64,
    clock: Box<dyn Clock>,
}

impl std::fmt::Debug for HmacNonceValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacNonceValidator")
            .field("tick_secs", &self.tick_secs)
            .finish_non_exhaustive()
    }
}

impl HmacNonceValidator {
    /// Creates a validator using the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::EmptySecret`] when `secret` is empty.
    pub fn new(secret: &str, lifetime: Duration) -> Result<Self, TokenError> {
        Self::with_clock(secret, lifetime, Box::new(SystemClock))
    }

    /// Creates a validator reading time from `clock`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::EmptySecret`] when `secret` is empty.
    pub fn with_clock(
        secret: &str,
        lifetime: Duration,
        clock: Box<dyn Clock>,
    ) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        let mac = HmacSha256::new_from_slice(secret.as_bytes())?;
        Ok(Self {
            mac,
            tick_secs: (lifetime.as_secs() / 2).max(1),
            clock,
        })
    }

    /// Issues the token for `context` in the current tick.
    #[must_use]
    pub fn issue(&self, context: &str) -> String {
        let tag = self.keyed(self.current_tick(), context).finalize().into_bytes();
        hex::encode(tag.get(..TOKEN_BYTES).unwrap_or_default())
    }

    fn current_tick(&self) -> u64 {
        let elapsed = self
            .clock
            .now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        elapsed.as_secs().div_ceil(self.tick_secs)
    }

    fn keyed(&self, tick: u64, context: &str) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(tick.to_string().as_bytes());
        mac.update(b"|");
        mac.update(context.as_bytes());
        mac
    }

    fn matches(&self, tick: u64, context: &str, tag: &[u8]) -> bool {
        self.keyed(tick, context).verify_truncated_left(tag).is_ok()
    }
}

impl TokenValidator for HmacNonceValidator {
    fn validate(&self, token: &str, context: &str) -> bool {
        let tag = hex::decode(token).unwrap_or_default();
        let length_ok = tag.len() == TOKEN_BYTES;
        let tick = self.current_tick();
        let current = self.matches(tick, context, &tag);
        let previous = self.matches(tick.saturating_sub(1), context, &tag);
        length_ok & (current | previous)
    }
}
