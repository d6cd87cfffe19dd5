//! Bounded generate-and-validate search with a deterministic fallback.

use tracing::debug;

use super::PairingError;

/// How many random candidates to try before falling back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 20 }
    }
}

/// Result of running a policy.
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt<T> {
    /// A candidate passed validation on the given attempt (1-based)
    Accepted { value: T, attempt: u32 },
    /// Every attempt failed; the fallback value was used
    Fallback { value: T, attempts: u32 },
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Phase one: draw up to `max_retries` candidates, returning the first valid one.
    pub fn try_generate<T, G, V>(
        &self,
        mut generate: G,
        mut is_valid: V,
    ) -> Result<Option<(T, u32)>, PairingError>
    where
        G: FnMut() -> Result<T, PairingError>,
        V: FnMut(&T) -> bool,
    {
        for attempt in 1..=self.max_retries {
            let candidate = generate()?;
            if is_valid(&candidate) {
                debug!("Candidate accepted on attempt {}", attempt);
                return Ok(Some((candidate, attempt)));
            }
        }
        Ok(None)
    }

    /// Phase two: produce the deterministic fallback.
    pub fn fallback_generate<T, F>(&self, fallback: F) -> Result<T, PairingError>
    where
        F: FnOnce() -> Result<T, PairingError>,
    {
        debug!(
            "No valid candidate in {} attempts, using fallback",
            self.max_retries
        );
        fallback()
    }

    /// Run both phases.
    pub fn run<T, G, V, F>(&self, generate: G, is_valid: V, fallback: F) -> Result<Attempt<T>, PairingError>
    where
        G: FnMut() -> Result<T, PairingError>,
        V: FnMut(&T) -> bool,
        F: FnOnce() -> Result<T, PairingError>,
    {
        match self.try_generate(generate, is_valid)? {
            Some((value, attempt)) => Ok(Attempt::Accepted { value, attempt }),
            None => Ok(Attempt::Fallback {
                value: self.fallback_generate(fallback)?,
                attempts: self.max_retries,
            }),
        }
    }
}
