// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::time::{Duration, Instant};

/// Simple timeout utility for PTY tests.
///
/// ```ignore
/// let deadline = Deadline::default();
/// loop {
///     assert!(deadline.has_time_remaining(), "Timeout: slave did not respond");
///     // ... read from the PTY ...
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires_at: Instant,
}

impl Deadline {
    /// The default deadline used by PTY tests.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            expires_at: Instant::now() + timeout,
        }
    }

    #[must_use]
    pub fn is_expired(&self) -> bool { Instant::now() >= self.expires_at }

    #[must_use]
    pub fn has_time_remaining(&self) -> bool { !self.is_expired() }
}

impl Default for Deadline {
    fn default() -> Self { Self::new(Self::DEFAULT_TIMEOUT) }
}
