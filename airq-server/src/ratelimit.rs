//! Governance of the shared upstream API credential.
//!
//! The provider enforces quotas over three independent windows (second,
//! minute, day) and reports the remaining headroom with every response.
//! [`KeyRegistry`] is the single authority for whether the credential may
//! be used right now: callers obtain the key through [`KeyRegistry::issue_key`]
//! and feed the reported headroom back through [`KeyRegistry::record_usage`].
//! All of its state lives behind one mutex, so an issuance decision never
//! observes a half-recorded update.

use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::warn;

/// Remaining quota at which a window is marked exhausted. Stopping at
/// exactly one call left keeps a last call in reserve instead of tripping
/// the provider-side block.
const STOP_REMAINING: u32 = 1;

/// Remaining quota at which a warning is logged.
const WARN_REMAINING: u32 = 5;

/// A quota window granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Second,
    Minute,
    Day,
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Window::Second => f.write_str("second"),
            Window::Minute => f.write_str("minute"),
            Window::Day => f.write_str("day"),
        }
    }
}

/// Error: the credential is currently exhausted for the named window(s).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyExhausted {
    pub windows: Vec<Window>,
}

impl fmt::Display for KeyExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API key exhausted for window(s): ")?;
        for (i, window) in self.windows.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{window}")?;
        }
        Ok(())
    }
}

impl std::error::Error for KeyExhausted {}

/// Rate limit policy: configured window limits and cooldown durations.
///
/// Cooldowns are policy constants rather than the window granularity
/// itself: a tripped minute window rests for an hour, a tripped second
/// window for a minute, a tripped day window for a day.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub limit_second: Option<u32>,
    pub limit_minute: Option<u32>,
    pub limit_day: Option<u32>,
    pub cooldown_second: Duration,
    pub cooldown_minute: Duration,
    pub cooldown_day: Duration,
}

impl RateLimitConfig {
    /// Policy with the given minute/day limits and default cooldowns.
    pub fn new(limit_minute: Option<u32>, limit_day: Option<u32>) -> Self {
        Self {
            limit_minute,
            limit_day,
            ..Self::default()
        }
    }

    /// Override the per-window cooldown durations.
    pub fn with_cooldowns(mut self, second: Duration, minute: Duration, day: Duration) -> Self {
        self.cooldown_second = second;
        self.cooldown_minute = minute;
        self.cooldown_day = day;
        self
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit_second: None,
            limit_minute: Some(50),
            limit_day: Some(1000),
            cooldown_second: Duration::from_secs(60),
            cooldown_minute: Duration::from_secs(60 * 60),
            cooldown_day: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Headroom reported by the provider after a call. Any subset of windows
/// may be present; absent windows are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemainingQuota {
    pub second: Option<u32>,
    pub minute: Option<u32>,
    pub day: Option<u32>,
}

#[derive(Debug, Default)]
struct WindowState {
    remaining: Option<u32>,
    exhausted_at: Option<Instant>,
}

impl WindowState {
    fn clear_if_rested(&mut self, now: Instant, cooldown: Duration) {
        if let Some(at) = self.exhausted_at
            && now.duration_since(at) >= cooldown
        {
            self.exhausted_at = None;
        }
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    second: WindowState,
    minute: WindowState,
    day: WindowState,
}

/// Single authority over the shared upstream credential.
pub struct KeyRegistry {
    key: String,
    config: RateLimitConfig,
    state: Mutex<RegistryState>,
}

impl KeyRegistry {
    /// Create a registry for one credential under the given policy.
    pub fn new(key: impl Into<String>, config: RateLimitConfig) -> Self {
        Self {
            key: key.into(),
            config,
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// Issue the credential, provided no quota window is currently resting.
    ///
    /// Windows whose cooldown has elapsed are cleared before the decision;
    /// if any window remains exhausted the error names all of them.
    pub fn issue_key(&self) -> Result<String, KeyExhausted> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        state.second.clear_if_rested(now, self.config.cooldown_second);
        state.minute.clear_if_rested(now, self.config.cooldown_minute);
        state.day.clear_if_rested(now, self.config.cooldown_day);

        let mut exhausted = Vec::new();
        if state.second.exhausted_at.is_some() {
            exhausted.push(Window::Second);
        }
        if state.minute.exhausted_at.is_some() {
            exhausted.push(Window::Minute);
        }
        if state.day.exhausted_at.is_some() {
            exhausted.push(Window::Day);
        }

        if exhausted.is_empty() {
            Ok(self.key.clone())
        } else {
            Err(KeyExhausted { windows: exhausted })
        }
    }

    /// Record the remaining quota the provider reported for this call.
    ///
    /// A window that reaches the stop mark is stamped exhausted as of now;
    /// one that reports more headroom than the stop mark has any stamp
    /// cleared. Hitting the warning mark logs but never blocks issuance.
    pub fn record_usage(&self, remaining: RemainingQuota) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        Self::record_window(&mut state.second, Window::Second, remaining.second);
        Self::record_window(&mut state.minute, Window::Minute, remaining.minute);
        Self::record_window(&mut state.day, Window::Day, remaining.day);
    }

    fn record_window(state: &mut WindowState, window: Window, remaining: Option<u32>) {
        let Some(remaining) = remaining else {
            return;
        };

        if remaining == WARN_REMAINING {
            warn!(%window, remaining, "rate limit nearly exhausted");
        }

        state.remaining = Some(remaining);
        state.exhausted_at = if remaining == STOP_REMAINING {
            Some(Instant::now())
        } else {
            None
        };
    }

    /// Last-observed remaining quota per window.
    pub fn remaining(&self) -> RemainingQuota {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        RemainingQuota {
            second: state.second.remaining,
            minute: state.minute.remaining,
            day: state.day.remaining,
        }
    }
}
