// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sliding-window rate limiter with temporary bans.
//!
//! Each identity carries a window of recent request timestamps. Overflowing
//! the window bans the identity for a fixed duration; the overflowing request
//! itself is rejected without being recorded, so the ban clock is not pushed
//! forward by further attempts. A background sweep evicts identities with no
//! recent activity and no live ban.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use kiosk_config::model::LimitProfile;
use kiosk_core::types::UserId;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Timing parameters for one limiter instance.
#[derive(Debug, Clone, Copy)]
pub struct LimiterConfig {
    /// Requests accepted within one window before a ban triggers.
    pub max_requests: u32,
    pub window: Duration,
    pub ban_duration: Duration,
    /// Interval of the inactivity sweep.
    pub sweep_interval: Duration,
}

impl From<&LimitProfile> for LimiterConfig {
    fn from(profile: &LimitProfile) -> Self {
        Self {
            max_requests: profile.max_requests,
            window: Duration::from_secs(profile.window_secs),
            ban_duration: Duration::from_secs(profile.ban_secs),
            sweep_interval: Duration::from_secs(profile.sweep_secs),
        }
    }
}

#[derive(Debug, Default)]
struct ClientWindow {
    requests: Vec<Instant>,
    banned_until: Option<Instant>,
}

struct LimiterInner {
    config: LimiterConfig,
    clients: RwLock<HashMap<UserId, ClientWindow>>,
}

impl LimiterInner {
    async fn sweep(&self) {
        let now = Instant::now();
        let idle_cutoff = self.config.sweep_interval;
        let mut clients = self.clients.write().await;
        let before = clients.len();
        clients.retain(|_, window| {
            if let Some(until) = window.banned_until {
                if now < until {
                    return true;
                }
            }
            match window.requests.last() {
                Some(last) => now.duration_since(*last) < idle_cutoff,
                None => false,
            }
        });
        let evicted = before - clients.len();
        if evicted > 0 {
            debug!(evicted, tracked = clients.len(), "rate limiter sweep");
        }
    }
}

/// Sliding-window rate limiter keyed by user id.
///
/// [`RateLimiter::new`] spawns the inactivity sweep task; call
/// [`RateLimiter::stop`] during shutdown to end it.
pub struct RateLimiter {
    inner: Arc<LimiterInner>,
    cancel: CancellationToken,
}

impl RateLimiter {
    pub fn new(config: LimiterConfig) -> Self {
        let inner = Arc::new(LimiterInner {
            config,
            clients: RwLock::new(HashMap::new()),
        });
        let cancel = CancellationToken::new();

        let sweep_inner = Arc::clone(&inner);
        let sweep_cancel = cancel.clone();
        // The ticker's epoch must be fixed here, not at the task's first
        // poll, so sweeps are due relative to construction time.
        let mut ticker = tokio::time::interval(config.sweep_interval);
        tokio::spawn(async move {
            // The first interval tick fires immediately; skip it.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = sweep_cancel.cancelled() => break,
                    _ = ticker.tick() => sweep_inner.sweep().await,
                }
            }
        });

        Self { inner, cancel }
    }

    /// Record a request attempt.
    ///
    /// Returns `false` while the identity is banned or when this request
    /// overflows the window (which starts a ban). Rejected attempts are not
    /// recorded, so the window only ever holds accepted requests.
    pub async fn allow(&self, user: UserId) -> bool {
        let now = Instant::now();
        let mut clients = self.inner.clients.write().await;
        let window = clients.entry(user).or_default();

        if let Some(until) = window.banned_until {
            if now < until {
                return false;
            }
            window.banned_until = None;
        }

        let window_len = self.inner.config.window;
        window
            .requests
            .retain(|t| now.duration_since(*t) < window_len);

        if window.requests.len() >= self.inner.config.max_requests as usize {
            window.banned_until = Some(now + self.inner.config.ban_duration);
            debug!(user = user.0, "rate limit exceeded, banning");
            return false;
        }

        window.requests.push(now);
        true
    }

    /// Remaining ban time for the identity, if a ban is live.
    ///
    /// Pure read: an expired ban reads as no ban even before the next
    /// [`RateLimiter::allow`] call clears it.
    pub async fn ban_remaining(&self, user: UserId) -> Option<Duration> {
        let clients = self.inner.clients.read().await;
        let until = clients.get(&user)?.banned_until?;
        let now = Instant::now();
        if now < until {
            Some(until - now)
        } else {
            None
        }
    }

    /// Forget everything about the identity: window and ban.
    pub async fn reset(&self, user: UserId) {
        self.inner.clients.write().await.remove(&user);
    }

    /// Stop the background sweep task. Idempotent.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.inner.clients.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_requests: u32) -> LimiterConfig {
        LimiterConfig {
            max_requests,
            window: Duration::from_secs(60),
            ban_duration: Duration::from_secs(300),
            sweep_interval: Duration::from_secs(600),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn accepts_up_to_the_limit_then_bans() {
        let limiter = RateLimiter::new(config(3));
        let user = UserId(1);

        for _ in 0..3 {
            assert!(limiter.allow(user).await);
        }
        assert!(!limiter.allow(user).await, "overflow must be rejected");
        assert!(limiter.ban_remaining(user).await.is_some());

        limiter.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn ban_expires_and_requests_resume() {
        let limiter = RateLimiter::new(config(1));
        let user = UserId(2);

        assert!(limiter.allow(user).await);
        assert!(!limiter.allow(user).await);

        tokio::time::advance(Duration::from_secs(301)).await;
        assert!(limiter.ban_remaining(user).await.is_none());
        assert!(limiter.allow(user).await, "expired ban must lift");

        limiter.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_attempts_do_not_extend_the_ban() {
        let limiter = RateLimiter::new(config(1));
        let user = UserId(3);

        assert!(limiter.allow(user).await);
        assert!(!limiter.allow(user).await);
        let first = limiter.ban_remaining(user).await.unwrap();

        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(!limiter.allow(user).await);
        let later = limiter.ban_remaining(user).await.unwrap();
        assert!(later < first, "hammering must not push the ban forward");

        limiter.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn old_requests_slide_out_of_the_window() {
        let limiter = RateLimiter::new(config(2));
        let user = UserId(4);

        assert!(limiter.allow(user).await);
        assert!(limiter.allow(user).await);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(limiter.allow(user).await, "window must have slid");

        limiter.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn identities_are_independent() {
        let limiter = RateLimiter::new(config(1));

        assert!(limiter.allow(UserId(5)).await);
        assert!(!limiter.allow(UserId(5)).await);
        assert!(limiter.allow(UserId(6)).await, "other users unaffected");

        limiter.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn reset_clears_window_and_ban() {
        let limiter = RateLimiter::new(config(1));
        let user = UserId(7);

        assert!(limiter.allow(user).await);
        assert!(!limiter.allow(user).await);

        limiter.reset(user).await;
        assert!(limiter.ban_remaining(user).await.is_none());
        assert!(limiter.allow(user).await);

        limiter.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn zero_max_requests_rejects_everything() {
        let limiter = RateLimiter::new(config(0));
        assert!(!limiter.allow(UserId(8)).await);
        limiter.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_evicts_idle_identities_but_keeps_banned_ones() {
        let limiter = RateLimiter::new(config(1));

        assert!(limiter.allow(UserId(9)).await); // idle after this
        assert!(limiter.allow(UserId(10)).await);
        assert!(!limiter.allow(UserId(10)).await); // banned for 300s

        // Past the sweep interval: user 9 is idle; user 10's ban has also
        // expired by then, so both go.
        tokio::time::advance(Duration::from_secs(601)).await;
        tokio::task::yield_now().await;
        assert_eq!(limiter.tracked().await, 0);

        limiter.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_keeps_identities_with_live_bans() {
        let limiter = RateLimiter::new(LimiterConfig {
            max_requests: 1,
            window: Duration::from_secs(60),
            ban_duration: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(600),
        });

        assert!(limiter.allow(UserId(11)).await);
        assert!(!limiter.allow(UserId(11)).await); // banned for an hour

        tokio::time::advance(Duration::from_secs(601)).await;
        tokio::task::yield_now().await;
        assert_eq!(limiter.tracked().await, 1, "live ban must survive sweep");

        limiter.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_the_sweep_task() {
        let limiter = RateLimiter::new(config(1));
        assert!(limiter.allow(UserId(12)).await);

        limiter.stop();
        // With the sweep stopped, idle identities stay tracked.
        tokio::time::advance(Duration::from_secs(1200)).await;
        tokio::task::yield_now().await;
        assert_eq!(limiter.tracked().await, 1);
    }
}
