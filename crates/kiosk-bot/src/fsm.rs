// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user dialog state machine.
//!
//! Tracks what a multi-step conversation is currently waiting for: a new
//! price, a broadcast text, a confirmation. States carry a 30-minute TTL;
//! expired states are dropped lazily on read and by a 5-minute background
//! sweep, so an abandoned dialog never traps the user.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use kiosk_core::types::UserId;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// How long a dialog state stays valid without being replaced.
pub const STATE_TTL: Duration = Duration::from_secs(30 * 60);
/// Interval of the expired-state sweep.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// What the conversation with one user is currently waiting for.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogState {
    AwaitingPrice { product_id: i64 },
    AwaitingName { product_id: i64 },
    AwaitingDescription { product_id: i64 },
    AwaitingCategoryDescription { category_id: i64 },
    AwaitingWelcomeMessage,
    Broadcast { stage: BroadcastStage, draft: BroadcastDraft },
}

/// Stage of the three-step broadcast creation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastStage {
    AwaitingText,
    AwaitingPhoto,
    Confirming,
}

/// Scratch data accumulated while composing a broadcast.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BroadcastDraft {
    /// Set once the draft row exists in storage.
    pub broadcast_id: Option<i64>,
    /// Sanitized text, kept for the preview.
    pub text: String,
    pub photo_ids: Vec<String>,
    pub skip_photo: bool,
}

struct DialogEntry {
    state: DialogState,
    expires_at: Instant,
}

struct FsmInner {
    entries: RwLock<HashMap<UserId, DialogEntry>>,
    ttl: Duration,
}

impl FsmInner {
    async fn sweep(&self) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| now < entry.expires_at);
        let expired = before - entries.len();
        if expired > 0 {
            debug!(expired, active = entries.len(), "dialog state sweep");
        }
    }
}

/// Concurrent map of user id to dialog state with TTL expiry.
///
/// [`DialogManager::new`] spawns the sweep task; call
/// [`DialogManager::stop`] during shutdown to end it.
#[derive(Clone)]
pub struct DialogManager {
    inner: Arc<FsmInner>,
    cancel: CancellationToken,
}

impl DialogManager {
    pub fn new() -> Self {
        Self::with_timing(STATE_TTL, SWEEP_INTERVAL)
    }

    fn with_timing(ttl: Duration, sweep_interval: Duration) -> Self {
        let inner = Arc::new(FsmInner {
            entries: RwLock::new(HashMap::new()),
            ttl,
        });
        let cancel = CancellationToken::new();

        let sweep_inner = Arc::clone(&inner);
        let sweep_cancel = cancel.clone();
        // Fix the ticker's epoch at construction, before the task is first
        // polled.
        let mut ticker = tokio::time::interval(sweep_interval);
        tokio::spawn(async move {
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

    /// Replace the user's dialog state and restart its TTL.
    pub async fn set_state(&self, user: UserId, state: DialogState) {
        let entry = DialogEntry {
            state,
            expires_at: Instant::now() + self.inner.ttl,
        };
        self.inner.entries.write().await.insert(user, entry);
    }

    /// Current dialog state, if any. An expired state is removed and reads
    /// as absent.
    pub async fn get_state(&self, user: UserId) -> Option<DialogState> {
        let mut entries = self.inner.entries.write().await;
        match entries.get(&user) {
            Some(entry) if Instant::now() < entry.expires_at => Some(entry.state.clone()),
            Some(_) => {
                entries.remove(&user);
                None
            }
            None => None,
        }
    }

    pub async fn clear_state(&self, user: UserId) {
        self.inner.entries.write().await.remove(&user);
    }

    /// Whether the user is in the middle of a dialog.
    pub async fn is_active(&self, user: UserId) -> bool {
        self.inner.entries.read().await.contains_key(&user)
    }

    /// Move the broadcast dialog to `stage`, restarting the TTL.
    ///
    /// An existing broadcast draft is preserved across the transition; any
    /// other state is replaced with a fresh draft.
    pub async fn set_broadcast_stage(&self, user: UserId, stage: BroadcastStage) {
        let mut entries = self.inner.entries.write().await;
        let expires_at = Instant::now() + self.inner.ttl;
        if let Some(entry) = entries.get_mut(&user) {
            if let DialogState::Broadcast { stage: current, .. } = &mut entry.state {
                *current = stage;
                entry.expires_at = expires_at;
                return;
            }
        }
        entries.insert(
            user,
            DialogEntry {
                state: DialogState::Broadcast {
                    stage,
                    draft: BroadcastDraft::default(),
                },
                expires_at,
            },
        );
    }

    /// Mutate the broadcast draft in place. Returns `false` when the user is
    /// not in a broadcast dialog; the TTL is left unchanged.
    pub async fn update_broadcast_draft<F>(&self, user: UserId, update: F) -> bool
    where
        F: FnOnce(&mut BroadcastDraft),
    {
        let mut entries = self.inner.entries.write().await;
        if let Some(entry) = entries.get_mut(&user) {
            if let DialogState::Broadcast { draft, .. } = &mut entry.state {
                update(draft);
                return true;
            }
        }
        false
    }

    /// Stop the background sweep task. Idempotent.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Default for DialogManager {
    fn default() -> Self {
        Self::new()
    }
}
