// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound event routing.
//!
//! One dispatcher instance serves the whole bot: it gates every event
//! through the rate limiter, keeps the user registry fresh, and routes to
//! the command, callback, and dialog handlers. Admin-only actions from
//! non-admins are dropped silently so the surface does not advertise
//! itself.

use std::sync::Arc;
use std::time::Duration;

use kiosk_config::model::KioskConfig;
use kiosk_core::error::KioskError;
use kiosk_core::traits::{ChatChannel, CommerceStore};
use kiosk_core::types::{
    CallbackEvent, ChatId, InboundEvent, IncomingMessage, UserId, UserProfile,
};
use tracing::{debug, warn};

use crate::broadcast::BroadcastExecutor;
use crate::fsm::DialogManager;
use crate::ratelimit::{LimiterConfig, RateLimiter};

/// Deadline for storage calls made while a user is waiting for a reply.
pub const STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Recent orders fetched for the admin panel.
pub(crate) const RECENT_ORDERS_LIMIT: u32 = 10;
/// Recent orders actually rendered in the admin panel.
pub(crate) const DISPLAYED_ORDERS_LIMIT: usize = 5;

/// Routes inbound events to handlers.
pub struct Dispatcher {
    pub(crate) store: Arc<dyn CommerceStore>,
    pub(crate) channel: Arc<dyn ChatChannel>,
    pub(crate) dialogs: DialogManager,
    user_limiter: RateLimiter,
    /// Lenient profile for admins. Admins currently bypass the gate in
    /// [`Dispatcher::check_rate_limit`] entirely, so only its sweep runs;
    /// it is kept wired for a future admin throttle.
    admin_limiter: RateLimiter,
    pub(crate) executor: BroadcastExecutor,
    pub(crate) admin_ids: Vec<i64>,
    pub(crate) payment_card: String,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn CommerceStore>,
        channel: Arc<dyn ChatChannel>,
        config: &KioskConfig,
    ) -> Self {
        let executor = BroadcastExecutor::new(Arc::clone(&store), Arc::clone(&channel));
        Self {
            store,
            channel,
            dialogs: DialogManager::new(),
            user_limiter: RateLimiter::new(LimiterConfig::from(&config.limits.standard)),
            admin_limiter: RateLimiter::new(LimiterConfig::from(&config.limits.privileged)),
            executor,
            admin_ids: config.bot.admin_ids.clone(),
            payment_card: config.bot.payment_card.clone(),
        }
    }

    /// Stop the background tasks owned by the dispatcher's engines.
    pub fn shutdown(&self) {
        self.dialogs.stop();
        self.user_limiter.stop();
        self.admin_limiter.stop();
    }

    pub(crate) fn is_admin(&self, user: UserId) -> bool {
        self.admin_ids.contains(&user.0)
    }

    /// Handle one inbound event to completion.
    pub async fn dispatch(&self, event: InboundEvent) {
        match event {
            InboundEvent::Message(msg) => self.handle_message(msg).await,
            InboundEvent::Callback(cb) => self.handle_callback(cb).await,
        }
    }

    async fn handle_message(&self, msg: IncomingMessage) {
        let user = msg.from.id;
        debug!(user = user.0, command = ?msg.command, "inbound message");

        if !self.check_rate_limit(user, msg.chat).await {
            return;
        }
        self.track_user(&msg.from);

        // An active dialog consumes the message before command routing,
        // except /cancel which always aborts the dialog.
        if msg.command.as_deref() != Some("cancel") {
            if let Some(state) = self.dialogs.get_state(user).await {
                self.handle_dialog_input(&msg, state).await;
                return;
            }
        }

        match msg.command.as_deref() {
            Some("start") => self.handle_start(&msg).await,
            Some("products") => self.handle_products(&msg).await,
            Some("my_orders") => self.handle_my_orders(&msg).await,
            Some("admin") => self.handle_admin(&msg).await,
            Some("cancel") => self.handle_cancel(&msg).await,
            Some(other) => self.handle_unknown_command(&msg, other).await,
            // Free text outside a dialog has no meaning.
            None => {}
        }
    }

    async fn handle_callback(&self, cb: CallbackEvent) {
        let user = cb.from.id;
        debug!(user = user.0, data = %cb.data, "inbound callback");

        if !self.is_admin(user) && !self.user_limiter.allow(user).await {
            let _ = self
                .channel
                .answer_callback(&cb.id, Some("⏳ Too many requests"), true)
                .await;
            return;
        }

        // Clear the loading spinner right away; individual handlers may
        // answer again with a toast.
        if let Err(e) = self.channel.answer_callback(&cb.id, None, false).await {
            debug!(error = %e, "could not answer callback query");
        }
        self.track_user(&cb.from);

        let (action, args) = match cb.data.split_once(':') {
            Some((action, args)) => (action, args),
            None => (cb.data.as_str(), ""),
        };

        match action {
            "show_products" => self.show_regions(&cb).await,
            "region" => self.show_categories(&cb, args).await,
            "category" => self.show_category_products(&cb, args).await,
            "product" => self.show_product_card(&cb, args).await,
            "buy" => self.handle_buy(&cb, args).await,
            "back" => self.handle_back(&cb, args).await,
            admin_action if self.is_admin(user) => match admin_action {
                "confirm_payment" => self.handle_confirm_payment(&cb, args).await,
                "back_to_admin" => self.show_admin_panel_callback(&cb).await,
                "admin_products" => self.show_admin_products(&cb).await,
                "admin_edit_product" => self.show_admin_product(&cb, args).await,
                "admin_edit_price" => self.start_price_edit(&cb, args).await,
                "admin_edit_name" => self.start_name_edit(&cb, args).await,
                "admin_edit_desc" => self.start_description_edit(&cb, args).await,
                "admin_toggle_visibility" => self.handle_toggle_visibility(&cb, args).await,
                "admin_edit_category_desc" => self.start_category_description_edit(&cb, args).await,
                "admin_edit_welcome" => self.start_welcome_edit(&cb).await,
                "broadcast_menu" => self.show_broadcast_menu(&cb).await,
                "broadcast_start" => self.start_broadcast(&cb).await,
                "broadcast_skip_photo" => self.handle_broadcast_skip_photo(&cb).await,
                "broadcast_confirm" => self.handle_broadcast_confirm(&cb).await,
                "broadcast_cancel" => self.handle_broadcast_cancel(&cb).await,
                other => debug!(action = other, "unknown callback action"),
            },
            // Admin-only or unknown actions from ordinary users are dropped
            // without a reply.
            other => debug!(action = other, user = user.0, "dropped callback"),
        }
    }

    /// Returns `true` when the event may proceed. Admins are never limited.
    async fn check_rate_limit(&self, user: UserId, chat: ChatId) -> bool {
        if self.is_admin(user) {
            return true;
        }
        if self.user_limiter.allow(user).await {
            return true;
        }
        if let Some(remaining) = self.user_limiter.ban_remaining(user).await {
            let _ = self
                .channel
                .send_text(
                    chat,
                    &format!(
                        "⏳ Too many requests. Please try again in {}.",
                        format_wait(remaining)
                    ),
                )
                .await;
        }
        false
    }

    /// Record the user in the registry without delaying the reply.
    fn track_user(&self, profile: &UserProfile) {
        let store = Arc::clone(&self.store);
        let profile = profile.clone();
        tokio::spawn(async move {
            match tokio::time::timeout(STORE_TIMEOUT, store.upsert_user(&profile)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(user = profile.id.0, error = %e, "could not upsert user"),
                Err(_) => warn!(user = profile.id.0, "user upsert timed out"),
            }
        });
    }

    /// Run a storage future under the interactive deadline.
    pub(crate) async fn store_call<T, F>(&self, fut: F) -> Result<T, KioskError>
    where
        F: Future<Output = Result<T, KioskError>>,
    {
        match tokio::time::timeout(STORE_TIMEOUT, fut).await {
            Ok(result) => result,
            Err(_) => Err(KioskError::Timeout {
                duration: STORE_TIMEOUT,
            }),
        }
    }

    /// Generic user-facing failure reply for storage problems.
    pub(crate) async fn reply_store_failure(&self, chat: ChatId, context: &str, e: &KioskError) {
        warn!(context, error = %e, "storage operation failed");
        let _ = self
            .channel
            .send_text(chat, "⚠️ Something went wrong. Please try again later.")
            .await;
    }
}

/// Human form of a ban wait: whole minutes when at least one, else seconds.
fn format_wait(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    if secs >= 60 {
        let minutes = secs.div_ceil(60);
        format!("{minutes} min")
    } else {
        format!("{} sec", secs.max(1))
    }
}

/// Parse the single numeric argument of a callback action.
pub(crate) fn parse_id(args: &str) -> Option<i64> {
    args.parse().ok()
}
