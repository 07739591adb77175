// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Kiosk bot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Integer identity of a chat participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Identity of a chat (equal to the user id in direct messages).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Reference to a previously delivered message, used for in-place edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef(pub i32);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter in the plugin registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum AdapterType {
    Channel,
    Storage,
}

// --- Inbound events ---

/// Sender profile attached to every inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
}

impl UserProfile {
    /// Human-readable handle: `@username` if set, else first (+ last) name.
    pub fn display_name(&self) -> String {
        if let Some(username) = &self.username {
            return format!("@{username}");
        }
        match &self.last_name {
            Some(last) => format!("{} {last}", self.first_name),
            None => self.first_name.clone(),
        }
    }
}

/// A message event from the inbound stream.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub from: UserProfile,
    pub chat: ChatId,
    /// Command name without the leading slash, if the message was a command.
    pub command: Option<String>,
    pub text: Option<String>,
    /// File id of the largest attached photo, if any.
    pub photo_id: Option<String>,
}

/// A callback event produced when the user presses an inline button.
///
/// `data` is an opaque colon-delimited `action:args...` payload.
#[derive(Debug, Clone)]
pub struct CallbackEvent {
    pub id: String,
    pub from: UserProfile,
    pub chat: ChatId,
    pub message: MessageRef,
    pub data: String,
}

/// One event from the inbound channel stream.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    Message(IncomingMessage),
    Callback(CallbackEvent),
}

// --- Outbound keyboards ---

/// A single inline button: a label and a callback action payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: String,
}

impl Button {
    pub fn new(label: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: action.into(),
        }
    }
}

/// Inline keyboard layout: rows of buttons, rendered by the channel adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row of buttons, builder style.
    pub fn row(mut self, buttons: Vec<Button>) -> Self {
        self.rows.push(buttons);
        self
    }

    /// Append a row containing a single button.
    pub fn button(self, label: impl Into<String>, action: impl Into<String>) -> Self {
        self.row(vec![Button::new(label, action)])
    }
}

// --- Catalog ---

/// Top level of the catalog hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: i64,
    pub name: String,
    /// Short code such as `EU` or `KZ`, used for flag emoji lookup.
    pub code: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub region_id: i64,
    pub name: String,
    pub description: String,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub is_visible: bool,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
}

// --- Orders ---

/// Order lifecycle status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Paid,
    Completed,
    Cancelled,
}

/// An order with its price captured at creation time.
///
/// The price snapshot never changes after creation, even if the product's
/// live price is updated later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Human-readable id: 3-letter prefix + YYMMDD + 3-digit random suffix.
    pub order_id: String,
    pub user_id: UserId,
    pub product_id: i64,
    pub price: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Aggregate order statistics for the admin panel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrderStats {
    pub total_orders: u64,
    pub pending_orders: u64,
    pub paid_orders: u64,
    pub completed_orders: u64,
    /// Sum of prices over paid and completed orders.
    pub total_revenue: f64,
}

// --- Users and settings ---

/// A known bot user, tracked for broadcast targeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopUser {
    pub user_id: UserId,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
    /// Set permanently once the user blocks the bot.
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

/// Singleton bot settings record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotSettings {
    pub welcome_message: String,
    pub updated_at: DateTime<Utc>,
}

// --- Broadcasts ---

/// Broadcast lifecycle status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BroadcastStatus {
    Draft,
    Sending,
    Completed,
    Failed,
}

/// An announcement sent to the whole active user base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Broadcast {
    pub id: i64,
    pub admin_id: UserId,
    /// Sanitized HTML body.
    pub text: String,
    pub status: BroadcastStatus,
    pub total_users: u32,
    pub sent_count: u32,
    pub failed_count: u32,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// A photo attached to a broadcast draft, ordered by `sort_order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastPhoto {
    pub id: i64,
    pub broadcast_id: i64,
    pub file_id: String,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
}
