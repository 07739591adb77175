// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion of Telegram updates into channel-agnostic inbound events.
//!
//! Determines whether an incoming update should be processed (private chats
//! with a known sender only) and extracts it into an [`InboundEvent`].

use kiosk_core::types::{CallbackEvent, ChatId, IncomingMessage, MessageRef, UserId, UserProfile};
use teloxide::types::{CallbackQuery, ChatKind, Message, User};

/// Checks whether the message is from a private (DM) chat.
///
/// Group, supergroup, and channel messages return `false`.
pub fn is_dm(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

/// Parse a bot command from the first token of a message text.
///
/// Returns the lowercase command name without the leading slash, with any
/// `@botname` suffix stripped. Non-command text returns `None`.
pub fn parse_command(text: &str) -> Option<String> {
    let first = text.split_whitespace().next()?;
    let name = first.strip_prefix('/')?;
    let name = name.split('@').next()?;
    if name.is_empty() {
        return None;
    }
    Some(name.to_ascii_lowercase())
}

fn map_user(user: &User) -> UserProfile {
    UserProfile {
        id: UserId(user.id.0 as i64),
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
    }
}

/// Convert a Telegram message into an [`IncomingMessage`].
///
/// Messages without a sender (channel posts) return `None`. For photo
/// messages the largest size is kept and the caption becomes the text.
pub fn map_message(msg: &Message) -> Option<IncomingMessage> {
    let from = map_user(msg.from.as_ref()?);

    let photo_id = msg
        .photo()
        .and_then(|sizes| sizes.last())
        .map(|photo| photo.file.id.0.clone());

    let text = msg
        .text()
        .or_else(|| msg.caption())
        .map(str::to_string);
    let command = text.as_deref().and_then(parse_command);

    Some(IncomingMessage {
        from,
        chat: ChatId(msg.chat.id.0),
        command,
        text,
        photo_id,
    })
}

/// Convert a Telegram callback query into a [`CallbackEvent`].
///
/// Queries without an attached message or without data (expired keyboards,
/// games) return `None`.
pub fn map_callback(query: &CallbackQuery) -> Option<CallbackEvent> {
    let message = query.message.as_ref()?;
    let data = query.data.clone()?;

    Some(CallbackEvent {
        id: query.id.0.clone(),
        from: map_user(&query.from),
        chat: ChatId(message.chat().id.0),
        message: MessageRef(message.id().0),
        data,
    })
}
