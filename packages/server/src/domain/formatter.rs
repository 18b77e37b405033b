//! Renders chat messages as text lines relative to the viewer.

use super::{ChatMessage, UserId};

const SELF_PREFIX: &str = "Me > ";
const OTHER_PREFIX: &str = "Friend > ";
const NOTICE_PREFIX: &str = "System > ";

/// Render `message` for the connection owned by `viewer`.
///
/// The author sees `Me > {content}`, everyone else `Friend > {content}`.
pub fn render(message: &ChatMessage, viewer: UserId) -> String {
    let prefix = if message.is_authored_by(viewer) {
        SELF_PREFIX
    } else {
        OTHER_PREFIX
    };
    format!("{prefix}{}", message.content)
}

/// Render a server notice addressed to a single connection.
pub fn render_notice(text: &str) -> String {
    format!("{NOTICE_PREFIX}{text}")
}
