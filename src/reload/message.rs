//! Wire format for live-reload notifications.

use serde::Serialize;

/// Message sent to connected preview pages.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    /// Handshake acknowledgement sent once per connection.
    Connected { version: &'static str },
    /// Ask the page to reload; `reason` names what changed.
    Reload { reason: String },
}

impl ReloadMessage {
    pub fn connected() -> Self {
        ReloadMessage::Connected {
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    pub fn reload(reason: &str) -> Self {
        ReloadMessage::Reload {
            reason: reason.to_string(),
        }
    }

    pub fn to_json(&self) -> String {
        // Both variants serialize infallibly
        serde_json::to_string(self).unwrap_or_default()
    }
}
