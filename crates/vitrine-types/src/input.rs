//! Host-agnostic keyboard input.
//!
//! Every host maps its native key events to [`Key`]. Widgets only react to
//! the named keys; everything else arrives as [`Key::Other`].

use serde::{Deserialize, Serialize};

/// A key pressed while the page has focus.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Enter,
    Tab,
    /// A printable character.
    Char(char),
    /// Any other key, by its DOM `key` name.
    Other(String),
}

impl Key {
    /// Parse a DOM `KeyboardEvent.key` name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Escape" | "Esc" => Self::Escape,
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "ArrowRight" | "Right" => Self::ArrowRight,
            "ArrowUp" | "Up" => Self::ArrowUp,
            "ArrowDown" | "Down" => Self::ArrowDown,
            "Enter" => Self::Enter,
            "Tab" => Self::Tab,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => Self::Char(ch),
                    _ => Self::Other(other.to_string()),
                }
            },
        }
    }

    /// The DOM `key` name for this key.
    pub fn name(&self) -> String {
        match self {
            Self::Escape => "Escape".into(),
            Self::ArrowLeft => "ArrowLeft".into(),
            Self::ArrowRight => "ArrowRight".into(),
            Self::ArrowUp => "ArrowUp".into(),
            Self::ArrowDown => "ArrowDown".into(),
            Self::Enter => "Enter".into(),
            Self::Tab => "Tab".into(),
            Self::Char(ch) => ch.to_string(),
            Self::Other(name) => name.clone(),
        }
    }
}
