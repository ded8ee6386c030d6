//! Page events and widget responses.

use vitrine_dom::NodeId;
use vitrine_types::input::Key;

/// Payload carried by a scheduled timer.
#[derive(Debug, Clone, PartialEq)]
pub enum TimerTag {
    /// Scroll debounce window elapsed.
    ScrollSettled,
    /// Revert a copy button's feedback label.
    CopyFeedbackReset { button: NodeId },
    /// Hide the contact form status message.
    FormMessageHide,
    /// Restore a collapsed skill bar to its saved width.
    SkillBarRestore { bar: NodeId, width: String },
}

/// An event delivered to every installed widget.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// Pointer activation of `target` (bubbles to ancestors).
    Click { target: NodeId },
    /// Key pressed with the page focused.
    KeyDown(Key),
    /// The viewport scrolled to vertical offset `y`.
    Scroll { y: i32 },
    /// A form was submitted.
    Submit { form: NodeId },
    /// The visible fraction of `target` changed.
    Intersect { target: NodeId, ratio: f32 },
    /// A scheduled timer fired.
    Timer(TimerTag),
}

/// What a widget did with an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventResponse {
    /// The widget acted on the event.
    pub handled: bool,
    /// The event's default action (link navigation, form post) is cancelled.
    pub prevent_default: bool,
}

impl EventResponse {
    pub const IGNORED: Self = Self {
        handled: false,
        prevent_default: false,
    };

    pub const HANDLED: Self = Self {
        handled: true,
        prevent_default: false,
    };

    /// Handled, with the default action cancelled.
    pub const CONSUMED: Self = Self {
        handled: true,
        prevent_default: true,
    };

    /// Fold another widget's response into this one.
    pub fn merge(self, other: Self) -> Self {
        Self {
            handled: self.handled || other.handled,
            prevent_default: self.prevent_default || other.prevent_default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_is_sticky() {
        let r = EventResponse::IGNORED
            .merge(EventResponse::CONSUMED)
            .merge(EventResponse::HANDLED);
        assert_eq!(r, EventResponse::CONSUMED);
        assert_eq!(
            EventResponse::IGNORED.merge(EventResponse::IGNORED),
            EventResponse::default()
        );
    }
}
