//! Vitrine page widgets.
//!
//! Each widget attaches to a [`Page`] and reacts to [`PageEvent`]s. The
//! [`Lightbox`] is the one stateful component; its navigation core lives in
//! [`gallery`] and is usable without a page.

pub mod analytics;
pub mod copy_code;
pub mod event;
pub mod form;
pub mod gallery;
pub mod host;
pub mod lightbox;
pub mod nav;
pub mod page;
pub mod reveal;
pub mod scroll_top;
pub mod theme;

#[cfg(test)]
pub(crate) mod test_utils;

pub use analytics::{Analytics, TrackedEvent};
pub use copy_code::CopyCode;
pub use event::{EventResponse, PageEvent, TimerTag};
pub use form::{FormHandler, ValidationError};
pub use gallery::{GalleryState, TriggerView, ViewerMode, compute_working_set, resolve_trigger};
pub use lightbox::Lightbox;
pub use nav::Navigation;
pub use page::{Host, Page, ScrollRequest, Viewport, Widget};
pub use reveal::Reveal;
pub use scroll_top::ScrollToTop;
pub use theme::ThemeManager;
