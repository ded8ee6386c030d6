//! Dark/light theme toggle with a persisted preference.

use vitrine_dom::{Document, NodeId, Selector};
use vitrine_types::config::{ThemeConfig, ThemeName};
use vitrine_types::error::Result;

use crate::event::{EventResponse, PageEvent};
use crate::page::{Host, Widget};

const TOGGLE_ID: &str = "theme-toggle";

pub struct ThemeManager {
    default: ThemeName,
    storage_key: String,
    current: ThemeName,
}

impl ThemeManager {
    pub fn new(config: &ThemeConfig) -> Self {
        Self {
            default: config.default,
            storage_key: config.storage_key.clone(),
            current: config.default,
        }
    }

    pub fn current(&self) -> ThemeName {
        self.current
    }

    /// Apply `theme` to the document, persist it, and refresh the toggle.
    pub fn apply(&mut self, host: &mut Host, theme: ThemeName) {
        self.current = theme;
        if let Some(html) = host.doc.document_element() {
            host.doc.set_attr(html, "data-theme", theme.as_str());
        }
        if let Err(e) = host.store.set(&self.storage_key, theme.as_str()) {
            log::warn!("could not persist theme preference: {e}");
        }
        if let Some(button) = host.doc.get_element_by_id(TOGGLE_ID) {
            refresh_button(&mut host.doc, button, theme);
        }
        log::debug!("theme set to {theme}");
    }

    pub fn toggle(&mut self, host: &mut Host) {
        let next = self.current.toggled();
        self.apply(host, next);
    }

    fn stored(&self, host: &Host) -> ThemeName {
        match host.store.get(&self.storage_key) {
            Ok(Some(value)) => ThemeName::parse(&value).unwrap_or_else(|| {
                log::warn!("ignoring unknown stored theme {value:?}");
                self.default
            }),
            Ok(None) => self.default,
            Err(e) => {
                log::warn!("could not read theme preference: {e}");
                self.default
            },
        }
    }
}

/// Icon, label and accessible name advertise the theme a click switches to.
fn refresh_button(doc: &mut Document, button: NodeId, theme: ThemeName) {
    let (icon, text, label) = match theme {
        ThemeName::Dark => ("\u{2600}\u{fe0f}", "Light", "Switch to light mode"),
        ThemeName::Light => ("\u{1f319}", "Dark", "Switch to dark mode"),
    };
    for (class, value) in [("theme-icon", icon), ("theme-text", text)] {
        let node = Selector::parse(&format!(".{class}"))
            .ok()
            .and_then(|sel| doc.query(button, &sel));
        if let Some(node) = node {
            doc.set_text_content(node, value);
        }
    }
    doc.set_attr(button, "aria-label", label);
}

impl Widget for ThemeManager {
    fn name(&self) -> &'static str {
        "theme"
    }

    fn install(&mut self, host: &mut Host) -> Result<()> {
        let theme = self.stored(host);
        self.apply(host, theme);
        Ok(())
    }

    fn handle_event(&mut self, host: &mut Host, event: &PageEvent) -> EventResponse {
        let PageEvent::Click { target } = event else {
            return EventResponse::IGNORED;
        };
        let Some(button) = host.doc.get_element_by_id(TOGGLE_ID) else {
            return EventResponse::IGNORED;
        };
        if !host.doc.is_inclusive_ancestor(button, *target) {
            return EventResponse::IGNORED;
        }
        self.toggle(host);
        EventResponse::HANDLED
    }
}
