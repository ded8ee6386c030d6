//! Floating "back to top" button.

use vitrine_dom::{ElementData, NodeId, TagName};
use vitrine_types::config::ScrollToTopConfig;
use vitrine_types::error::{Result, VitrineError};

use crate::event::{EventResponse, PageEvent, TimerTag};
use crate::host::TimerId;
use crate::page::{Host, Widget};

pub struct ScrollToTop {
    threshold_px: i32,
    debounce_ms: u64,
    button: Option<NodeId>,
    pending: Option<TimerId>,
}

impl ScrollToTop {
    pub fn new(config: &ScrollToTopConfig) -> Self {
        Self {
            threshold_px: config.threshold_px,
            debounce_ms: config.debounce_ms,
            button: None,
            pending: None,
        }
    }

    pub fn button(&self) -> Option<NodeId> {
        self.button
    }

    /// Show the button iff the page is scrolled past the threshold.
    pub fn update_visibility(&self, host: &mut Host) {
        let Some(button) = self.button else {
            return;
        };
        if host.viewport.scroll_y > self.threshold_px {
            host.doc.add_class(button, "visible");
        } else {
            host.doc.remove_class(button, "visible");
        }
    }
}

impl Widget for ScrollToTop {
    fn name(&self) -> &'static str {
        "scroll-to-top"
    }

    fn install(&mut self, host: &mut Host) -> Result<()> {
        let body = host
            .doc
            .body()
            .ok_or_else(|| VitrineError::Dom("document has no <body>".into()))?;
        let doc = &mut host.doc;
        let button = doc.create_element(
            ElementData::new(TagName::Button)
                .with_attr("id", "scroll-to-top")
                .with_attr("class", "scroll-to-top")
                .with_attr("aria-label", "Scroll to top"),
        );
        let arrow = doc.create_element(ElementData::new(TagName::Span).with_attr("aria-hidden", "true"));
        doc.set_text_content(arrow, "\u{2191}");
        doc.append_child(button, arrow);
        doc.append_child(body, button);
        self.button = Some(button);
        self.update_visibility(host);
        Ok(())
    }

    fn handle_event(&mut self, host: &mut Host, event: &PageEvent) -> EventResponse {
        match event {
            PageEvent::Click { target } => match self.button {
                Some(button) if host.doc.is_inclusive_ancestor(button, *target) => {
                    host.request_scroll(0, true);
                    EventResponse::HANDLED
                },
                _ => EventResponse::IGNORED,
            },
            PageEvent::Scroll { .. } => {
                if let Some(id) = self.pending.take() {
                    host.timers.cancel(id);
                }
                self.pending = Some(host.timers.schedule(self.debounce_ms, TimerTag::ScrollSettled));
                EventResponse::IGNORED
            },
            PageEvent::Timer(TimerTag::ScrollSettled) => {
                self.pending = None;
                self.update_visibility(host);
                EventResponse::HANDLED
            },
            _ => EventResponse::IGNORED,
        }
    }
}
