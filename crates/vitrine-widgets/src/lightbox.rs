//! Lightbox image viewer.
//!
//! Any element with the trigger class opens an overlay showing its
//! full-size image. Triggers under a common gallery container can be
//! browsed cyclically with the prev/next buttons or the arrow keys.

use vitrine_dom::{Document, ElementData, NodeId, TagName};
use vitrine_types::config::LightboxConfig;
use vitrine_types::error::{Result, VitrineError};
use vitrine_types::input::Key;

use crate::event::{EventResponse, PageEvent};
use crate::gallery::{GalleryState, compute_working_set, resolve_trigger};
use crate::page::{Host, Widget};

/// Class on the overlay root while the viewer is open.
pub const ACTIVE_CLASS: &str = "active";

/// Nodes of the overlay built at install time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surface {
    pub root: NodeId,
    pub content: NodeId,
    pub close: NodeId,
    pub prev: NodeId,
    pub next: NodeId,
    pub image: NodeId,
    pub caption: NodeId,
}

impl Surface {
    /// Build the overlay and append it to `parent`.
    fn build(doc: &mut Document, parent: NodeId) -> Self {
        let root = doc.create_element(
            ElementData::new(TagName::Div)
                .with_attr("id", "lightbox")
                .with_attr("class", "lightbox"),
        );
        let content =
            doc.create_element(ElementData::new(TagName::Div).with_attr("class", "lightbox-content"));
        let close = button(doc, "lightbox-close", "Close lightbox", "\u{d7}");
        let prev = button(doc, "lightbox-prev", "Previous image", "\u{276e}");
        let next = button(doc, "lightbox-next", "Next image", "\u{276f}");
        let image = doc.create_element(
            ElementData::new(TagName::Img)
                .with_attr("src", "")
                .with_attr("alt", "")
                .with_attr("class", "lightbox-image"),
        );
        let caption =
            doc.create_element(ElementData::new(TagName::Div).with_attr("class", "lightbox-caption"));

        for child in [close, prev, next, image, caption] {
            doc.append_child(content, child);
        }
        doc.append_child(root, content);
        doc.append_child(parent, root);

        Self {
            root,
            content,
            close,
            prev,
            next,
            image,
            caption,
        }
    }
}

fn button(doc: &mut Document, class: &str, label: &str, glyph: &str) -> NodeId {
    let b = doc.create_element(
        ElementData::new(TagName::Button)
            .with_attr("class", class)
            .with_attr("aria-label", label),
    );
    doc.set_text_content(b, glyph);
    b
}

/// The lightbox widget.
pub struct Lightbox {
    trigger_class: String,
    gallery_attr: String,
    state: GalleryState,
    surface: Option<Surface>,
    scroll_locked: bool,
}

impl Lightbox {
    pub fn new(config: &LightboxConfig) -> Self {
        Self {
            trigger_class: config.trigger_class.clone(),
            gallery_attr: config.gallery_attribute.clone(),
            state: GalleryState::new(),
            surface: None,
            scroll_locked: false,
        }
    }

    pub fn state(&self) -> &GalleryState {
        &self.state
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    /// Show `trigger`, browsing among its gallery peers.
    pub fn open(&mut self, host: &mut Host, trigger: NodeId) {
        let Some(surface) = self.surface else {
            return;
        };
        let set = compute_working_set(&host.doc, trigger, &self.trigger_class, &self.gallery_attr);
        self.state.open(set, trigger);
        log::debug!(
            "lightbox open at {} of {}",
            self.state.index() + 1,
            self.state.len()
        );
        self.render(&mut host.doc);
        host.doc.add_class(surface.root, ACTIVE_CLASS);
        if !self.scroll_locked
            && let Some(body) = host.doc.body()
        {
            host.doc.set_style(body, "overflow", "hidden");
            self.scroll_locked = true;
        }
    }

    /// Hide the overlay and release the scroll lock. Idempotent.
    pub fn close(&mut self, host: &mut Host) {
        let was_open = self.state.is_open();
        self.state.close();
        if let Some(surface) = self.surface {
            host.doc.remove_class(surface.root, ACTIVE_CLASS);
        }
        if self.scroll_locked {
            if let Some(body) = host.doc.body() {
                host.doc.set_style(body, "overflow", "");
            }
            self.scroll_locked = false;
        }
        if was_open {
            log::debug!("lightbox closed");
        }
    }

    pub fn next(&mut self, host: &mut Host) {
        if self.state.next() {
            self.render(&mut host.doc);
        }
    }

    pub fn prev(&mut self, host: &mut Host) {
        if self.state.prev() {
            self.render(&mut host.doc);
        }
    }

    fn render(&self, doc: &mut Document) {
        let (Some(surface), Some(current)) = (self.surface, self.state.current()) else {
            return;
        };
        let view = resolve_trigger(doc, current);
        doc.set_attr(surface.image, "src", &view.source);
        doc.set_attr(surface.image, "alt", &view.label);
        doc.set_text_content(surface.caption, &view.caption);

        let display = if self.state.has_navigation() { "block" } else { "none" };
        doc.set_style(surface.prev, "display", display);
        doc.set_style(surface.next, "display", display);
    }

    fn on_click(&mut self, host: &mut Host, target: NodeId) -> EventResponse {
        let Some(surface) = self.surface else {
            return EventResponse::IGNORED;
        };
        if host.doc.is_inclusive_ancestor(surface.root, target) {
            let doc = &host.doc;
            if doc.is_inclusive_ancestor(surface.close, target) {
                self.close(host);
            } else if doc.is_inclusive_ancestor(surface.prev, target) {
                self.prev(host);
            } else if doc.is_inclusive_ancestor(surface.next, target) {
                self.next(host);
            } else if target == surface.root {
                self.close(host);
            } else {
                return EventResponse::IGNORED;
            }
            return EventResponse::HANDLED;
        }

        let trigger = std::iter::once(target)
            .chain(host.doc.ancestors(target))
            .find(|&n| host.doc.has_class(n, &self.trigger_class));
        match trigger {
            Some(trigger) => {
                self.open(host, trigger);
                EventResponse::CONSUMED
            },
            None => EventResponse::IGNORED,
        }
    }
}

impl Widget for Lightbox {
    fn name(&self) -> &'static str {
        "lightbox"
    }

    fn install(&mut self, host: &mut Host) -> Result<()> {
        let body = host
            .doc
            .body()
            .ok_or_else(|| VitrineError::Dom("document has no <body>".into()))?;
        self.surface = Some(Surface::build(&mut host.doc, body));
        Ok(())
    }

    fn handle_event(&mut self, host: &mut Host, event: &PageEvent) -> EventResponse {
        match event {
            PageEvent::Click { target } => self.on_click(host, *target),
            PageEvent::KeyDown(key) if self.state.is_open() => match key {
                Key::Escape => {
                    self.close(host);
                    EventResponse::HANDLED
                },
                Key::ArrowLeft => {
                    self.prev(host);
                    EventResponse::HANDLED
                },
                Key::ArrowRight => {
                    self.next(host);
                    EventResponse::HANDLED
                },
                _ => EventResponse::IGNORED,
            },
            _ => EventResponse::IGNORED,
        }
    }
}
