//! Mobile menu toggle and active-link highlighting.

use vitrine_dom::{Document, NodeId, Selector};
use vitrine_types::error::Result;

use crate::event::{EventResponse, PageEvent};
use crate::page::{Host, Widget};

/// Nodes looked up at install time.
#[derive(Debug, Default)]
pub struct Navigation {
    menu_toggle: Option<NodeId>,
    menu: Option<NodeId>,
    links: Vec<NodeId>,
}

impl Navigation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark links to the current page `active`.
    pub fn update_active_link(&self, host: &mut Host) {
        let page = current_page(&host.viewport.path);
        for &link in &self.links {
            if host.doc.attr(link, "href") == Some(page) {
                host.doc.add_class(link, "active");
            } else {
                host.doc.remove_class(link, "active");
            }
        }
    }

    fn close_menu(&self, doc: &mut Document) {
        if let Some(menu) = self.menu {
            doc.remove_class(menu, "active");
        }
    }
}

/// Last path segment, or `index.html` for a directory path.
pub fn current_page(path: &str) -> &str {
    match path.rsplit('/').next() {
        Some(last) if !last.is_empty() => last,
        _ => "index.html",
    }
}

impl Widget for Navigation {
    fn name(&self) -> &'static str {
        "navigation"
    }

    fn install(&mut self, host: &mut Host) -> Result<()> {
        let doc = &host.doc;
        self.menu_toggle = doc.query(doc.root, &Selector::parse(".menu-toggle")?);
        self.menu = doc.query(doc.root, &Selector::parse("nav ul")?);
        self.links = doc.query_all(doc.root, &Selector::parse("nav a")?);
        self.update_active_link(host);
        Ok(())
    }

    fn handle_event(&mut self, host: &mut Host, event: &PageEvent) -> EventResponse {
        match event {
            PageEvent::Click { target } => {
                let target = *target;
                if let Some(toggle) = self.menu_toggle
                    && host.doc.is_inclusive_ancestor(toggle, target)
                {
                    if let Some(menu) = self.menu {
                        host.doc.toggle_class(menu, "active");
                    }
                    return EventResponse::HANDLED;
                }
                if self
                    .links
                    .iter()
                    .any(|&link| host.doc.is_inclusive_ancestor(link, target))
                {
                    self.close_menu(&mut host.doc);
                    return EventResponse::HANDLED;
                }
                EventResponse::IGNORED
            },
            PageEvent::Scroll { .. } => {
                self.update_active_link(host);
                EventResponse::IGNORED
            },
            _ => EventResponse::IGNORED,
        }
    }
}
