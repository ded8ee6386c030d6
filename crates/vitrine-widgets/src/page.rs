//! The page host: document, viewport, host services, and widget dispatch.
//!
//! A [`Page`] owns everything a widget may touch through [`Host`] and
//! delivers each [`PageEvent`] to every installed widget in install order.
//! Widgets never call each other; each decides for itself whether an event
//! is relevant.

use std::any::Any;

use vitrine_dom::{Document, NodeId, Selector};
use vitrine_types::config::SiteConfig;
use vitrine_types::error::{Result, VitrineError};
use vitrine_types::input::Key;

use crate::event::{EventResponse, PageEvent, TimerTag};
use crate::host::{
    Clipboard, FormTransport, HttpTransport, KeyValueStore, MemoryClipboard, MemoryStore, Timers,
};

/// A pending programmatic scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub top: i32,
    pub smooth: bool,
}

/// Viewport state reported by (or requested from) the host.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub scroll_y: i32,
    /// Location path, e.g. `/blog/index.html`.
    pub path: String,
    pub hostname: String,
    pub prefers_reduced_motion: bool,
    scroll_request: Option<ScrollRequest>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scroll_y: 0,
            path: "/".to_string(),
            hostname: "localhost".to_string(),
            prefers_reduced_motion: false,
            scroll_request: None,
        }
    }
}

impl Viewport {
    /// The scroll the page asked for most recently, if not yet applied.
    pub fn scroll_request(&self) -> Option<ScrollRequest> {
        self.scroll_request
    }
}

/// Everything a widget may read or mutate.
pub struct Host {
    pub doc: Document,
    pub viewport: Viewport,
    pub timers: Timers<TimerTag>,
    pub store: Box<dyn KeyValueStore>,
    pub clipboard: Box<dyn Clipboard>,
    pub transport: Box<dyn FormTransport>,
}

impl Host {
    /// Ask the viewport to scroll. Applied by the page after the current
    /// dispatch turn.
    pub fn request_scroll(&mut self, top: i32, smooth: bool) {
        self.viewport.scroll_request = Some(ScrollRequest { top, smooth });
    }

    /// Resolve a selector against the whole document.
    pub fn query(&self, selector: &str) -> Result<Option<NodeId>> {
        let sel = Selector::parse(selector)?;
        Ok(self.doc.query(self.doc.root, &sel))
    }

    /// All matches of a selector in document order.
    pub fn query_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let sel = Selector::parse(selector)?;
        Ok(self.doc.query_all(self.doc.root, &sel))
    }
}

/// A page-enhancement widget.
pub trait Widget: Any {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Attach to the page. Called once, before any event.
    fn install(&mut self, host: &mut Host) -> Result<()>;

    /// React to an event. Errors are handled inside; nothing propagates.
    fn handle_event(&mut self, host: &mut Host, event: &PageEvent) -> EventResponse;
}

/// A document plus its installed widgets.
pub struct Page {
    host: Host,
    widgets: Vec<Box<dyn Widget>>,
}

impl Page {
    /// Wrap a document with in-memory store and clipboard and the HTTP form
    /// transport.
    pub fn new(doc: Document) -> Self {
        Self {
            host: Host {
                doc,
                viewport: Viewport::default(),
                timers: Timers::new(),
                store: Box::new(MemoryStore::new()),
                clipboard: Box::new(MemoryClipboard::new()),
                transport: Box::new(HttpTransport::new()),
            },
            widgets: Vec::new(),
        }
    }

    pub fn with_store(mut self, store: impl KeyValueStore + 'static) -> Self {
        self.host.store = Box::new(store);
        self
    }

    pub fn with_clipboard(mut self, clipboard: impl Clipboard + 'static) -> Self {
        self.host.clipboard = Box::new(clipboard);
        self
    }

    pub fn with_transport(mut self, transport: impl FormTransport + 'static) -> Self {
        self.host.transport = Box::new(transport);
        self
    }

    pub fn with_reduced_motion(mut self, reduced: bool) -> Self {
        self.host.viewport.prefers_reduced_motion = reduced;
        self
    }

    /// Set the location from a path or an absolute `http(s)` URL.
    pub fn with_location(mut self, location: &str) -> Self {
        self.set_location(location);
        self
    }

    /// Update the location without dispatching anything.
    pub fn set_location(&mut self, location: &str) {
        let (hostname, path) = split_location(location);
        if let Some(hostname) = hostname {
            self.host.viewport.hostname = hostname;
        }
        self.host.viewport.path = path;
    }

    /// Install a widget. A widget whose install fails is not kept.
    pub fn install(&mut self, mut widget: Box<dyn Widget>) -> Result<()> {
        widget.install(&mut self.host)?;
        log::info!("installed {}", widget.name());
        self.widgets.push(widget);
        Ok(())
    }

    /// Install the full widget set driven by `config`.
    pub fn install_standard(&mut self, config: &SiteConfig) -> Result<()> {
        config.validate()?;
        self.install(Box::new(crate::theme::ThemeManager::new(&config.theme)))?;
        self.install(Box::new(crate::nav::Navigation::new()))?;
        self.install(Box::new(crate::lightbox::Lightbox::new(&config.lightbox)))?;
        self.install(Box::new(crate::scroll_top::ScrollToTop::new(
            &config.scroll_to_top,
        )))?;
        self.install(Box::new(crate::copy_code::CopyCode::new(&config.copy_code)))?;
        self.install(Box::new(crate::form::FormHandler::new(&config.form)))?;
        self.install(Box::new(crate::analytics::Analytics::new(&config.analytics)))?;
        self.install(Box::new(crate::reveal::Reveal::new(&config.reveal)))?;
        Ok(())
    }

    // -- dispatch --

    /// Deliver `event` to every widget, then apply any scroll a widget
    /// requested (which dispatches a follow-up [`PageEvent::Scroll`]).
    pub fn dispatch(&mut self, event: PageEvent) -> EventResponse {
        if let PageEvent::Scroll { y } = event {
            self.host.viewport.scroll_y = y;
        }
        let mut response = EventResponse::IGNORED;
        for widget in &mut self.widgets {
            let r = widget.handle_event(&mut self.host, &event);
            if r.handled {
                log::debug!("{} handled {:?}", widget.name(), event);
            }
            response = response.merge(r);
        }
        if let Some(req) = self.host.viewport.scroll_request.take()
            && req.top != self.host.viewport.scroll_y
        {
            self.dispatch(PageEvent::Scroll { y: req.top });
        }
        response
    }

    /// Click the first element matching `selector`.
    pub fn click(&mut self, selector: &str) -> Result<EventResponse> {
        let target = self.require(selector)?;
        Ok(self.dispatch(PageEvent::Click { target }))
    }

    pub fn click_node(&mut self, target: NodeId) -> EventResponse {
        self.dispatch(PageEvent::Click { target })
    }

    pub fn key(&mut self, key: Key) -> EventResponse {
        self.dispatch(PageEvent::KeyDown(key))
    }

    pub fn scroll_to(&mut self, y: i32) -> EventResponse {
        self.dispatch(PageEvent::Scroll { y })
    }

    /// Submit the form matching `selector`.
    pub fn submit(&mut self, selector: &str) -> Result<EventResponse> {
        let form = self.require(selector)?;
        Ok(self.dispatch(PageEvent::Submit { form }))
    }

    /// Report a visibility change for every element matching `selector`.
    pub fn intersect(&mut self, selector: &str, ratio: f32) -> Result<EventResponse> {
        let targets = self.host.query_all(selector)?;
        if targets.is_empty() {
            return Err(VitrineError::Dom(format!("no element matches {selector}")));
        }
        let mut response = EventResponse::IGNORED;
        for target in targets {
            response = response.merge(self.dispatch(PageEvent::Intersect { target, ratio }));
        }
        Ok(response)
    }

    /// Set the value of the form control matching `selector`.
    pub fn input(&mut self, selector: &str, value: &str) -> Result<()> {
        let node = self.require(selector)?;
        self.host.doc.set_form_value(node, value);
        Ok(())
    }

    /// Let `ms` of virtual time pass, firing due timers in deadline order.
    pub fn advance(&mut self, ms: u64) {
        let until = self.host.timers.now().saturating_add(ms);
        while let Some(tag) = self.host.timers.pop_due(until) {
            self.dispatch(PageEvent::Timer(tag));
        }
        self.host.timers.advance_to(until);
    }

    fn require(&self, selector: &str) -> Result<NodeId> {
        self.host
            .query(selector)?
            .ok_or_else(|| VitrineError::Dom(format!("no element matches {selector}")))
    }

    // -- access --

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut Host {
        &mut self.host
    }

    pub fn doc(&self) -> &Document {
        &self.host.doc
    }

    pub fn viewport(&self) -> &Viewport {
        &self.host.viewport
    }

    /// Names of the installed widgets in install order.
    pub fn widget_names(&self) -> Vec<&'static str> {
        self.widgets.iter().map(|w| w.name()).collect()
    }

    /// The installed widget of type `W`, if any.
    pub fn widget<W: Widget>(&self) -> Option<&W> {
        self.widgets.iter().find_map(|w| {
            let any: &dyn Any = w.as_ref();
            any.downcast_ref::<W>()
        })
    }

    pub fn widget_mut<W: Widget>(&mut self) -> Option<&mut W> {
        self.widgets.iter_mut().find_map(|w| {
            let any: &mut dyn Any = w.as_mut();
            any.downcast_mut::<W>()
        })
    }

    /// Split-borrow a widget together with the host, for widget operations
    /// that need both.
    pub fn widget_with_host<W: Widget>(&mut self) -> Option<(&mut W, &mut Host)> {
        let host = &mut self.host;
        let widget = self.widgets.iter_mut().find_map(|w| {
            let any: &mut dyn Any = w.as_mut();
            any.downcast_mut::<W>()
        })?;
        Some((widget, host))
    }

    /// Serialize the current document.
    pub fn to_html(&self) -> String {
        vitrine_dom::to_html(&self.host.doc)
    }
}

/// Split `http://host/path` into hostname and path. A bare path keeps the
/// current hostname.
fn split_location(location: &str) -> (Option<String>, String) {
    let Some((_, rest)) = location.split_once("://") else {
        let path = if location.starts_with('/') {
            location.to_string()
        } else {
            format!("/{location}")
        };
        return (None, path);
    };
    let (authority, path) = match rest.find('/') {
        Some(i) => (&rest[..i], &rest[i..]),
        None => (rest, "/"),
    };
    let host = authority.split(':').next().unwrap_or(authority);
    let path = path.split(['?', '#']).next().unwrap_or("/");
    (Some(host.to_ascii_lowercase()), path.to_string())
}
