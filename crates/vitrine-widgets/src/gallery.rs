//! Gallery navigation core.
//!
//! The lightbox's state machine without any surface: which triggers are
//! browsable together, which one is shown, and whether the viewer is open.
//! Everything here is pure so it can be exercised without a rendered page.

use vitrine_dom::{Document, NodeId};

/// Whether the viewer surface is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewerMode {
    #[default]
    Closed,
    Open,
}

/// Mode, working set and position of a gallery viewer.
///
/// The working set is left in place on close; it is stale and inert until
/// the next [`GalleryState::open`] replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryState {
    mode: ViewerMode,
    working_set: Vec<NodeId>,
    index: usize,
}

impl GalleryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open on `activated` within `working_set`. A set that does not contain
    /// the activated trigger is replaced by the singleton `[activated]`.
    pub fn open(&mut self, working_set: Vec<NodeId>, activated: NodeId) {
        match working_set.iter().position(|&n| n == activated) {
            Some(index) => {
                self.working_set = working_set;
                self.index = index;
            },
            None => {
                self.working_set = vec![activated];
                self.index = 0;
            },
        }
        self.mode = ViewerMode::Open;
    }

    /// Close. Idempotent.
    pub fn close(&mut self) {
        self.mode = ViewerMode::Closed;
    }

    /// Step forward cyclically. Returns `false` (and does nothing) while
    /// closed.
    pub fn next(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }
        self.index = (self.index + 1) % self.working_set.len();
        true
    }

    /// Step backward cyclically. Returns `false` (and does nothing) while
    /// closed.
    pub fn prev(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }
        let len = self.working_set.len();
        self.index = (self.index + len - 1) % len;
        true
    }

    pub fn mode(&self) -> ViewerMode {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        self.mode == ViewerMode::Open
    }

    /// The trigger on display, while open.
    pub fn current(&self) -> Option<NodeId> {
        if self.is_open() {
            self.working_set.get(self.index).copied()
        } else {
            None
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.working_set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.working_set.is_empty()
    }

    pub fn working_set(&self) -> &[NodeId] {
        &self.working_set
    }

    /// Prev/next affordances are shown only for multi-item sets.
    pub fn has_navigation(&self) -> bool {
        self.working_set.len() > 1
    }
}

/// The triggers browsable together with `activated`, in document order.
///
/// Scoped to the nearest inclusive ancestor carrying `gallery_attr`; an
/// ungrouped trigger yields the singleton `[activated]`.
pub fn compute_working_set(
    doc: &Document,
    activated: NodeId,
    trigger_class: &str,
    gallery_attr: &str,
) -> Vec<NodeId> {
    let Some(group) = doc.closest_with_attribute(activated, gallery_attr) else {
        return vec![activated];
    };
    let set: Vec<NodeId> = std::iter::once(group)
        .chain(doc.descendants(group))
        .filter(|&n| doc.has_class(n, trigger_class))
        .collect();
    if set.contains(&activated) {
        set
    } else {
        vec![activated]
    }
}

/// What the viewer displays for one trigger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerView {
    pub source: String,
    pub label: String,
    pub caption: String,
}

/// Read a trigger's display attributes. Missing attributes become empty
/// strings.
pub fn resolve_trigger(doc: &Document, trigger: NodeId) -> TriggerView {
    let non_empty = |name: &str| doc.attr(trigger, name).filter(|v| !v.is_empty());
    let source = ["data-fullsize", "src", "href"]
        .into_iter()
        .find_map(non_empty)
        .unwrap_or_default()
        .to_string();
    let label = non_empty("alt").unwrap_or_default().to_string();
    let caption = non_empty("data-caption")
        .map(str::to_string)
        .unwrap_or_else(|| label.clone());
    TriggerView {
        source,
        label,
        caption,
    }
}
