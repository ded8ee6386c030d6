//! Copy-to-clipboard buttons on code blocks.

use vitrine_dom::{Document, ElementData, NodeId, NodeKind, Selector, TagName};
use vitrine_types::config::CopyCodeConfig;
use vitrine_types::error::Result;

use crate::event::{EventResponse, PageEvent, TimerTag};
use crate::host::TimerId;
use crate::page::{Host, Widget};

const BLOCK_SELECTOR: &str = "pre code, pre, code.code-block";
const BUTTON_CLASS: &str = "copy-btn";
const ICON_IDLE: &str = "\u{1f4cb}";
const ICON_DONE: &str = "\u{2713}";

#[derive(Debug)]
struct CopyTarget {
    block: NodeId,
    button: NodeId,
    icon: NodeId,
    text: NodeId,
    reset: Option<TimerId>,
}

pub struct CopyCode {
    feedback_ms: u64,
    targets: Vec<CopyTarget>,
}

impl CopyCode {
    pub fn new(config: &CopyCodeConfig) -> Self {
        Self {
            feedback_ms: config.feedback_ms,
            targets: Vec::new(),
        }
    }

    /// Buttons added at install, in document order.
    pub fn buttons(&self) -> Vec<NodeId> {
        self.targets.iter().map(|t| t.button).collect()
    }

    fn attach(doc: &mut Document, block: NodeId) -> Option<CopyTarget> {
        let wrapper = if doc.is_tag(block, &TagName::Pre) {
            block
        } else {
            doc.ancestors(block)
                .find(|&n| doc.is_tag(n, &TagName::Pre))
                .or(doc.get(block).parent)?
        };
        let has_button = doc
            .get(wrapper)
            .children
            .iter()
            .any(|&c| doc.has_class(c, BUTTON_CLASS));
        if has_button {
            return None;
        }
        if matches!(doc.style(wrapper, "position").as_deref(), None | Some("static")) {
            doc.set_style(wrapper, "position", "relative");
        }

        let button = doc.create_element(
            ElementData::new(TagName::Button)
                .with_attr("class", BUTTON_CLASS)
                .with_attr("aria-label", "Copy code to clipboard"),
        );
        let icon = doc.create_element(ElementData::new(TagName::Span).with_attr("class", "copy-icon"));
        doc.set_text_content(icon, ICON_IDLE);
        let text = doc.create_element(ElementData::new(TagName::Span).with_attr("class", "copy-text"));
        doc.set_text_content(text, "Copy");
        doc.append_child(button, icon);
        doc.append_child(button, text);
        doc.append_child(wrapper, button);

        Some(CopyTarget {
            block,
            button,
            icon,
            text,
            reset: None,
        })
    }

    fn copy(&mut self, host: &mut Host, idx: usize) {
        let feedback_ms = self.feedback_ms;
        let target = &mut self.targets[idx];
        let code = code_text(&host.doc, target.block);
        match host.clipboard.write_text(&code) {
            Ok(()) => {
                host.doc.set_text_content(target.icon, ICON_DONE);
                host.doc.set_text_content(target.text, "Copied!");
                host.doc.add_class(target.button, "copied");
                log::debug!("copied {} bytes of code", code.len());
            },
            Err(e) => {
                log::error!("failed to copy: {e}");
                host.doc.set_text_content(target.text, "Failed");
            },
        }
        if let Some(id) = target.reset.take() {
            host.timers.cancel(id);
        }
        target.reset = Some(host.timers.schedule(
            feedback_ms,
            TimerTag::CopyFeedbackReset {
                button: target.button,
            },
        ));
    }

    fn reset(&mut self, host: &mut Host, button: NodeId) -> bool {
        let Some(target) = self.targets.iter_mut().find(|t| t.button == button) else {
            return false;
        };
        target.reset = None;
        host.doc.set_text_content(target.icon, ICON_IDLE);
        host.doc.set_text_content(target.text, "Copy");
        host.doc.remove_class(target.button, "copied");
        true
    }
}

/// Text of a code block, leaving out any copy button nested inside it.
fn code_text(doc: &Document, block: NodeId) -> String {
    let mut out = String::new();
    let mut stack = vec![block];
    while let Some(n) = stack.pop() {
        match &doc.get(n).kind {
            NodeKind::Text(s) => out.push_str(s),
            NodeKind::Element(_) if n != block && doc.has_class(n, BUTTON_CLASS) => {},
            _ => stack.extend(doc.get(n).children.iter().rev().copied()),
        }
    }
    out
}

impl Widget for CopyCode {
    fn name(&self) -> &'static str {
        "copy-code"
    }

    fn install(&mut self, host: &mut Host) -> Result<()> {
        let selector = Selector::parse(BLOCK_SELECTOR)?;
        let doc = &mut host.doc;
        for block in doc.query_all(doc.root, &selector) {
            if let Some(target) = Self::attach(doc, block) {
                self.targets.push(target);
            }
        }
        log::debug!("copy buttons on {} code blocks", self.targets.len());
        Ok(())
    }

    fn handle_event(&mut self, host: &mut Host, event: &PageEvent) -> EventResponse {
        match event {
            PageEvent::Click { target } => {
                let hit = self
                    .targets
                    .iter()
                    .position(|t| host.doc.is_inclusive_ancestor(t.button, *target));
                match hit {
                    Some(idx) => {
                        self.copy(host, idx);
                        EventResponse::HANDLED
                    },
                    None => EventResponse::IGNORED,
                }
            },
            PageEvent::Timer(TimerTag::CopyFeedbackReset { button }) => {
                if self.reset(host, *button) {
                    EventResponse::HANDLED
                } else {
                    EventResponse::IGNORED
                }
            },
            _ => EventResponse::IGNORED,
        }
    }
}
