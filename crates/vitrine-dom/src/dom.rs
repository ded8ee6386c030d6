//! Arena-based DOM tree.
//!
//! Nodes are stored in a flat `Vec` arena and linked by index. Detached
//! nodes stay in the arena (with no parent) so that a [`NodeId`] held by a
//! widget never dangles; they are simply unreachable from the root.

use crate::selector::Selector;

/// Index into the [`Document`]'s node arena.
pub type NodeId = usize;

// ------------------------------------------------------------------
// Node types
// ------------------------------------------------------------------

/// The root of an HTML document.
#[derive(Debug, Clone)]
pub struct Document {
    pub nodes: Vec<Node>,
    pub root: NodeId,
}

/// A single node in the DOM tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// The kind of DOM node.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Document,
    Doctype(String),
    Element(ElementData),
    Text(String),
    Comment(String),
}

/// Data associated with an Element node.
#[derive(Debug, Clone)]
pub struct ElementData {
    pub tag: TagName,
    pub attributes: Vec<Attribute>,
}

/// An element attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

// ------------------------------------------------------------------
// TagName
// ------------------------------------------------------------------

/// HTML tag names the widgets and the parser care about.
///
/// Anything else is stored as `Unknown(String)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagName {
    // Document structure
    Html,
    Head,
    Body,
    Title,
    Meta,
    Link,
    Base,
    Style,
    Script,
    // Containers
    Div,
    Span,
    P,
    A,
    Br,
    Hr,
    // Lists
    Ul,
    Ol,
    Li,
    // Forms
    Form,
    Input,
    Button,
    Select,
    Option,
    Textarea,
    Label,
    // Media
    Img,
    Figure,
    Figcaption,
    Source,
    // Code
    Pre,
    Code,
    // Sectioning
    Nav,
    Header,
    Footer,
    Main,
    Section,
    Article,
    Aside,
    // Anything else
    Unknown(String),
}

impl TagName {
    /// Parse a tag name (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "html" => Self::Html,
            "head" => Self::Head,
            "body" => Self::Body,
            "title" => Self::Title,
            "meta" => Self::Meta,
            "link" => Self::Link,
            "base" => Self::Base,
            "style" => Self::Style,
            "script" => Self::Script,
            "div" => Self::Div,
            "span" => Self::Span,
            "p" => Self::P,
            "a" => Self::A,
            "br" => Self::Br,
            "hr" => Self::Hr,
            "ul" => Self::Ul,
            "ol" => Self::Ol,
            "li" => Self::Li,
            "form" => Self::Form,
            "input" => Self::Input,
            "button" => Self::Button,
            "select" => Self::Select,
            "option" => Self::Option,
            "textarea" => Self::Textarea,
            "label" => Self::Label,
            "img" => Self::Img,
            "figure" => Self::Figure,
            "figcaption" => Self::Figcaption,
            "source" => Self::Source,
            "pre" => Self::Pre,
            "code" => Self::Code,
            "nav" => Self::Nav,
            "header" => Self::Header,
            "footer" => Self::Footer,
            "main" => Self::Main,
            "section" => Self::Section,
            "article" => Self::Article,
            "aside" => Self::Aside,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Get the string representation of this tag name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Html => "html",
            Self::Head => "head",
            Self::Body => "body",
            Self::Title => "title",
            Self::Meta => "meta",
            Self::Link => "link",
            Self::Base => "base",
            Self::Style => "style",
            Self::Script => "script",
            Self::Div => "div",
            Self::Span => "span",
            Self::P => "p",
            Self::A => "a",
            Self::Br => "br",
            Self::Hr => "hr",
            Self::Ul => "ul",
            Self::Ol => "ol",
            Self::Li => "li",
            Self::Form => "form",
            Self::Input => "input",
            Self::Button => "button",
            Self::Select => "select",
            Self::Option => "option",
            Self::Textarea => "textarea",
            Self::Label => "label",
            Self::Img => "img",
            Self::Figure => "figure",
            Self::Figcaption => "figcaption",
            Self::Source => "source",
            Self::Pre => "pre",
            Self::Code => "code",
            Self::Nav => "nav",
            Self::Header => "header",
            Self::Footer => "footer",
            Self::Main => "main",
            Self::Section => "section",
            Self::Article => "article",
            Self::Aside => "aside",
            Self::Unknown(s) => s.as_str(),
        }
    }

    /// Returns `true` if this is a void element (no content, no end tag).
    pub fn is_void(&self) -> bool {
        if let Self::Unknown(s) = self {
            return matches!(
                s.as_str(),
                "area" | "col" | "embed" | "track" | "wbr" | "param"
            );
        }
        matches!(
            self,
            Self::Br
                | Self::Hr
                | Self::Img
                | Self::Input
                | Self::Meta
                | Self::Link
                | Self::Base
                | Self::Source
        )
    }

    /// Returns `true` if this tag's content is raw text (`script`, `style`).
    pub fn is_raw_text(&self) -> bool {
        matches!(self, Self::Script | Self::Style)
    }

    /// Returns `true` if this tag's content is escapable raw text
    /// (`title`, `textarea`).
    pub fn is_rcdata(&self) -> bool {
        matches!(self, Self::Title | Self::Textarea)
    }

    /// Returns `true` if this element belongs in `<head>`.
    pub fn is_head_content(&self) -> bool {
        matches!(
            self,
            Self::Title | Self::Meta | Self::Link | Self::Base | Self::Style
        )
    }
}

// ------------------------------------------------------------------
// ElementData
// ------------------------------------------------------------------

impl ElementData {
    /// Create a new `ElementData` with the given tag and no attributes.
    pub fn new(tag: TagName) -> Self {
        Self {
            tag,
            attributes: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Get an attribute value by name.
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }

    /// Set an attribute, replacing any previous value.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value.to_string(),
            None => self.attributes.push(Attribute {
                name: name.to_string(),
                value: value.to_string(),
            }),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes.retain(|a| a.name != name);
    }

    /// Iterate the whitespace-separated tokens of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.get_attribute("class")
            .unwrap_or("")
            .split_ascii_whitespace()
    }

    /// Check if this element has a given CSS class.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Add a class token if not already present.
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let mut tokens: Vec<&str> = self.classes().collect();
        tokens.push(class);
        let joined = tokens.join(" ");
        self.set_attribute("class", &joined);
    }

    /// Remove every occurrence of a class token.
    pub fn remove_class(&mut self, class: &str) {
        if !self.has_class(class) {
            return;
        }
        let joined = self
            .classes()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attribute("class", &joined);
    }

    /// Toggle a class token. Returns `true` if the class is now present.
    pub fn toggle_class(&mut self, class: &str) -> bool {
        if self.has_class(class) {
            self.remove_class(class);
            false
        } else {
            self.add_class(class);
            true
        }
    }

    /// Get the `id` attribute if present.
    pub fn id(&self) -> Option<&str> {
        self.get_attribute("id")
    }

    /// Get the `href` attribute if present (for links).
    pub fn href(&self) -> Option<&str> {
        self.get_attribute("href")
    }

    /// Get the `src` attribute if present (for images / scripts).
    pub fn src(&self) -> Option<&str> {
        self.get_attribute("src")
    }

    /// Read one property from the inline `style` attribute.
    pub fn style_property(&self, property: &str) -> Option<String> {
        parse_inline_style(self.get_attribute("style")?)
            .into_iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v)
    }

    /// Set one inline style property. An empty value removes it, and the
    /// `style` attribute itself is dropped once no properties remain.
    pub fn set_style_property(&mut self, property: &str, value: &str) {
        let mut decls = self
            .get_attribute("style")
            .map(parse_inline_style)
            .unwrap_or_default();
        let property = property.to_ascii_lowercase();
        match decls.iter().position(|(k, _)| *k == property) {
            Some(i) if value.is_empty() => {
                decls.remove(i);
            },
            Some(i) => decls[i].1 = value.to_string(),
            None if value.is_empty() => {},
            None => decls.push((property, value.to_string())),
        }
        if decls.is_empty() {
            self.remove_attribute("style");
        } else {
            let text = decls
                .iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect::<Vec<_>>()
                .join("; ");
            self.set_attribute("style", &text);
        }
    }
}

/// Split an inline style declaration list into `(property, value)` pairs.
fn parse_inline_style(text: &str) -> Vec<(String, String)> {
    text.split(';')
        .filter_map(|decl| {
            let (k, v) = decl.split_once(':')?;
            let k = k.trim().to_ascii_lowercase();
            let v = v.trim();
            if k.is_empty() {
                None
            } else {
                Some((k, v.to_string()))
            }
        })
        .collect()
}

// ------------------------------------------------------------------
// Document
// ------------------------------------------------------------------

impl Document {
    /// Create an empty document with a synthetic `Document` root node.
    pub fn new() -> Self {
        let root_node = Node {
            kind: NodeKind::Document,
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root_node],
            root: 0,
        }
    }

    /// Add a new detached node to the arena and return its [`NodeId`].
    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached element.
    pub fn create_element(&mut self, data: ElementData) -> NodeId {
        self.add_node(NodeKind::Element(data))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.add_node(NodeKind::Text(text.to_string()))
    }

    /// Append `child_id` as the last child of `parent_id`, detaching it
    /// from its previous parent first.
    pub fn append_child(&mut self, parent_id: NodeId, child_id: NodeId) {
        self.detach(child_id);
        self.nodes[parent_id].children.push(child_id);
        self.nodes[child_id].parent = Some(parent_id);
    }

    /// Insert `child_id` at `index` among `parent_id`'s children (clamped
    /// to the child count).
    pub fn insert_child(&mut self, parent_id: NodeId, index: usize, child_id: NodeId) {
        self.detach(child_id);
        let children = &mut self.nodes[parent_id].children;
        let index = index.min(children.len());
        children.insert(index, child_id);
        self.nodes[child_id].parent = Some(parent_id);
    }

    /// Unlink a node from its parent. The node and its subtree stay in the
    /// arena.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id].parent.take() {
            self.nodes[parent].children.retain(|&c| c != id);
        }
    }

    /// Get a reference to a node by ID.
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Get a mutable reference to a node by ID.
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    /// Get the [`ElementData`] for a node, if it is an `Element`.
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes.get(id)?.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Mutable [`ElementData`] for a node, if it is an `Element`.
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(id)?.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Whether `id` is an element with the given tag.
    pub fn is_tag(&self, id: NodeId, tag: &TagName) -> bool {
        self.element(id).is_some_and(|e| e.tag == *tag)
    }

    // -- attribute / class / style shorthands (no-ops on non-elements) --

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.get_attribute(name)
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(e) = self.element_mut(id) {
            e.set_attribute(name, value);
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(e) = self.element_mut(id) {
            e.remove_attribute(name);
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_class(class))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(e) = self.element_mut(id) {
            e.add_class(class);
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(e) = self.element_mut(id) {
            e.remove_class(class);
        }
    }

    /// Toggle a class. Returns `true` if the class is now present.
    pub fn toggle_class(&mut self, id: NodeId, class: &str) -> bool {
        self.element_mut(id).is_some_and(|e| e.toggle_class(class))
    }

    pub fn style(&self, id: NodeId, property: &str) -> Option<String> {
        self.element(id)?.style_property(property)
    }

    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        if let Some(e) = self.element_mut(id) {
            e.set_style_property(property, value);
        }
    }

    // -- text --

    /// Get the concatenated text content of a node and all its
    /// descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    /// Recursive text collection helper.
    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id].kind {
            NodeKind::Text(s) => out.push_str(s),
            NodeKind::Comment(_) | NodeKind::Doctype(_) => {},
            _ => {
                for &child in &self.nodes[id].children {
                    self.collect_text(child, out);
                }
            },
        }
    }

    /// Replace all children of `id` with a single text node.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        if let NodeKind::Text(ref mut s) = self.nodes[id].kind {
            *s = text.to_string();
            return;
        }
        for child in std::mem::take(&mut self.nodes[id].children) {
            self.nodes[child].parent = None;
        }
        if !text.is_empty() {
            let t = self.create_text(text);
            self.append_child(id, t);
        }
    }

    /// Current value of a form control: the `value` attribute for inputs,
    /// the text content for a `<textarea>`.
    pub fn form_value(&self, id: NodeId) -> String {
        if self.is_tag(id, &TagName::Textarea) {
            self.text_content(id)
        } else {
            self.attr(id, "value").unwrap_or("").to_string()
        }
    }

    /// Set the value of a form control (see [`Document::form_value`]).
    pub fn set_form_value(&mut self, id: NodeId, value: &str) {
        if self.is_tag(id, &TagName::Textarea) {
            self.set_text_content(id, value);
        } else if value.is_empty() {
            self.remove_attr(id, "value");
        } else {
            self.set_attr(id, "value", value);
        }
    }

    // -- traversal --

    /// All nodes below `id` in document (pre-)order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[id].children.iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.nodes[n].children.iter().rev().copied());
        }
        out
    }

    /// Ancestors of `id`, nearest first, excluding `id`.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.nodes[id].parent, move |&n| self.nodes[n].parent)
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Whether `id` is reachable from the document root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.is_inclusive_ancestor(self.root, id)
    }

    /// Nearest inclusive ancestor element matching `selector`.
    pub fn closest(&self, id: NodeId, selector: &Selector) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&n| selector.matches(self, n))
    }

    /// Nearest inclusive ancestor element carrying attribute `name`.
    pub fn closest_with_attribute(&self, id: NodeId, name: &str) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&n| self.element(n).is_some_and(|e| e.has_attribute(name)))
    }

    /// All elements below `scope` matching `selector`, in document order.
    pub fn query_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&n| selector.matches(self, n))
            .collect()
    }

    /// First element below `scope` matching `selector`.
    pub fn query(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|&n| selector.matches(self, n))
    }

    /// Find the first element whose `id` attribute matches `target`.
    pub fn get_element_by_id(&self, target: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|&n| self.element(n).is_some_and(|e| e.id() == Some(target)))
    }

    /// The `<html>` element.
    pub fn document_element(&self) -> Option<NodeId> {
        self.nodes[self.root]
            .children
            .iter()
            .copied()
            .find(|&n| self.is_tag(n, &TagName::Html))
    }

    /// Find the `<body>` element.
    pub fn body(&self) -> Option<NodeId> {
        self.find_first_element(&TagName::Body)
    }

    /// Find the `<head>` element.
    pub fn head(&self) -> Option<NodeId> {
        self.find_first_element(&TagName::Head)
    }

    /// Find the `<title>` text content, if any.
    pub fn title(&self) -> Option<String> {
        let title_id = self.find_first_element(&TagName::Title)?;
        let text = self.text_content(title_id);
        if text.is_empty() { None } else { Some(text) }
    }

    /// Depth-first search for the first element with the given tag.
    fn find_first_element(&self, tag: &TagName) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|&n| self.is_tag(n, tag))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

// ------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------
