//! Forgiving HTML parser.
//!
//! A practical subset of HTML tokenization for hand-written static pages:
//! start/end tags, quoted and unquoted attributes, comments, DOCTYPE, raw
//! text (`<script>`, `<style>`), escapable raw text (`<title>`,
//! `<textarea>`), and common character references. The tree builder keeps
//! a stack of open elements; stray end tags are ignored and unclosed
//! elements are closed at end of input. The parser never fails -- any
//! input produces a document with `<html>`, `<head>` and `<body>`.

use crate::dom::{Attribute, Document, ElementData, NodeId, NodeKind, TagName};

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    StartTag(StartTag),
    EndTag(String),
    Text(String),
    Comment(String),
    Doctype(String),
}

#[derive(Debug, Clone, PartialEq)]
struct StartTag {
    name: String,
    attributes: Vec<Attribute>,
    self_closing: bool,
}

/// Parse an HTML string into a [`Document`].
pub fn parse_html(input: &str) -> Document {
    let tokens = tokenize(input);
    let mut doc = build_tree(tokens);
    ensure_skeleton(&mut doc);
    log::debug!("parsed {} bytes into {} nodes", input.len(), doc.nodes.len());
    doc
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, s: &str) -> bool {
        if self.rest().starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn skip_ws(&mut self) {
        self.eat_while(char::is_whitespace);
    }

    /// Consume up to (not including) `needle`, or to end of input.
    fn take_until(&mut self, needle: &str) -> &'a str {
        let rest = self.rest();
        let len = rest.find(needle).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }
}

fn tokenize(input: &str) -> Vec<Token> {
    let mut cur = Cursor { src: input, pos: 0 };
    let mut tokens = Vec::new();

    while cur.peek().is_some() {
        let rest = cur.rest();
        if cur.eat("<!--") {
            let body = cur.take_until("-->");
            cur.eat("-->");
            tokens.push(Token::Comment(body.to_string()));
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            cur.pos += 2;
            let body = cur.take_until(">");
            cur.eat(">");
            if body
                .get(..7)
                .is_some_and(|p| p.eq_ignore_ascii_case("doctype"))
            {
                tokens.push(Token::Doctype(body[7..].trim().to_string()));
            } else {
                tokens.push(Token::Comment(body.to_string()));
            }
        } else if rest.starts_with("</") && rest[2..].starts_with(|c: char| c.is_ascii_alphabetic())
        {
            cur.pos += 2;
            let name = cur.eat_while(|c| !c.is_whitespace() && c != '>');
            let name = name.to_ascii_lowercase();
            cur.take_until(">");
            cur.eat(">");
            tokens.push(Token::EndTag(name));
        } else if rest.starts_with('<') && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
            cur.pos += 1;
            let Some(tag) = start_tag(&mut cur) else {
                break;
            };
            let tag_name = TagName::from_str(&tag.name);
            let self_closing = tag.self_closing;
            tokens.push(Token::StartTag(tag));
            if !self_closing && (tag_name.is_raw_text() || tag_name.is_rcdata()) {
                let text = raw_text_until_end(&mut cur, tag_name.as_str());
                if !text.is_empty() {
                    let text = if tag_name.is_rcdata() {
                        decode_entities(text)
                    } else {
                        text.to_string()
                    };
                    tokens.push(Token::Text(text));
                }
            }
        } else {
            // Text up to the next '<' (a lone '<' is literal text).
            let start = cur.pos;
            cur.bump();
            cur.take_until("<");
            tokens.push(Token::Text(decode_entities(&input[start..cur.pos])));
        }
    }
    tokens
}

/// Parse the remainder of a start tag after `<`. Returns `None` on EOF
/// inside the tag; the partial tag is dropped.
fn start_tag(cur: &mut Cursor<'_>) -> Option<StartTag> {
    let name = cur
        .eat_while(|c| !c.is_whitespace() && c != '/' && c != '>')
        .to_ascii_lowercase();
    let mut attributes: Vec<Attribute> = Vec::new();
    let mut self_closing = false;

    loop {
        cur.skip_ws();
        match cur.peek()? {
            '>' => {
                cur.bump();
                break;
            },
            '/' => {
                cur.bump();
                if cur.peek() == Some('>') {
                    cur.bump();
                    self_closing = true;
                    break;
                }
            },
            _ => {
                let attr_name = cur
                    .eat_while(|c| !c.is_whitespace() && !matches!(c, '=' | '>' | '/'))
                    .to_ascii_lowercase();
                if attr_name.is_empty() {
                    // '=' with no name; skip it.
                    cur.bump();
                    continue;
                }
                cur.skip_ws();
                let value = if cur.eat("=") {
                    cur.skip_ws();
                    match cur.peek()? {
                        q @ ('"' | '\'') => {
                            cur.bump();
                            let mut buf = [0u8; 4];
                            let v = cur.take_until(q.encode_utf8(&mut buf));
                            cur.peek()?;
                            cur.bump();
                            decode_entities(v)
                        },
                        _ => decode_entities(cur.eat_while(|c| !c.is_whitespace() && c != '>')),
                    }
                } else {
                    String::new()
                };
                // First occurrence wins.
                if !attributes.iter().any(|a| a.name == attr_name) {
                    attributes.push(Attribute {
                        name: attr_name,
                        value,
                    });
                }
            },
        }
    }

    Some(StartTag {
        name,
        attributes,
        self_closing,
    })
}

/// Consume raw text up to the matching `</name` end tag (case-insensitive).
fn raw_text_until_end<'a>(cur: &mut Cursor<'a>, name: &str) -> &'a str {
    let rest = cur.rest();
    let lower = rest.to_ascii_lowercase();
    let needle = format!("</{name}");
    let len = lower.find(&needle).unwrap_or(rest.len());
    cur.pos += len;
    &rest[..len]
}

/// Decode named and numeric character references.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').filter(|&semi| semi <= 10).and_then(|semi| {
            let ch = decode_reference(&rest[1..semi])?;
            Some((ch, semi + 1))
        });
        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &rest[consumed..];
            },
            None => {
                out.push('&');
                rest = &rest[1..];
            },
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code);
    }
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "times" => '\u{d7}',
        "copy" => '\u{a9}',
        "hellip" => '\u{2026}',
        "mdash" => '\u{2014}',
        "ndash" => '\u{2013}',
        "larr" => '\u{2190}',
        "uarr" => '\u{2191}',
        "rarr" => '\u{2192}',
        "darr" => '\u{2193}',
        _ => return None,
    };
    Some(ch)
}

// ---------------------------------------------------------------------------
// Tree builder
// ---------------------------------------------------------------------------

fn build_tree(tokens: Vec<Token>) -> Document {
    let mut doc = Document::new();
    let mut open: Vec<NodeId> = vec![doc.root];

    for token in tokens {
        let current = *open.last().unwrap_or(&doc.root);
        match token {
            Token::Doctype(name) => {
                if current == doc.root {
                    let id = doc.add_node(NodeKind::Doctype(name));
                    doc.append_child(current, id);
                }
            },
            Token::Comment(text) => {
                let id = doc.add_node(NodeKind::Comment(text));
                doc.append_child(current, id);
            },
            Token::Text(text) => {
                if current == doc.root && text.trim().is_empty() {
                    continue;
                }
                let id = doc.add_node(NodeKind::Text(text));
                doc.append_child(current, id);
            },
            Token::StartTag(StartTag {
                name,
                attributes,
                self_closing,
            }) => {
                let tag = TagName::from_str(&name);
                let void = tag.is_void();
                let id = doc.create_element(ElementData { tag, attributes });
                doc.append_child(current, id);
                if !void && !self_closing {
                    open.push(id);
                }
            },
            Token::EndTag(name) => {
                let pos = open
                    .iter()
                    .rposition(|&n| doc.element(n).is_some_and(|e| e.tag.as_str() == name));
                match pos {
                    Some(p) if p > 0 => open.truncate(p),
                    _ => log::trace!("ignoring stray </{name}>"),
                }
            },
        }
    }
    doc
}

/// Guarantee `<html>` with `<head>` first and `<body>` after it.
fn ensure_skeleton(doc: &mut Document) {
    let html = match doc.document_element() {
        Some(h) => h,
        None => {
            let html = doc.create_element(ElementData::new(TagName::Html));
            let kids = doc.get(doc.root).children.clone();
            for k in kids {
                if !matches!(doc.get(k).kind, NodeKind::Doctype(_)) {
                    doc.append_child(html, k);
                }
            }
            let root = doc.root;
            doc.append_child(root, html);
            html
        },
    };

    if doc.head().is_none() {
        let head = doc.create_element(ElementData::new(TagName::Head));
        let kids = doc.get(html).children.clone();
        for k in kids {
            if doc.element(k).is_some_and(|e| e.tag.is_head_content()) {
                doc.append_child(head, k);
            }
        }
        doc.insert_child(html, 0, head);
    }

    if doc.body().is_none() {
        let body = doc.create_element(ElementData::new(TagName::Body));
        let kids = doc.get(html).children.clone();
        for k in kids {
            if !doc.is_tag(k, &TagName::Head) {
                doc.append_child(body, k);
            }
        }
        doc.append_child(html, body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_document_structure() {
        let doc = parse_html(
            "<!DOCTYPE html><html><head><title>Hi</title></head><body><p>x</p></body></html>",
        );
        let html = doc.document_element().unwrap();
        let head = doc.head().unwrap();
        let body = doc.body().unwrap();
        assert_eq!(doc.get(head).parent, Some(html));
        assert_eq!(doc.get(body).parent, Some(html));
        assert_eq!(doc.title(), Some("Hi".into()));
        assert!(matches!(
            doc.get(doc.get(doc.root).children[0]).kind,
            NodeKind::Doctype(ref d) if d == "html"
        ));
    }

    #[test]
    fn fragment_gets_skeleton() {
        let doc = parse_html("<title>T</title><div id=\"a\">x</div>");
        let html = doc.document_element().unwrap();
        let head = doc.head().unwrap();
        let body = doc.body().unwrap();
        assert_eq!(doc.get(html).children, vec![head, body]);
        let div = doc.get_element_by_id("a").unwrap();
        assert_eq!(doc.get(div).parent, Some(body));
        assert_eq!(doc.title(), Some("T".into()));
    }

    #[test]
    fn attributes_quoted_unquoted_and_boolean() {
        let doc = parse_html(r#"<input id=e type=email required value='a "b"' data-x="1&amp;2">"#);
        let e = doc.get_element_by_id("e").unwrap();
        assert_eq!(doc.attr(e, "type"), Some("email"));
        assert_eq!(doc.attr(e, "required"), Some(""));
        assert_eq!(doc.attr(e, "value"), Some("a \"b\""));
        assert_eq!(doc.attr(e, "data-x"), Some("1&2"));
    }

    #[test]
    fn duplicate_attribute_first_wins() {
        let doc = parse_html(r#"<div id="a" id="b"></div>"#);
        assert!(doc.get_element_by_id("a").is_some());
        assert!(doc.get_element_by_id("b").is_none());
    }

    #[test]
    fn void_elements_do_not_nest() {
        let doc = parse_html("<div id=\"d\"><img id=\"i\" src=\"a.png\"><span id=\"s\"></span></div>");
        let d = doc.get_element_by_id("d").unwrap();
        let i = doc.get_element_by_id("i").unwrap();
        let s = doc.get_element_by_id("s").unwrap();
        assert_eq!(doc.get(d).children, vec![i, s]);
    }

    #[test]
    fn self_closing_syntax() {
        let doc = parse_html("<div id=\"d\"><span id=\"s\"/><p id=\"p\"></p></div>");
        let s = doc.get_element_by_id("s").unwrap();
        let p = doc.get_element_by_id("p").unwrap();
        assert_eq!(doc.get(p).parent, doc.get(s).parent);
    }

    #[test]
    fn script_is_raw_text() {
        let doc = parse_html("<script>if (a < b && c) { x = '<p>'; }</script><p id=\"after\"></p>");
        let body = doc.body().unwrap();
        let p = doc.get_element_by_id("after").unwrap();
        assert_eq!(doc.get(p).parent, Some(body));
        let script = doc
            .descendants(doc.root)
            .into_iter()
            .find(|&n| doc.is_tag(n, &TagName::Script))
            .unwrap();
        assert_eq!(doc.text_content(script), "if (a < b && c) { x = '<p>'; }");
    }

    #[test]
    fn textarea_decodes_entities() {
        let doc = parse_html("<textarea id=\"m\">a &lt; b</textarea>");
        let m = doc.get_element_by_id("m").unwrap();
        assert_eq!(doc.text_content(m), "a < b");
    }

    #[test]
    fn stray_end_tags_ignored() {
        let doc = parse_html("</span><div id=\"a\">x</b></div>");
        let a = doc.get_element_by_id("a").unwrap();
        assert_eq!(doc.text_content(a), "x");
    }

    #[test]
    fn unclosed_elements_close_at_eof() {
        let doc = parse_html("<ul><li id=\"one\">1<li id=\"two\">2");
        assert!(doc.get_element_by_id("one").is_some());
        assert!(doc.get_element_by_id("two").is_some());
    }

    #[test]
    fn comments_preserved() {
        let doc = parse_html("<div id=\"a\"><!-- note --></div>");
        let a = doc.get_element_by_id("a").unwrap();
        let c = doc.get(a).children[0];
        assert!(matches!(doc.get(c).kind, NodeKind::Comment(ref t) if t == " note "));
    }

    #[test]
    fn lone_lt_is_text() {
        let doc = parse_html("<p id=\"p\">1 < 2</p>");
        let p = doc.get_element_by_id("p").unwrap();
        assert_eq!(doc.text_content(p), "1 < 2");
    }

    #[test]
    fn truncated_tag_dropped() {
        let doc = parse_html("<p id=\"p\">ok</p><img src=\"x");
        assert!(doc.get_element_by_id("p").is_some());
        assert!(doc.body().is_some());
    }

    #[test]
    fn entity_decoding() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&#10094; &#x276F;"), "\u{276e} \u{276f}");
        assert_eq!(decode_entities("&times;"), "\u{d7}");
        assert_eq!(decode_entities("&bogus; & x"), "&bogus; & x");
        assert_eq!(decode_entities("no refs"), "no refs");
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn never_panics_and_always_has_body(input in ".{0,200}") {
                let doc = parse_html(&input);
                prop_assert!(doc.body().is_some());
                prop_assert!(doc.head().is_some());
            }

            #[test]
            fn plain_text_survives(text in "[a-zA-Z0-9 .,!?]{1,80}") {
                let doc = parse_html(&format!("<p id=\"t\">{text}</p>"));
                let p = doc.get_element_by_id("t").unwrap();
                prop_assert_eq!(doc.text_content(p), text);
            }
        }
    }
}
