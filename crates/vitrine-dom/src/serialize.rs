//! HTML serialization.

use crate::dom::{Document, NodeId, NodeKind};

/// Serialize the whole document.
pub fn to_html(doc: &Document) -> String {
    let mut out = String::new();
    for &child in &doc.get(doc.root).children {
        write_node(doc, child, false, &mut out);
    }
    out
}

/// Serialize a node including its own tag.
pub fn outer_html(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, id, false, &mut out);
    out
}

/// Serialize a node's children.
pub fn inner_html(doc: &Document, id: NodeId) -> String {
    let raw = doc.element(id).is_some_and(|e| e.tag.is_raw_text());
    let mut out = String::new();
    for &child in &doc.get(id).children {
        write_node(doc, child, raw, &mut out);
    }
    out
}

fn write_node(doc: &Document, id: NodeId, raw_parent: bool, out: &mut String) {
    match &doc.get(id).kind {
        NodeKind::Document => {
            for &child in &doc.get(id).children {
                write_node(doc, child, false, out);
            }
        },
        NodeKind::Doctype(name) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(if name.is_empty() { "html" } else { name });
            out.push('>');
        },
        NodeKind::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        },
        NodeKind::Text(text) => {
            if raw_parent {
                out.push_str(text);
            } else {
                escape_into(text, false, out);
            }
        },
        NodeKind::Element(el) => {
            out.push('<');
            out.push_str(el.tag.as_str());
            for attr in &el.attributes {
                out.push(' ');
                out.push_str(&attr.name);
                out.push_str("=\"");
                escape_into(&attr.value, true, out);
                out.push('"');
            }
            out.push('>');
            if el.tag.is_void() {
                return;
            }
            let raw = el.tag.is_raw_text();
            for &child in &doc.get(id).children {
                write_node(doc, child, raw, out);
            }
            out.push_str("</");
            out.push_str(el.tag.as_str());
            out.push('>');
        },
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementData, TagName};
    use crate::parser::parse_html;

    #[test]
    fn serializes_full_document() {
        let doc = parse_html("<!doctype html><html><head></head><body><p class=\"x\">hi</p></body></html>");
        assert_eq!(
            to_html(&doc),
            "<!DOCTYPE html><html><head></head><body><p class=\"x\">hi</p></body></html>"
        );
    }

    #[test]
    fn escapes_text_and_attributes() {
        let mut doc = parse_html("<div id=\"d\"></div>");
        let d = doc.get_element_by_id("d").unwrap();
        doc.set_attr(d, "title", "a \"q\" & <b>");
        doc.set_text_content(d, "1 < 2 & 3");
        assert_eq!(
            outer_html(&doc, d),
            "<div id=\"d\" title=\"a &quot;q&quot; &amp; <b>\">1 &lt; 2 &amp; 3</div>"
        );
    }

    #[test]
    fn void_elements_have_no_end_tag() {
        let mut doc = parse_html("");
        let body = doc.body().unwrap();
        let img = doc.create_element(ElementData::new(TagName::Img).with_attr("src", "a.png"));
        doc.append_child(body, img);
        assert_eq!(outer_html(&doc, img), "<img src=\"a.png\">");
    }

    #[test]
    fn script_content_not_escaped() {
        let doc = parse_html("<script>a < b && c</script>");
        let script = doc
            .descendants(doc.root)
            .into_iter()
            .find(|&n| doc.is_tag(n, &TagName::Script))
            .unwrap();
        assert_eq!(inner_html(&doc, script), "a < b && c");
    }

    #[test]
    fn reparse_is_stable() {
        let src = "<ul id=\"m\"><li><a href=\"a.html\" class=\"active\">A &amp; B</a></li></ul>";
        let once = to_html(&parse_html(src));
        let twice = to_html(&parse_html(&once));
        assert_eq!(once, twice);
    }
}
