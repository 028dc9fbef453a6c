//! Minimal HTML element tree with a pretty-printing serializer.
//!
//! The HTML reporters grow one document per run and rewrite the whole file
//! after every sentence, so the tree stays cheap to mutate and serialize.

use std::fmt::Write as _;

/// Tags serialized without a closing tag.
const VOID_TAGS: &[&str] = &["br", "img", "meta", "hr"];

/// Tags that may render on one line together with sibling text.
const INLINE_TAGS: &[&str] = &["b", "i", "em", "span", "del", "code"];

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.push_text(text);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.push_child(child);
        self
    }

    pub fn push_text(&mut self, text: &str) {
        self.children.push(Node::Text(text.to_string()));
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Insert `child` at `index` among the children; positions past the end
    /// append.
    pub fn insert_child(&mut self, index: usize, child: Element) {
        let index = index.min(self.children.len());
        self.children.insert(index, Node::Element(child));
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// The child at `index`, if it is an element.
    pub fn child_mut(&mut self, index: usize) -> Option<&mut Element> {
        match self.children.get_mut(index) {
            Some(Node::Element(element)) => Some(element),
            _ => None,
        }
    }

    /// The last child, if it is an element.
    pub fn last_child_mut(&mut self) -> Option<&mut Element> {
        match self.children.last_mut() {
            Some(Node::Element(element)) => Some(element),
            _ => None,
        }
    }

    /// Serialize the subtree, pretty-printed with two-space indentation.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_block(&mut out, 0);
        out
    }

    fn open_tag(&self) -> String {
        let mut open = format!("<{}", self.tag);
        for (name, value) in &self.attrs {
            let _ = write!(open, " {}=\"{}\"", name, escape_attr(value));
        }
        open.push('>');
        open
    }

    fn is_void(&self) -> bool {
        VOID_TAGS.contains(&self.tag.as_str())
    }

    /// Whether this subtree can render on a single line: nothing but text
    /// and nested inline elements below.
    fn is_inline(&self) -> bool {
        self.children.iter().all(|child| match child {
            Node::Text(_) => true,
            Node::Element(element) => {
                INLINE_TAGS.contains(&element.tag.as_str()) && element.is_inline()
            }
        })
    }

    fn write_inline(&self, out: &mut String) {
        out.push_str(&self.open_tag());
        if self.is_void() {
            return;
        }
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(&escape_text(text)),
                Node::Element(element) => element.write_inline(out),
            }
        }
        let _ = write!(out, "</{}>", self.tag);
    }

    fn write_block(&self, out: &mut String, depth: usize) {
        let pad = "  ".repeat(depth);
        out.push_str(&pad);

        if self.is_void() {
            out.push_str(&self.open_tag());
            out.push('\n');
            return;
        }

        if self.children.is_empty() || self.is_inline() {
            self.write_inline(out);
            out.push('\n');
            return;
        }

        out.push_str(&self.open_tag());
        out.push('\n');
        for child in &self.children {
            match child {
                Node::Text(text) => {
                    out.push_str(&"  ".repeat(depth + 1));
                    out.push_str(&escape_text(text));
                    out.push('\n');
                }
                Node::Element(element) => element.write_block(out, depth + 1),
            }
        }
        out.push_str(&pad);
        let _ = writeln!(out, "</{}>", self.tag);
    }
}

/// Escape text content for embedding in markup.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_children_render_on_one_line() {
        let p = Element::new("p")
            .with_child(Element::new("b").with_text("Source Words: "))
            .with_child(Element::new("span").with_text("der hund"));
        assert_eq!(p.to_html(), "<p><b>Source Words: </b><span>der hund</span></p>\n");
    }

    #[test]
    fn block_children_are_indented() {
        let div = Element::new("div")
            .with_child(Element::new("h1").with_text("Title"))
            .with_child(Element::new("div").with_attr("name", "main_content"));
        let html = div.to_html();
        assert_eq!(
            html,
            "<div>\n  <h1>Title</h1>\n  <div name=\"main_content\"></div>\n</div>\n"
        );
    }

    #[test]
    fn void_tags_have_no_closing_tag() {
        let p = Element::new("p")
            .with_child(Element::new("b").with_text("Attentions:"))
            .with_child(Element::new("br"));
        let html = p.to_html();
        assert!(html.contains("<br>\n"));
        assert!(!html.contains("</br>"));
    }

    #[test]
    fn text_and_attrs_are_escaped() {
        let p = Element::new("p")
            .with_attr("title", "a \"quoted\" <value>")
            .with_text("x < y & z");
        let html = p.to_html();
        assert!(html.contains("x &lt; y &amp; z"));
        assert!(html.contains("a &quot;quoted&quot; &lt;value&gt;"));
    }

    #[test]
    fn insert_child_clamps_past_the_end() {
        let mut div = Element::new("div");
        div.push_child(Element::new("p"));
        div.insert_child(10, Element::new("h2"));
        assert_eq!(div.children().len(), 2);
        div.insert_child(0, Element::new("h1"));
        match &div.children()[0] {
            Node::Element(e) => assert_eq!(e.tag(), "h1"),
            Node::Text(_) => panic!("expected element"),
        }
    }
}
