//! Tolerant XML decoding for feed documents.
//!
//! Feeds in the wild represent "the text of a field" in several shapes:
//! plain element text, CDATA blocks, elements carrying both attributes
//! and text, repeated sibling elements, and inline markup inside titles.
//! This module decodes a document into a small generic element tree and
//! exposes field access through the closed [`RawField`] union, with one
//! normalization function per field type ([`extract_text`] and
//! [`extract_link`]). Validation rules live in the parser; only decoder
//! quirks belong here.

use quick_xml::events::Event;
use quick_xml::Reader;

/// Maximum element nesting depth. Real feeds stay in single digits;
/// anything deeper is hostile or broken input.
const MAX_XML_DEPTH: usize = 50;

/// One decoded XML element: qualified name, attributes, direct text
/// (plain and CDATA chunks concatenated), and child elements in
/// document order.
#[derive(Debug, Clone, Default)]
pub struct XmlNode {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlNode>,
}

/// The shapes a named field can take on an element.
///
/// Closed on purpose: every tolerance for a new decoder quirk is added
/// here and in the two extraction functions, never in validation code.
#[derive(Debug)]
pub enum RawField<'a> {
    /// No child element with that name.
    Missing,
    /// Exactly one child element.
    One(&'a XmlNode),
    /// Repeated sibling elements, in document order.
    Many(Vec<&'a XmlNode>),
}

impl XmlNode {
    /// First child element with the given qualified name.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All children with the given name, folded into a [`RawField`].
    pub fn field(&self, name: &str) -> RawField<'_> {
        let mut found: Vec<&XmlNode> = self.children.iter().filter(|c| c.name == name).collect();
        match found.len() {
            0 => RawField::Missing,
            1 => RawField::One(found.remove(0)),
            _ => RawField::Many(found),
        }
    }

    /// Attribute value by name, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Direct text plus the flattened text of all descendants.
    ///
    /// Handles titles that embed inline markup (`<title>Big <em>news</em></title>`)
    /// by stringifying the whole subtree.
    pub fn flat_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out.trim().to_string()
    }

    fn collect_text(&self, out: &mut String) {
        let direct = self.text.trim();
        if !direct.is_empty() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(direct);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }
}

/// Normalizes a text-like field to a string.
///
/// Tolerates: a plain string, a CDATA-wrapped string, an element
/// carrying attributes alongside its text, and nested markup (which is
/// stringified). Repeated elements yield the first non-empty text.
/// A missing field is the empty string.
pub fn extract_text(field: &RawField<'_>) -> String {
    match field {
        RawField::Missing => String::new(),
        RawField::One(node) => node.flat_text(),
        RawField::Many(nodes) => nodes
            .iter()
            .map(|n| n.flat_text())
            .find(|t| !t.is_empty())
            .unwrap_or_default(),
    }
}

/// Normalizes a link-like field to a URL string.
///
/// Tolerates: plain element text (RSS `<link>url</link>`), an `href`
/// attribute (Atom `<link href="url"/>`), and repeated link elements,
/// where the first element whose extraction yields a non-empty string
/// wins. Returns `None` when nothing usable is found; the caller drops
/// the item.
pub fn extract_link(field: &RawField<'_>) -> Option<String> {
    match field {
        RawField::Missing => None,
        RawField::One(node) => link_target(node),
        RawField::Many(nodes) => nodes.iter().copied().find_map(link_target),
    }
}

fn link_target(node: &XmlNode) -> Option<String> {
    if let Some(href) = node.attr("href") {
        let href = href.trim();
        if !href.is_empty() {
            return Some(href.to_string());
        }
    }
    let text = node.flat_text();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Decodes an XML document into its root element.
///
/// Returns `None` on anything quick-xml rejects (mismatched tags,
/// invalid syntax), on unbalanced documents, and on pathological
/// nesting. The caller treats `None` as "not a feed" — malformed input
/// is routine here, not an error.
///
/// Entity declarations are never expanded: quick-xml (pinned 0.37)
/// resolves only the five XML builtins, so XXE payloads either fail to
/// unescape (kept as raw text) or stay literal.
pub fn parse_document(xml: &str) -> Option<XmlNode> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if stack.len() >= MAX_XML_DEPTH {
                    return None;
                }
                stack.push(decode_element(&e, &reader));
            }
            Ok(Event::Empty(e)) => {
                let node = decode_element(&e, &reader);
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None if root.is_none() => root = Some(node),
                    None => return None,
                }
            }
            Ok(Event::End(_)) => {
                let node = match stack.pop() {
                    Some(node) => node,
                    None => return None,
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None if root.is_none() => root = Some(node),
                    None => return None,
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(top) = stack.last_mut() {
                    // Unrecognized entities fail to unescape; keep the raw
                    // text rather than dropping the field
                    let chunk = match e.unescape() {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => String::from_utf8_lossy(e.as_ref()).into_owned(),
                    };
                    append_text(top, &chunk);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(top) = stack.last_mut() {
                    let chunk = String::from_utf8_lossy(e.as_ref()).into_owned();
                    append_text(top, &chunk);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {} // declarations, comments, processing instructions
            Err(_) => return None,
        }
    }

    if !stack.is_empty() {
        return None;
    }
    root
}

fn decode_element(e: &quick_xml::events::BytesStart<'_>, reader: &Reader<&[u8]>) -> XmlNode {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let decoder = reader.decoder();

    let mut attrs = Vec::new();
    for attr_result in e.attributes() {
        let attr = match attr_result {
            Ok(attr) => attr,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed XML attribute");
                continue;
            }
        };
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = match attr.decode_and_unescape_value(decoder) {
            Ok(v) => v.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        };
        attrs.push((key, value));
    }

    XmlNode {
        name,
        attrs,
        text: String::new(),
        children: Vec::new(),
    }
}

fn append_text(node: &mut XmlNode, chunk: &str) {
    if chunk.is_empty() {
        return;
    }
    if !node.text.is_empty() {
        node.text.push(' ');
    }
    node.text.push_str(chunk);
}
