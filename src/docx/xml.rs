//! Owned, mutable XML tree.
//!
//! `roxmltree` gives a fast read-only view of a part; the injectors need to
//! edit markup and write it back, so each part we touch is copied into this
//! tree once at load time. Prefixes and namespace declarations are kept as
//! written so untouched markup (including `mc:Ignorable` prefix lists)
//! round-trips unchanged.

use super::WML_NS;

pub(crate) const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    pub prefix: Option<String>,
    pub namespace: Option<String>,
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub prefix: Option<String>,
    pub namespace: Option<String>,
    pub name: String,
    /// Namespace declarations made on this element: (prefix, uri).
    pub declarations: Vec<(Option<String>, String)>,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(prefix: &str, namespace: &str, name: &str) -> Self {
        Self {
            prefix: Some(prefix.to_string()),
            namespace: Some(namespace.to_string()),
            name: name.to_string(),
            declarations: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// A `w:`-prefixed WordprocessingML element.
    pub fn wml(name: &str) -> Self {
        Self::new("w", WML_NS, name)
    }

    pub fn from_node(node: roxmltree::Node) -> Self {
        let parent_ns: Vec<(Option<&str>, &str)> = node
            .parent_element()
            .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
            .unwrap_or_default();
        let declarations = node
            .namespaces()
            .filter(|ns| ns.uri() != XML_NS)
            .filter(|ns| !parent_ns.contains(&(ns.name(), ns.uri())))
            .map(|ns| (ns.name().map(String::from), ns.uri().to_string()))
            .collect();

        let tag = node.tag_name();
        let attributes = node
            .attributes()
            .map(|a| Attribute {
                prefix: a
                    .namespace()
                    .and_then(|uri| node.lookup_prefix(uri))
                    .map(String::from),
                namespace: a.namespace().map(String::from),
                name: a.name().to_string(),
                value: a.value().to_string(),
            })
            .collect();

        let mut children = Vec::new();
        for child in node.children() {
            if child.is_element() {
                children.push(Node::Element(Element::from_node(child)));
            } else if child.is_text()
                && let Some(text) = child.text()
            {
                children.push(Node::Text(text.to_string()));
            }
        }

        Self {
            prefix: tag
                .namespace()
                .and_then(|uri| node.lookup_prefix(uri))
                .map(String::from),
            namespace: tag.namespace().map(String::from),
            name: tag.name().to_string(),
            declarations,
            attributes,
            children,
        }
    }

    /// Empty element sharing this element's namespace and prefix.
    pub fn child_like(&self, name: &str) -> Self {
        Self {
            prefix: self.prefix.clone(),
            namespace: self.namespace.clone(),
            name: name.to_string(),
            declarations: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute without a namespace.
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.push(Attribute {
            prefix: None,
            namespace: None,
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// Parse a whole part and return its root element.
    pub fn parse(text: &str) -> Result<Self, roxmltree::Error> {
        let doc = roxmltree::Document::parse(text)?;
        Ok(Self::from_node(doc.root_element()))
    }

    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == Some(namespace)
    }

    pub fn is_wml(&self, name: &str) -> bool {
        self.is(WML_NS, name)
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|c| match c {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    pub fn attr(&self, namespace: Option<&str>, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name && a.namespace.as_deref() == namespace)
            .map(|a| a.value.as_str())
    }

    pub fn wml_attr(&self, name: &str) -> Option<&str> {
        self.attr(Some(WML_NS), name)
    }

    pub fn set_attr(&mut self, prefix: &str, namespace: &str, name: &str, value: &str) {
        if let Some(a) = self
            .attributes
            .iter_mut()
            .find(|a| a.name == name && a.namespace.as_deref() == Some(namespace))
        {
            a.value = value.to_string();
            return;
        }
        self.attributes.push(Attribute {
            prefix: Some(prefix.to_string()),
            namespace: Some(namespace.to_string()),
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    pub fn set_wml_attr(&mut self, name: &str, value: &str) {
        self.set_attr("w", WML_NS, name, value);
    }

    pub fn with_wml_attr(mut self, name: &str, value: &str) -> Self {
        self.set_wml_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.children.push(Node::Text(text.to_string()));
        self
    }

    pub fn declares(&self, prefix: &str) -> bool {
        self.declarations
            .iter()
            .any(|(p, _)| p.as_deref() == Some(prefix))
    }

    pub fn declare(&mut self, prefix: &str, uri: &str) {
        if !self.declares(prefix) {
            self.declarations
                .push((Some(prefix.to_string()), uri.to_string()));
        }
    }

    /// Concatenated text of every descendant text node.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Insert `child` before the first WML child whose name appears in
    /// `successors`, or at the end. Returns the insertion index.
    pub fn insert_wml(&mut self, child: Element, successors: &[&str]) -> usize {
        let at = self
            .children
            .iter()
            .position(|c| {
                matches!(c, Node::Element(e)
                    if e.namespace.as_deref() == Some(WML_NS)
                        && successors.contains(&e.name.as_str()))
            })
            .unwrap_or(self.children.len());
        self.children.insert(at, Node::Element(child));
        at
    }

    /// Apply `f` to the WML child `name`. When absent, the child is built
    /// empty, passed to `f`, then inserted ahead of `successors`.
    pub fn edit_wml_child(
        &mut self,
        name: &str,
        successors: &[&str],
        f: impl FnOnce(&mut Element),
    ) {
        let existing = self.elements_mut().find(|e| e.is_wml(name));
        match existing {
            Some(child) => f(child),
            None => {
                let mut child = Element::wml(name);
                f(&mut child);
                self.insert_wml(child, successors);
            }
        }
    }

    fn qualified(prefix: Option<&str>, name: &str) -> String {
        match prefix {
            Some(p) => format!("{p}:{name}"),
            None => name.to_string(),
        }
    }

    fn write(&self, out: &mut String) {
        let qname = Self::qualified(self.prefix.as_deref(), &self.name);
        out.push('<');
        out.push_str(&qname);
        for (prefix, uri) in &self.declarations {
            match prefix {
                Some(p) => out.push_str(&format!(" xmlns:{p}=\"")),
                None => out.push_str(" xmlns=\""),
            }
            escape_into(uri, true, out);
            out.push('"');
        }
        for a in &self.attributes {
            let prefix = if a.namespace.as_deref() == Some(XML_NS) {
                Some("xml")
            } else {
                a.prefix.as_deref()
            };
            out.push(' ');
            out.push_str(&Self::qualified(prefix, &a.name));
            out.push_str("=\"");
            escape_into(&a.value, true, out);
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(e) => e.write(out),
                Node::Text(t) => escape_into(t, false, out),
            }
        }
        out.push_str("</");
        out.push_str(&qname);
        out.push('>');
    }

    /// Serialize as a standalone part, with the XML declaration Word writes.
    pub fn to_part_xml(&self) -> String {
        let mut out =
            String::from("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n");
        self.write(&mut out);
        out
    }
}

fn collect_text(el: &Element, out: &mut String) {
    for child in &el.children {
        match child {
            Node::Element(e) => collect_text(e, out),
            Node::Text(t) => out.push_str(t),
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\n' if attribute => out.push_str("&#10;"),
            '\t' if attribute => out.push_str("&#9;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
}

/// First WML child named `name`.
pub fn wml<'a>(el: &'a Element, name: &str) -> Option<&'a Element> {
    el.elements().find(|e| e.is_wml(name))
}

/// `w:val` of the WML child `child`.
pub fn wml_attr<'a>(el: &'a Element, child: &str) -> Option<&'a str> {
    wml(el, child).and_then(|n| n.wml_attr("val"))
}

pub fn twips_to_pts(twips: f32) -> f32 {
    twips / 20.0
}

/// Points per unit of an `ST_UniversalMeasure` suffix.
fn points_per_unit(unit: &str) -> Option<f32> {
    match unit {
        "pt" => Some(1.0),
        "pc" | "pi" => Some(12.0),
        "in" => Some(72.0),
        "cm" => Some(72.0 / 2.54),
        "mm" => Some(72.0 / 25.4),
        _ => None,
    }
}

/// A measure attribute in points. Bare numbers are twips; values such as
/// `12pt` or `0.5in` carry their own unit.
pub fn universal_measure_attr(el: &Element, attr: &str) -> Option<f32> {
    let value = el.wml_attr(attr)?.trim();
    if let Ok(twips) = value.parse::<f32>() {
        return Some(twips_to_pts(twips));
    }
    let split = value
        .len()
        .checked_sub(2)
        .filter(|&i| value.is_char_boundary(i))?;
    let (number, unit) = value.split_at(split);
    let scale = points_per_unit(unit)?;
    number.parse::<f32>().ok().map(|n| n * scale)
}
