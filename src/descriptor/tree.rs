//! An owned element tree over one parsed deployment descriptor.
//!
//! The mutation rules in [`crate::descriptor::mutator`] only need three
//! operations: namespace-aware child lookup, element insertion and in-place
//! text mutation. This wrapper provides exactly those over quick-xml events,
//! keeping any XML-library specifics out of the mutation logic. Unrelated
//! elements, attributes, text and comments survive a parse/serialize round
//! trip; whitespace normalization inside markup does not.

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("XML escape error: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),
    #[error("XML attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),
    #[error("I/O error while serializing descriptor: {0}")]
    Io(#[from] std::io::Error),
    #[error("descriptor is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("descriptor has no root element")]
    NoRoot,
    #[error("descriptor has mismatched element nesting")]
    Unbalanced,
}

/// One node of the parsed document.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    /// Unescaped character data, including whitespace-only runs.
    Text(String),
    CData(String),
    Comment(String),
}

/// An element with its attributes and child nodes, stored in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Qualified name as written in the document (`j2ee:servlet`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name with any namespace prefix stripped.
    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Direct child elements with the given qualified name.
    pub fn elements<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a XmlElement> + use<'a, 'n> {
        self.children.iter().filter_map(move |node| match node {
            XmlNode::Element(el) if el.name == name => Some(el),
            _ => None,
        })
    }

    pub fn elements_mut<'a, 'n>(
        &'a mut self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a mut XmlElement> + use<'a, 'n> {
        self.children.iter_mut().filter_map(move |node| match node {
            XmlNode::Element(el) if el.name == name => Some(el),
            _ => None,
        })
    }

    pub fn first_element<'a>(&'a self, name: &str) -> Option<&'a XmlElement> {
        self.elements(name).next()
    }

    pub fn first_element_mut<'a>(&'a mut self, name: &str) -> Option<&'a mut XmlElement> {
        self.elements_mut(name).next()
    }

    /// Concatenated direct text and CDATA content.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            match node {
                XmlNode::Text(t) | XmlNode::CData(t) => out.push_str(t),
                _ => {}
            }
        }
        out
    }

    /// Replaces the element's character data with `text`, leaving any child
    /// elements in place.
    pub fn set_text(&mut self, text: &str) {
        self.children
            .retain(|node| !matches!(node, XmlNode::Text(_) | XmlNode::CData(_)));
        self.children.push(XmlNode::Text(text.to_string()));
    }

    pub fn push_element(&mut self, element: XmlElement) {
        self.children.push(XmlNode::Element(element));
    }

    /// Appends a `<name>text</name>` child.
    pub fn push_text_element(&mut self, name: &str, text: &str) {
        let mut child = XmlElement::new(name);
        child.set_text(text);
        self.push_element(child);
    }

    /// All descendant elements (any depth) whose local name matches.
    pub fn descendants_local<'a>(&'a self, local_name: &str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        for node in &self.children {
            if let XmlNode::Element(el) = node {
                if el.local_name() == local_name {
                    found.push(el);
                }
                found.extend(el.descendants_local(local_name));
            }
        }
        found
    }
}

/// One parsed descriptor document, held exclusively for a mutation session.
#[derive(Debug, Clone)]
pub struct DescriptorTree {
    decl: Option<(String, Option<String>, Option<String>)>,
    doctype: Option<String>,
    root: XmlElement,
    prefix: String,
}

impl DescriptorTree {
    pub fn parse(xml: &str) -> Result<Self, DescriptorError> {
        let mut reader = Reader::from_str(xml);
        let mut decl = None;
        let mut doctype = None;
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event()? {
                Event::Decl(d) => {
                    let version = String::from_utf8(d.version()?.to_vec())?;
                    let encoding = match d.encoding() {
                        Some(enc) => Some(String::from_utf8(enc?.to_vec())?),
                        None => None,
                    };
                    let standalone = match d.standalone() {
                        Some(sa) => Some(String::from_utf8(sa?.to_vec())?),
                        None => None,
                    };
                    decl = Some((version, encoding, standalone));
                }
                Event::DocType(t) => {
                    doctype = Some(String::from_utf8(t.to_vec())?);
                }
                Event::Start(start) => {
                    stack.push(element_from(&start)?);
                }
                Event::Empty(start) => {
                    let element = element_from(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or(DescriptorError::Unbalanced)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(t) => {
                    if let Some(parent) = stack.last_mut() {
                        parent
                            .children
                            .push(XmlNode::Text(t.unescape()?.into_owned()));
                    }
                }
                Event::CData(c) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(XmlNode::CData(
                            String::from_utf8(c.into_inner().to_vec())?,
                        ));
                    }
                }
                Event::Comment(c) => {
                    let comment = String::from_utf8(c.to_vec())?;
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(XmlNode::Comment(comment));
                    }
                }
                Event::PI(_) => {}
                Event::Eof => break,
            }
        }

        if !stack.is_empty() {
            return Err(DescriptorError::Unbalanced);
        }
        let root = root.ok_or(DescriptorError::NoRoot)?;
        let prefix = root
            .name()
            .split_once(':')
            .map(|(prefix, _)| prefix.to_string())
            .unwrap_or_default();

        Ok(Self {
            decl,
            doctype,
            root,
            prefix,
        })
    }

    /// The namespace prefix in effect for the root element; empty when the
    /// root is unprefixed (including under a default `xmlns`).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `local` qualified with the root element's prefix.
    pub fn qualified(&self, local: &str) -> String {
        if self.prefix.is_empty() {
            local.to_string()
        } else {
            format!("{}:{}", self.prefix, local)
        }
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut XmlElement {
        &mut self.root
    }

    /// Serializes the tree back to XML text.
    pub fn serialize(&self) -> Result<String, DescriptorError> {
        let mut writer = Writer::new(Vec::new());
        if let Some((version, encoding, standalone)) = &self.decl {
            writer.write_event(Event::Decl(BytesDecl::new(
                version,
                encoding.as_deref(),
                standalone.as_deref(),
            )))?;
            writer.write_event(Event::Text(BytesText::from_escaped("\n")))?;
        }
        if let Some(doctype) = &self.doctype {
            writer.write_event(Event::DocType(BytesText::from_escaped(doctype.as_str())))?;
            writer.write_event(Event::Text(BytesText::from_escaped("\n")))?;
        }
        write_element(&mut writer, &self.root)?;
        Ok(String::from_utf8(writer.into_inner())?)
    }
}

fn attach(
    stack: &mut Vec<XmlElement>,
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), DescriptorError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
    Ok(())
}

fn element_from(start: &BytesStart) -> Result<XmlElement, DescriptorError> {
    let name = String::from_utf8(start.name().as_ref().to_vec())?;
    let mut element = XmlElement::new(name);
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8(attr.key.as_ref().to_vec())?;
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    element: &XmlElement,
) -> Result<(), DescriptorError> {
    let mut start = BytesStart::new(element.name());
    for (key, value) in element.attributes() {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    writer.write_event(Event::Start(start))?;
    for node in element.children() {
        match node {
            XmlNode::Element(child) => write_element(writer, child)?,
            XmlNode::Text(text) => {
                writer.write_event(Event::Text(BytesText::new(text)))?;
            }
            XmlNode::CData(text) => {
                writer.write_event(Event::CData(BytesCData::new(text.as_str())))?;
            }
            XmlNode::Comment(text) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?;
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize_preserves_elements() {
        let xml = "<web-app><servlet><servlet-name>a</servlet-name></servlet><!-- keep me --></web-app>";
        let tree = DescriptorTree::parse(xml).unwrap();
        let out = tree.serialize().unwrap();

        assert!(out.contains("<servlet-name>a</servlet-name>"));
        assert!(out.contains("<!-- keep me -->"));
    }

    #[test]
    fn test_prefix_empty_without_namespace() {
        let tree = DescriptorTree::parse("<web-app></web-app>").unwrap();
        assert_eq!(tree.prefix(), "");
        assert_eq!(tree.qualified("context-param"), "context-param");
    }

    #[test]
    fn test_prefix_empty_under_default_namespace() {
        let tree = DescriptorTree::parse(
            r#"<web-app xmlns="http://java.sun.com/xml/ns/javaee"></web-app>"#,
        )
        .unwrap();
        assert_eq!(tree.prefix(), "");
    }

    #[test]
    fn test_prefix_from_prefixed_root() {
        let tree = DescriptorTree::parse(
            r#"<j2ee:web-app xmlns:j2ee="http://java.sun.com/xml/ns/j2ee"></j2ee:web-app>"#,
        )
        .unwrap();
        assert_eq!(tree.prefix(), "j2ee");
        assert_eq!(tree.qualified("servlet"), "j2ee:servlet");
    }

    #[test]
    fn test_text_and_set_text() {
        let mut tree =
            DescriptorTree::parse("<web-app><param-value>\n  foo \n</param-value></web-app>")
                .unwrap();
        let value = tree.root().first_element("param-value").unwrap();
        assert_eq!(value.text(), "\n  foo \n");

        tree.root_mut()
            .first_element_mut("param-value")
            .unwrap()
            .set_text("\n  foo \n bar");
        assert!(tree.serialize().unwrap().contains("foo \n bar"));
    }

    #[test]
    fn test_push_text_element() {
        let mut tree = DescriptorTree::parse("<web-app></web-app>").unwrap();
        let mut param = XmlElement::new("context-param");
        param.push_text_element("param-name", "contextConfigLocation");
        param.push_text_element("param-value", "classpath:foo.xml");
        tree.root_mut().push_element(param);

        let out = tree.serialize().unwrap();
        assert!(out.contains(
            "<context-param><param-name>contextConfigLocation</param-name><param-value>classpath:foo.xml</param-value></context-param>"
        ));
    }

    #[test]
    fn test_decl_and_doctype_survive() {
        let xml = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<web-app></web-app>";
        let tree = DescriptorTree::parse(xml).unwrap();
        let out = tree.serialize().unwrap();
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    }

    #[test]
    fn test_attribute_preserved() {
        let xml = r#"<web-app version="2.5" xmlns="http://java.sun.com/xml/ns/javaee"></web-app>"#;
        let tree = DescriptorTree::parse(xml).unwrap();
        let out = tree.serialize().unwrap();
        assert!(out.contains(r#"version="2.5""#));
        assert!(out.contains(r#"xmlns="http://java.sun.com/xml/ns/javaee""#));
    }

    #[test]
    fn test_descendants_local_sees_through_prefixes() {
        let xml = r#"<ns:plugins xmlns:ns="urn:x"><ns:plugin>CloudFoundryGrailsPlugin</ns:plugin></ns:plugins>"#;
        let tree = DescriptorTree::parse(xml).unwrap();
        let found = tree.root().descendants_local("plugin");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text(), "CloudFoundryGrailsPlugin");
    }
}
