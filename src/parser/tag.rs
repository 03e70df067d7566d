//! Opening tags as seen by the result parser

use html5ever::tokenizer::Tag as MarkupTag;

/// Elements that never have content or a close tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// An opening tag with lowercased names and decoded attribute values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub self_closing: bool,
}

impl Tag {
    pub fn new(name: impl Into<String>, attributes: &[(&str, &str)]) -> Self {
        Self {
            name: name.into(),
            attributes: attributes
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            self_closing: false,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Whether no close tag will follow
    pub fn is_empty_element(&self) -> bool {
        self.self_closing || VOID_ELEMENTS.contains(&self.name.as_str())
    }
}

impl From<MarkupTag> for Tag {
    fn from(tag: MarkupTag) -> Self {
        Self {
            name: tag.name.to_string(),
            attributes: tag
                .attrs
                .into_iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect(),
            self_closing: tag.self_closing,
        }
    }
}
