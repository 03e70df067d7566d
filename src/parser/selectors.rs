//! Ignore-list selectors
//!
//! A selector matches a tag when the tag name is equal, the tag carries at
//! least the selector's classes (like the CSS selector `.a.b`), and every
//! listed attribute has exactly the given value.

use crate::parser::tag::Tag;

#[derive(Debug, Clone, Copy)]
pub struct TagSelector {
    pub tag: &'static str,
    pub classes: &'static [&'static str],
    pub attributes: &'static [(&'static str, &'static str)],
}

impl TagSelector {
    pub fn matches(&self, tag: &Tag) -> bool {
        tag.name == self.tag
            && self.classes.iter().all(|class| tag.has_class(class))
            && self
                .attributes
                .iter()
                .all(|(name, value)| tag.attr(name) == Some(*value))
    }
}

/// Subtrees skipped entirely during extraction
pub const IGNORE_LIST: &[TagSelector] = &[
    // "People also ask" panels
    TagSelector {
        tag: "div",
        classes: &["related-question-pair"],
        attributes: &[],
    },
    // Smart-card results
    TagSelector {
        tag: "div",
        classes: &["g-blk"],
        attributes: &[],
    },
    // Smart-card results without a browser user agent
    TagSelector {
        tag: "div",
        classes: &["hp-xpdbox"],
        attributes: &[],
    },
];

/// Whether a tag opens an ignore-listed subtree
pub fn is_ignored(tag: &Tag) -> bool {
    IGNORE_LIST.iter().any(|selector| selector.matches(tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn div(class: &str) -> Tag {
        Tag::new("div", &[("class", class)])
    }

    #[test]
    fn test_class_subset_matches() {
        assert!(is_ignored(&div("xyz related-question-pair abc")));
        assert!(is_ignored(&div("g-blk")));
        assert!(!is_ignored(&Tag::new("span", &[("class", "g-blk")])));
        assert!(!is_ignored(&div("g")));
    }

    #[test]
    fn test_attribute_equality() {
        let selector = TagSelector {
            tag: "div",
            classes: &["a", "b"],
            attributes: &[("id", "x")],
        };
        assert!(selector.matches(&Tag::new("div", &[("class", "c b a"), ("id", "x")])));
        assert!(!selector.matches(&Tag::new("div", &[("class", "a b"), ("id", "y")])));
        assert!(!selector.matches(&div("a b")));
        assert!(!selector.matches(&Tag::new("div", &[("class", "a"), ("id", "x")])));
    }
}
