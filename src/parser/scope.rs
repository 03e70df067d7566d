//! Parser scopes and tag annotations

use std::fmt;

/// Handler scope of the parser
///
/// Exactly one scope is active at a time. Scopes nest implicitly: the tag
/// that entered a scope carries an [`Annotation`] naming it, and the
/// matching close tag hands control back to the parent scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Root,
    Result,
    Title,
    Abstract,
    SitelinkTable,
    Sitelink,
    SitelinkTitle,
    Ignore,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Result => "result",
            Self::Title => "title",
            Self::Abstract => "abstract",
            Self::SitelinkTable => "sitelink_table",
            Self::Sitelink => "sitelink",
            Self::SitelinkTitle => "sitelink_title",
            Self::Ignore => "ignore",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Label attached to an opening tag, returned when its close tag is seen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation {
    /// Result container; entered `result`
    Result,
    /// Autocorrection link text
    Spell,
    /// Title container; entered `title`
    Title,
    /// File-type marker before the title link
    TitleFiletype,
    /// Title hyperlink text
    TitleLink,
    /// Summary container; entered `abstract`
    Abstract,
    /// Summary text inside the summary container
    AbstractText,
    /// Summary text directly under `result` (plain layout)
    InlineAbstract,
    /// News publisher/time container
    NewsMetadata,
    /// News summary directly under `result`
    NewsAbstract,
    /// Secondary-results table; entered `sitelink_table`
    SitelinkTable,
    /// One table cell; entered `sitelink`
    Sitelink,
    /// Sitelink title container; entered `sitelink_title`
    SitelinkTitle,
    /// Sitelink hyperlink text
    SitelinkTitleLink,
    /// Sitelink summary text
    SitelinkAbstract,
    /// Ignore-listed subtree; entered `ignore` from the given scope
    Ignored(Scope),
}

impl Annotation {
    /// The scope this annotation switched to when its tag opened, if any
    pub fn entered_scope(self) -> Option<Scope> {
        match self {
            Self::Result => Some(Scope::Result),
            Self::Title => Some(Scope::Title),
            Self::Abstract => Some(Scope::Abstract),
            Self::SitelinkTable => Some(Scope::SitelinkTable),
            Self::Sitelink => Some(Scope::Sitelink),
            Self::SitelinkTitle => Some(Scope::SitelinkTitle),
            Self::Ignored(_) => Some(Scope::Ignore),
            _ => None,
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignored(scope) => write!(f, "{}_ignored", scope),
            other => write!(f, "{:?}", other),
        }
    }
}
