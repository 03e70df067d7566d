//! Result extraction from search-results markup
//!
//! The parser walks the flat token stream of the html5ever tokenizer (no
//! tree is built) and keeps exactly one handler
//! [`Scope`] active. Every opening tag is pushed onto a per-tag-name stack
//! together with an optional [`Annotation`]; the close tag pops it again so
//! the handler learns which construct just ended. Annotations that entered
//! a scope hand control back to the enclosing scope when they close.
//!
//! Markup is treated as hostile: unbalanced close tags, stray text and
//! unknown entities never abort the walk, they only lose information.

mod scope;
mod selectors;
mod sink;
mod tag;
mod text;

pub use scope::{Annotation, Scope};
pub use selectors::{is_ignored, TagSelector, IGNORE_LIST};
pub use sink::{tokenize, MarkupHandler};
pub use tag::{Tag, VOID_ELEMENTS};
pub use text::{TextBuffer, TextTransform};

use crate::results::{SearchResult, Sitelink};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Layout switches for the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// The page is a news search
    pub news: bool,
    /// The page was requested with a browser user agent
    pub browser_layout: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            news: false,
            browser_layout: true,
        }
    }
}

/// Everything extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    pub results: Vec<SearchResult>,
    /// Spelling the backend silently searched for instead of the keywords
    pub suggested_spelling: Option<String>,
    /// Some similar results were omitted
    pub filtered: bool,
}

/// Parses a complete page
pub fn parse_page(document: &str, options: ParserOptions) -> ParsedPage {
    let mut parser = ResultParser::new(options);
    parser.feed(document);
    parser.finish()
}

/// Extracts the target of a backend redirect link
///
/// Links of the form `...?q=<target>&sa=...` are unwrapped and
/// percent-decoded; anything else is returned unchanged.
pub fn unwrap_redirect(href: &str) -> String {
    if let Some(start) = href.find("?q=").map(|i| i + 3) {
        if let Some(len) = href[start..].find("&sa=") {
            return unquote_plus(&href[start..start + len]);
        }
    }
    href.to_string()
}

fn unquote_plus(encoded: &str) -> String {
    let spaced = encoded.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced.clone(),
    }
}

/// Fields of the result currently being built
#[derive(Debug, Default)]
struct PendingResult {
    title: String,
    url: String,
    abstract_text: String,
    metadata: Option<String>,
    sitelinks: Vec<Sitelink>,
    sitelink: Option<Sitelink>,
    title_registered: bool,
    abstract_registered: bool,
    metadata_registered: bool,
}

/// Streaming result extractor
pub struct ResultParser {
    options: ParserOptions,
    scope: Scope,
    annotations: HashMap<String, Vec<Option<Annotation>>>,
    text: TextBuffer,
    pending: PendingResult,
    results: Vec<SearchResult>,
    autocorrected: bool,
    suggested_spelling: Option<String>,
    filtered: bool,
}

impl ResultParser {
    pub fn new(options: ParserOptions) -> Self {
        Self {
            options,
            scope: Scope::Root,
            annotations: HashMap::new(),
            text: TextBuffer::default(),
            pending: PendingResult::default(),
            results: Vec::new(),
            autocorrected: false,
            suggested_spelling: None,
            filtered: false,
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Consumes a whole document
    pub fn feed(&mut self, document: &str) {
        tokenize(document, self);
    }

    pub fn finish(self) -> ParsedPage {
        debug!(
            "Extracted {} results (scope at end: {})",
            self.results.len(),
            self.scope
        );
        ParsedPage {
            results: self.results,
            suggested_spelling: self.suggested_spelling.filter(|_| self.autocorrected),
            filtered: self.filtered,
        }
    }

    fn handle_start(&mut self, tag: &Tag) {
        let annotation = if self.scope == Scope::Ignore {
            None
        } else if is_ignored(tag) {
            trace!("Ignoring <{}> subtree in {} scope", tag.name, self.scope);
            Some(Annotation::Ignored(self.scope))
        } else {
            match self.scope {
                Scope::Root => self.root_start(tag),
                Scope::Result => self.result_start(tag),
                Scope::Title => self.title_start(tag),
                Scope::Abstract => self.abstract_start(tag),
                Scope::SitelinkTable => self.sitelink_table_start(tag),
                Scope::Sitelink => self.sitelink_start(tag),
                Scope::SitelinkTitle => self.sitelink_title_start(tag),
                Scope::Ignore => None,
            }
        };

        if let Some(next) = annotation.and_then(Annotation::entered_scope) {
            self.scope = next;
        }
        self.annotations
            .entry(tag.name.clone())
            .or_default()
            .push(annotation);
    }

    fn handle_end(&mut self, name: &str) {
        let Some(annotation) = self
            .annotations
            .get_mut(name)
            .and_then(Vec::pop)
            .flatten()
        else {
            return;
        };

        let next = match self.scope {
            Scope::Root => self.root_end(annotation),
            Scope::Result => self.result_end(annotation),
            Scope::Title => self.title_end(annotation),
            Scope::Abstract => self.abstract_end(annotation),
            Scope::SitelinkTable => self.sitelink_table_end(annotation),
            Scope::Sitelink => self.sitelink_end(annotation),
            Scope::SitelinkTitle => self.sitelink_title_end(annotation),
            Scope::Ignore => match annotation {
                Annotation::Ignored(outer) => Some(outer),
                _ => None,
            },
        };
        if let Some(next) = next {
            self.scope = next;
        }
    }

    fn root_start(&mut self, tag: &Tag) -> Option<Annotation> {
        match tag.name.as_str() {
            "div" if tag.has_class("g") => {
                self.pending = PendingResult::default();
                Some(Annotation::Result)
            }
            "span" if tag.has_class("spell_orig") && tag.id() != Some("sifm") => {
                self.autocorrected = true;
                None
            }
            "a" if tag.has_class("spell") && tag.id() != Some("srfl") => {
                self.text.clear();
                self.text.start(TextTransform::Verbatim);
                Some(Annotation::Spell)
            }
            "p" if tag.id() == Some("ofr") => {
                self.filtered = true;
                None
            }
            _ => None,
        }
    }

    fn root_end(&mut self, annotation: Annotation) -> Option<Scope> {
        if annotation == Annotation::Spell {
            self.text.stop();
            self.suggested_spelling = Some(self.text.pop());
        }
        None
    }

    fn result_start(&mut self, tag: &Tag) -> Option<Annotation> {
        let browser = self.options.browser_layout;
        let news = self.options.news;
        let pending = &self.pending;

        match tag.name.as_str() {
            "span" if !browser && tag.has_class("mime") => {
                self.text.start(TextTransform::Verbatim);
                Some(Annotation::TitleFiletype)
            }
            "h3" if !pending.title_registered && tag.has_class("r") => Some(Annotation::Title),
            "div" if !pending.abstract_registered && tag.has_class("s") => {
                // The whole container is the fallback summary
                self.text.clear();
                self.text.start(TextTransform::Verbatim);
                Some(Annotation::Abstract)
            }
            "span" if !browser && !pending.abstract_registered && tag.has_class("st") => {
                self.text.clear();
                self.text.start(TextTransform::TrailingSpace);
                Some(Annotation::InlineAbstract)
            }
            "table" if pending.sitelinks.is_empty() => {
                (browser || (!news && !tag.has_class("ts"))).then_some(Annotation::SitelinkTable)
            }
            "div" if news && !pending.metadata_registered && tag.has_class("slp") => {
                self.text.clear();
                self.text.start(if browser {
                    TextTransform::DashSeparator
                } else {
                    TextTransform::InlineDashSeparator
                });
                Some(Annotation::NewsMetadata)
            }
            "div" if news && !pending.abstract_registered && tag.has_class("st") => {
                self.text.clear();
                self.text.start(TextTransform::Verbatim);
                Some(Annotation::NewsAbstract)
            }
            _ => None,
        }
    }

    fn result_end(&mut self, annotation: Annotation) -> Option<Scope> {
        match annotation {
            Annotation::Result => {
                self.finish_result();
                return Some(Scope::Root);
            }
            Annotation::TitleFiletype => {
                self.text.stop();
                self.text.clear();
            }
            Annotation::InlineAbstract => {
                self.text.stop();
                let text = self.text.pop().replace("  ", " ");
                self.pending.abstract_text = text.trim_end().to_string();
                self.pending.abstract_registered = true;
            }
            Annotation::NewsMetadata => {
                self.text.stop();
                self.pending.metadata = Some(self.text.pop()).filter(|text| !text.is_empty());
                self.pending.metadata_registered = true;
            }
            Annotation::NewsAbstract => {
                self.text.stop();
                self.pending.abstract_text = self.text.pop();
                self.pending.abstract_registered = true;
            }
            _ => {}
        }
        None
    }

    fn finish_result(&mut self) {
        self.text.stop();
        self.text.clear();
        let pending = std::mem::take(&mut self.pending);
        if pending.url.is_empty() {
            trace!("Dropping result container without a link");
            return;
        }

        let result = SearchResult::new(
            self.results.len() + 1,
            pending.title,
            pending.url,
            pending.abstract_text,
            pending.metadata,
            pending.sitelinks,
        );
        trace!("Result {}: {}", result.index, result.url);
        self.results.push(result);
    }

    fn title_start(&mut self, tag: &Tag) -> Option<Annotation> {
        match tag.name.as_str() {
            "span" if self.options.browser_layout => {
                self.text.start(TextTransform::TrailingSpace);
                Some(Annotation::TitleFiletype)
            }
            "a" => {
                let href = tag.attr("href")?;
                if href.starts_with("/search") {
                    return None;
                }
                self.pending.url = unwrap_redirect(href);
                self.text.clear();
                self.text.start(TextTransform::Verbatim);
                Some(Annotation::TitleLink)
            }
            _ => None,
        }
    }

    fn title_end(&mut self, annotation: Annotation) -> Option<Scope> {
        match annotation {
            Annotation::TitleFiletype => {
                self.text.stop();
                self.text.clear();
                None
            }
            Annotation::TitleLink => {
                self.text.stop();
                self.pending.title = self.text.pop();
                self.pending.title_registered = true;
                None
            }
            Annotation::Title => Some(Scope::Result),
            _ => None,
        }
    }

    fn abstract_start(&mut self, tag: &Tag) -> Option<Annotation> {
        if tag.name == "span" && tag.has_class("st") && !self.pending.abstract_registered {
            self.text.clear();
            self.text.start(TextTransform::Verbatim);
            return Some(Annotation::AbstractText);
        }
        None
    }

    fn abstract_end(&mut self, annotation: Annotation) -> Option<Scope> {
        match annotation {
            Annotation::AbstractText => {
                self.text.stop();
                self.pending.abstract_text = self.text.pop();
                self.pending.abstract_registered = true;
                None
            }
            Annotation::Abstract => {
                self.text.stop();
                let fallback = self.text.pop();
                if !self.pending.abstract_registered {
                    self.pending.abstract_text = fallback.trim().to_string();
                    self.pending.abstract_registered = !self.pending.abstract_text.is_empty();
                }
                Some(Scope::Result)
            }
            _ => None,
        }
    }

    fn sitelink_table_start(&mut self, tag: &Tag) -> Option<Annotation> {
        if tag.name == "td" {
            self.pending.sitelink = Some(Sitelink::default());
            return Some(Annotation::Sitelink);
        }
        None
    }

    fn sitelink_table_end(&mut self, annotation: Annotation) -> Option<Scope> {
        (annotation == Annotation::SitelinkTable).then_some(Scope::Result)
    }

    fn sitelink_start(&mut self, tag: &Tag) -> Option<Annotation> {
        match tag.name.as_str() {
            "h3" if tag.has_class("r") => Some(Annotation::SitelinkTitle),
            "div" if tag.has_class("st") => {
                self.text.clear();
                self.text.start(TextTransform::Verbatim);
                Some(Annotation::SitelinkAbstract)
            }
            _ => None,
        }
    }

    fn sitelink_end(&mut self, annotation: Annotation) -> Option<Scope> {
        match annotation {
            Annotation::SitelinkAbstract => {
                self.text.stop();
                let text = self.text.pop();
                if let Some(sitelink) = self.pending.sitelink.as_mut() {
                    sitelink.abstract_text = text;
                }
                None
            }
            Annotation::Sitelink => {
                self.text.stop();
                if let Some(sitelink) = self.pending.sitelink.take() {
                    if !sitelink.url.is_empty() {
                        self.pending.sitelinks.push(sitelink);
                    }
                }
                Some(Scope::SitelinkTable)
            }
            _ => None,
        }
    }

    fn sitelink_title_start(&mut self, tag: &Tag) -> Option<Annotation> {
        if tag.name != "a" {
            return None;
        }
        let href = tag.attr("href")?;
        if let Some(sitelink) = self.pending.sitelink.as_mut() {
            sitelink.url = unwrap_redirect(href);
        }
        self.text.clear();
        self.text.start(TextTransform::Verbatim);
        Some(Annotation::SitelinkTitleLink)
    }

    fn sitelink_title_end(&mut self, annotation: Annotation) -> Option<Scope> {
        match annotation {
            Annotation::SitelinkTitleLink => {
                self.text.stop();
                let text = self.text.pop();
                if let Some(sitelink) = self.pending.sitelink.as_mut() {
                    sitelink.title = text;
                }
                None
            }
            Annotation::SitelinkTitle => Some(Scope::Sitelink),
            _ => None,
        }
    }
}

impl MarkupHandler for ResultParser {
    fn start_tag(&mut self, tag: &Tag) {
        self.handle_start(tag);
        if tag.is_empty_element() {
            self.handle_end(&tag.name);
        }
    }

    fn end_tag(&mut self, name: &str) {
        self.handle_end(name);
    }

    fn text(&mut self, text: &str) {
        // Ignored subtrees contribute no text, even inside a capture
        if self.scope != Scope::Ignore {
            self.text.push(text);
        }
    }
}
