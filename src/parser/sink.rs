//! Markup event stream
//!
//! Runs the html5ever tokenizer without tree construction and delivers
//! start tags, end tags and text runs to a [`MarkupHandler`] in document
//! order. Character runs between two tags are delivered as one chunk.
//! Comments and doctypes only end a text run. The bodies of `script` and
//! `style` elements are raw text and never produce tags.

use crate::parser::tag::Tag;
use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use std::borrow::Cow;
use std::cell::RefCell;

/// Receiver of markup events
pub trait MarkupHandler {
    fn start_tag(&mut self, tag: &Tag);
    fn end_tag(&mut self, name: &str);
    /// A run of decoded text
    fn text(&mut self, text: &str);
}

/// Tokenizes a complete document into `handler`
pub fn tokenize<H: MarkupHandler>(document: &str, handler: &mut H) {
    let sink = EventSink {
        handler: RefCell::new(handler),
        text: RefCell::new(String::new()),
    };
    let tokenizer = Tokenizer::new(sink, TokenizerOpts::default());

    let input = BufferQueue::default();
    input.push_back(StrTendril::from_slice(document));
    let _ = tokenizer.feed(&input);
    tokenizer.end();
}

struct EventSink<'h, H> {
    handler: RefCell<&'h mut H>,
    text: RefCell<String>,
}

impl<H: MarkupHandler> EventSink<'_, H> {
    fn flush_text(&self) {
        let mut text = self.text.borrow_mut();
        if !text.is_empty() {
            self.handler
                .borrow_mut()
                .text(&reinsert_unknown_entities(&text));
            text.clear();
        }
    }
}

impl<H: MarkupHandler> TokenSink for EventSink<'_, H> {
    type Handle = ();

    fn process_token(&self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::CharacterTokens(text) => {
                self.text.borrow_mut().push_str(&text);
                TokenSinkResult::Continue
            }
            Token::TagToken(tag) => {
                self.flush_text();
                match tag.kind {
                    TagKind::StartTag => {
                        let tag = Tag::from(tag);
                        self.handler.borrow_mut().start_tag(&tag);
                        match tag.name.as_str() {
                            "script" if !tag.self_closing => {
                                TokenSinkResult::RawData(RawKind::ScriptData)
                            }
                            "style" if !tag.self_closing => {
                                TokenSinkResult::RawData(RawKind::Rawtext)
                            }
                            _ => TokenSinkResult::Continue,
                        }
                    }
                    TagKind::EndTag => {
                        self.handler.borrow_mut().end_tag(&tag.name);
                        TokenSinkResult::Continue
                    }
                }
            }
            Token::NullCharacterToken | Token::ParseError(_) => TokenSinkResult::Continue,
            _ => {
                self.flush_text();
                TokenSinkResult::Continue
            }
        }
    }
}

/// Drops the terminating `;` of named references left undecoded
///
/// The tokenizer passes unknown references such as `&caf;` through
/// verbatim; they are kept as `&caf`.
fn reinsert_unknown_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..=amp]);
        rest = &rest[amp + 1..];
        if rest.starts_with(|c: char| c.is_ascii_alphabetic()) {
            let len = rest.bytes().take_while(u8::is_ascii_alphanumeric).count();
            if rest[len..].starts_with(';') {
                out.push_str(&rest[..len]);
                rest = &rest[len + 1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}
