//! Shared text accumulation buffer

use std::borrow::Cow;

/// Per-chunk rewrite applied while capturing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextTransform {
    #[default]
    Verbatim,
    /// Append a space after every chunk
    TrailingSpace,
    /// A chunk that is exactly `-` becomes `, `
    DashSeparator,
    /// The first ` -` of a chunk containing ` - ` becomes `,`
    InlineDashSeparator,
}

impl TextTransform {
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self {
            Self::Verbatim => Cow::Borrowed(text),
            Self::TrailingSpace => Cow::Owned(format!("{} ", text)),
            Self::DashSeparator if text == "-" => Cow::Borrowed(", "),
            Self::DashSeparator => Cow::Borrowed(text),
            Self::InlineDashSeparator if text.contains(" - ") => {
                Cow::Owned(text.replacen(" -", ",", 1))
            }
            Self::InlineDashSeparator => Cow::Borrowed(text),
        }
    }
}

/// Text buffer toggled on and off by the parser
///
/// Text pushed while capturing has the active transform applied per chunk.
#[derive(Debug, Default)]
pub struct TextBuffer {
    buffer: String,
    capture: Option<TextTransform>,
}

impl TextBuffer {
    pub fn start(&mut self, transform: TextTransform) {
        self.capture = Some(transform);
    }

    pub fn stop(&mut self) {
        self.capture = None;
    }

    pub fn is_capturing(&self) -> bool {
        self.capture.is_some()
    }

    /// Records a chunk of decoded text if capturing
    pub fn push(&mut self, text: &str) {
        if let Some(transform) = self.capture {
            self.buffer.push_str(&transform.apply(text));
        }
    }

    /// Takes the accumulated text, leaving the buffer empty
    pub fn pop(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
