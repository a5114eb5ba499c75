//! Formatting syntax trees back into query text.

use planlens_error::Result;

/// Escape sequence written before a keyword when highlighting.
pub const HILITE_KEYWORD: &str = "\x1b[1m";
/// Escape sequence written before an identifier when highlighting.
pub const HILITE_IDENTIFIER: &str = "\x1b[0;36m";
/// Escape sequence written before a literal when highlighting.
pub const HILITE_LITERAL: &str = "\x1b[0;32m";
/// Resets highlighting.
pub const HILITE_NONE: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatSettings {
    /// Wrap keywords, identifiers and literals in terminal highlight markers.
    pub hilite: bool,
}

impl FormatSettings {
    pub const PLAIN: Self = FormatSettings { hilite: false };
    pub const HILITE: Self = FormatSettings { hilite: true };

    /// Write `text` wrapped in `marker`/`HILITE_NONE` if highlighting is
    /// enabled.
    pub fn write_hilited(&self, out: &mut String, marker: &str, text: &str) {
        if self.hilite {
            out.push_str(marker);
            out.push_str(text);
            out.push_str(HILITE_NONE);
        } else {
            out.push_str(text);
        }
    }

    pub fn write_keyword(&self, out: &mut String, keyword: &str) {
        self.write_hilited(out, HILITE_KEYWORD, keyword)
    }
}

/// A syntax node that knows how to write itself back out as query text.
pub trait FormatAst {
    fn format_ast(&self, settings: &FormatSettings, out: &mut String) -> Result<()>;

    /// Format into a new string.
    fn to_query_string(&self, settings: &FormatSettings) -> Result<String> {
        let mut out = String::new();
        self.format_ast(settings, &mut out)?;
        Ok(out)
    }
}

/// Write a single-quoted string literal, escaping embedded quotes.
pub fn write_quoted_string(settings: &FormatSettings, out: &mut String, s: &str) {
    let quoted = format!("'{}'", s.replace('\'', "''"));
    settings.write_hilited(out, HILITE_LITERAL, &quoted)
}
