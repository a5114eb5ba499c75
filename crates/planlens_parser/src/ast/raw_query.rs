use planlens_error::Result;
use serde::{Deserialize, Serialize};

use crate::format::{FormatAst, FormatSettings, HILITE_IDENTIFIER, HILITE_LITERAL};
use crate::tokens::Token;

/// An explained query kept as its token stream.
///
/// Full query parsing happens elsewhere. The EXPLAIN directive only needs to
/// carry the query along and write it back out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawQuery {
    tokens: Vec<Token>,
}

impl RawQuery {
    pub fn new(tokens: Vec<Token>) -> Self {
        RawQuery { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// If a space should be written between two adjacent tokens.
fn space_between(prev: &Token, next: &Token) -> bool {
    match (prev, next) {
        (_, Token::Comma | Token::Period | Token::RightParen | Token::RightBracket) => false,
        (_, Token::SemiColon) => false,
        (Token::LeftParen | Token::Period | Token::LeftBracket, _) => false,
        // Function calls, 'count(*)'.
        (Token::Word(word), Token::LeftParen) => word.keyword.is_some(),
        _ => true,
    }
}

impl FormatAst for RawQuery {
    fn format_ast(&self, settings: &FormatSettings, out: &mut String) -> Result<()> {
        let mut prev: Option<&Token> = None;

        for token in &self.tokens {
            if let Some(prev) = prev {
                if space_between(prev, token) {
                    out.push(' ');
                }
            }

            match token {
                // Words keep their source spelling, a keyword in one position
                // may be an identifier in another.
                Token::Word(word) if word.quote.is_some() => {
                    settings.write_hilited(out, HILITE_IDENTIFIER, &word.to_string())
                }
                Token::Word(word) if word.keyword.is_some() => {
                    settings.write_keyword(out, &word.value)
                }
                Token::Word(word) => out.push_str(&word.value),
                Token::Number(_) | Token::SingleQuotedString(_) => {
                    settings.write_hilited(out, HILITE_LITERAL, &token.to_string())
                }
                other => out.push_str(&other.to_string()),
            }

            prev = Some(token);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{HILITE_KEYWORD, HILITE_NONE};
    use crate::tokens::Tokenizer;

    fn raw(s: &str) -> RawQuery {
        let toks = Tokenizer::new(s).tokenize().unwrap();
        RawQuery::new(toks.into_iter().map(|t| t.token).collect())
    }

    #[test]
    fn normalizes_whitespace() {
        let q = raw("select  a,b\n from   t where count( * ) > 1");
        let s = q.to_query_string(&FormatSettings::PLAIN).unwrap();
        assert_eq!("select a, b from t where count(*) > 1", s);
    }

    #[test]
    fn keyword_before_paren_keeps_space() {
        let q = raw("select a from t where a in (1,2)");
        let s = q.to_query_string(&FormatSettings::PLAIN).unwrap();
        assert_eq!("select a from t where a in (1, 2)", s);
    }

    #[test]
    fn keeps_source_spelling() {
        let q = raw("select plan, format from t");
        let s = q.to_query_string(&FormatSettings::PLAIN).unwrap();
        assert_eq!("select plan, format from t", s);

        let q = raw("Select Syntax From T");
        let s = q.to_query_string(&FormatSettings::PLAIN).unwrap();
        assert_eq!("Select Syntax From T", s);
    }

    #[test]
    fn qualified_names() {
        let q = raw("select t.a from s.t");
        let s = q.to_query_string(&FormatSettings::PLAIN).unwrap();
        assert_eq!("select t.a from s.t", s);
    }

    #[test]
    fn hilite_keywords() {
        let q = raw("select a");
        let s = q.to_query_string(&FormatSettings::HILITE).unwrap();
        assert_eq!(format!("{HILITE_KEYWORD}select{HILITE_NONE} a"), s);
    }
}
