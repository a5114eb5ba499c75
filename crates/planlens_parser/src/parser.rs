use planlens_error::{DbError, Result};

use crate::ast::{AstParseable, ExplainQuery, RawQuery};
use crate::keywords::Keyword;
use crate::tokens::{Token, TokenWithLocation, Tokenizer};

/// Parse `sql` as an EXPLAIN statement.
///
/// Returns `Ok(None)` if the statement doesn't start with one of the EXPLAIN
/// spellings (`EXPLAIN`, or the legacy `AST`/`ANALYZE`).
pub fn parse_explain(sql: &str) -> Result<Option<ExplainQuery<RawQuery>>> {
    let toks = Tokenizer::new(sql).tokenize()?;
    let mut parser = Parser::with_tokens(toks);

    match parser.peek().and_then(Token::keyword) {
        Some(Keyword::EXPLAIN | Keyword::AST | Keyword::ANALYZE) => (),
        _ => return Ok(None),
    }

    let explain = ExplainQuery::parse(&mut parser)?;
    tracing::trace!(kind = ?explain.kind(), legacy = explain.legacy_syntax(), "parsed explain");

    Ok(Some(explain))
}

#[derive(Debug)]
pub struct Parser {
    toks: Vec<TokenWithLocation>,
    /// Index of token we should process next.
    idx: usize,
}

impl Parser {
    pub fn with_tokens(toks: Vec<TokenWithLocation>) -> Self {
        Parser { toks, idx: 0 }
    }

    /// Get the next token, advancing the parser.
    pub fn next_token(&mut self) -> Option<&Token> {
        let tok = self.toks.get(self.idx)?;
        self.idx += 1;
        Some(&tok.token)
    }

    /// Look at the next token without advancing.
    pub fn peek(&self) -> Option<&Token> {
        self.peek_nth(0)
    }

    /// Look at the token `n` positions ahead without advancing.
    pub fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.toks.get(self.idx + n).map(|t| &t.token)
    }

    /// Parse a single keyword.
    pub fn parse_keyword(&mut self, keyword: Keyword) -> bool {
        match self.peek() {
            Some(tok) if tok.is_keyword(keyword) => {
                self.idx += 1;
                true
            }
            _ => false,
        }
    }

    pub fn expect_keyword(&mut self, keyword: Keyword) -> Result<()> {
        if self.parse_keyword(keyword) {
            return Ok(());
        }
        Err(self.unexpected(format!("Expected {}", keyword.as_str())))
    }

    /// Consume the next token if it matches `expected`.
    pub fn consume_token(&mut self, expected: &Token) -> bool {
        match self.peek() {
            Some(tok) if tok == expected => {
                self.idx += 1;
                true
            }
            _ => false,
        }
    }

    pub fn expect_token(&mut self, expected: &Token) -> Result<()> {
        if self.consume_token(expected) {
            return Ok(());
        }
        Err(self.unexpected(format!("Expected '{expected}'")))
    }

    /// Checks if the upcoming tokens look like the start of a `name = value`
    /// setting.
    pub fn peek_setting_start(&self) -> bool {
        matches!(
            (self.peek_nth(0), self.peek_nth(1)),
            (Some(Token::Word(_)), Some(Token::Eq))
        )
    }

    /// Checks for `, name = value`.
    pub fn peek_setting_after_comma(&self) -> bool {
        matches!(
            (self.peek_nth(0), self.peek_nth(1), self.peek_nth(2)),
            (Some(Token::Comma), Some(Token::Word(_)), Some(Token::Eq))
        )
    }

    /// Take all remaining tokens, leaving the parser exhausted.
    pub fn take_remaining(&mut self) -> Vec<Token> {
        let toks = self.toks.split_off(self.idx.min(self.toks.len()));
        self.idx = self.toks.len();
        toks.into_iter().map(|t| t.token).collect()
    }

    fn unexpected(&self, msg: String) -> DbError {
        match self.toks.get(self.idx) {
            Some(tok) => DbError::new(msg)
                .with_field("found", &tok.token)
                .with_field("line", tok.line)
                .with_field("col", tok.col),
            None => DbError::new(msg).with_field("found", "end of statement"),
        }
    }
}
