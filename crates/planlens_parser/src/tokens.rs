use std::fmt;

use planlens_error::{DbError, Result};
use serde::{Deserialize, Serialize};

use crate::keywords::{Keyword, keyword_from_str};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub value: String,
    /// Quote character used, if any.
    pub quote: Option<char>,
    /// Keyword for this word. Only set for unquoted words.
    pub keyword: Option<Keyword>,
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.quote {
            Some(q) => write!(f, "{q}{}{q}", self.value),
            None => write!(f, "{}", self.value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    Word(Word),
    Number(String),
    SingleQuotedString(String),
    /// ','
    Comma,
    /// '.'
    Period,
    /// ';'
    SemiColon,
    /// ':'
    Colon,
    /// '='
    Eq,
    /// '!=' or '<>'
    Neq,
    /// '<'
    Lt,
    /// '<='
    LtEq,
    /// '>'
    Gt,
    /// '>='
    GtEq,
    /// '+'
    Plus,
    /// '-'
    Minus,
    /// '*'
    Mul,
    /// '/'
    Div,
    /// '%'
    Mod,
    /// '||'
    Concat,
    /// '('
    LeftParen,
    /// ')'
    RightParen,
    /// '['
    LeftBracket,
    /// ']'
    RightBracket,
}

impl Token {
    pub fn is_keyword(&self, other: Keyword) -> bool {
        match self {
            Token::Word(word) => word.keyword == Some(other),
            _ => false,
        }
    }

    pub fn keyword(&self) -> Option<Keyword> {
        match self {
            Token::Word(word) => word.keyword,
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Word(w) => write!(f, "{w}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::SingleQuotedString(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::Comma => write!(f, ","),
            Self::Period => write!(f, "."),
            Self::SemiColon => write!(f, ";"),
            Self::Colon => write!(f, ":"),
            Self::Eq => write!(f, "="),
            Self::Neq => write!(f, "!="),
            Self::Lt => write!(f, "<"),
            Self::LtEq => write!(f, "<="),
            Self::Gt => write!(f, ">"),
            Self::GtEq => write!(f, ">="),
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Mul => write!(f, "*"),
            Self::Div => write!(f, "/"),
            Self::Mod => write!(f, "%"),
            Self::Concat => write!(f, "||"),
            Self::LeftParen => write!(f, "("),
            Self::RightParen => write!(f, ")"),
            Self::LeftBracket => write!(f, "["),
            Self::RightBracket => write!(f, "]"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenWithLocation {
    pub token: Token,
    /// Line number for the token (1-based).
    pub line: usize,
    /// Column number for where the token starts (1-based).
    pub col: usize,
}

#[derive(Debug)]
struct State<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    col: usize,
}

impl State<'_> {
    fn next(&mut self) -> Option<char> {
        match self.chars.next() {
            Some(ch) => {
                if ch == '\n' {
                    self.line += 1;
                    self.col = 1;
                } else {
                    self.col += 1;
                }
                Some(ch)
            }
            None => None,
        }
    }

    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let mut s = String::new();
        while let Some(&ch) = self.peek() {
            if !predicate(ch) {
                break;
            }
            s.push(ch);
            self.next();
        }
        s
    }
}

#[derive(Debug)]
pub struct Tokenizer<'a> {
    query: &'a str,
}

impl<'a> Tokenizer<'a> {
    pub fn new(query: &'a str) -> Self {
        Tokenizer { query }
    }

    pub fn tokenize(&self) -> Result<Vec<TokenWithLocation>> {
        let mut state = State {
            chars: self.query.chars().peekable(),
            line: 1,
            col: 1,
        };

        let mut tokens = Vec::new();

        loop {
            let line = state.line;
            let col = state.col;

            let token = match Self::next_token(&mut state)? {
                NextToken::Token(token) => token,
                NextToken::Skip => continue,
                NextToken::Eof => break,
            };

            tokens.push(TokenWithLocation { token, line, col });
        }

        Ok(tokens)
    }

    fn next_token(state: &mut State) -> Result<NextToken> {
        let ch = match state.peek() {
            Some(&ch) => ch,
            None => return Ok(NextToken::Eof),
        };

        let token = match ch {
            ch if ch.is_whitespace() => {
                state.next();
                return Ok(NextToken::Skip);
            }
            '\'' => {
                state.next();
                Token::SingleQuotedString(Self::take_quoted(state, '\'')?)
            }
            '"' | '`' => {
                state.next();
                let value = Self::take_quoted(state, ch)?;
                Token::Word(Word {
                    value,
                    quote: Some(ch),
                    keyword: None,
                })
            }
            ch if ch.is_ascii_digit() => {
                Token::Number(state.take_while(|c| c.is_ascii_digit() || c == '.'))
            }
            ch if ch.is_alphabetic() || ch == '_' => {
                let value = state.take_while(|c| c.is_alphanumeric() || c == '_');
                let keyword = keyword_from_str(&value);
                Token::Word(Word {
                    value,
                    quote: None,
                    keyword,
                })
            }
            '-' => {
                state.next();
                if state.peek() == Some(&'-') {
                    // Line comment.
                    state.take_while(|c| c != '\n');
                    return Ok(NextToken::Skip);
                }
                Token::Minus
            }
            '<' => {
                state.next();
                match state.peek().copied() {
                    Some('=') => {
                        state.next();
                        Token::LtEq
                    }
                    Some('>') => {
                        state.next();
                        Token::Neq
                    }
                    _ => Token::Lt,
                }
            }
            '>' => {
                state.next();
                if state.peek() == Some(&'=') {
                    state.next();
                    Token::GtEq
                } else {
                    Token::Gt
                }
            }
            '!' => {
                state.next();
                match state.next() {
                    Some('=') => Token::Neq,
                    _ => {
                        return Err(DbError::new("Expected '=' after '!'")
                            .with_field("line", state.line)
                            .with_field("col", state.col));
                    }
                }
            }
            '|' => {
                state.next();
                match state.next() {
                    Some('|') => Token::Concat,
                    _ => {
                        return Err(DbError::new("Expected '|' after '|'")
                            .with_field("line", state.line)
                            .with_field("col", state.col));
                    }
                }
            }
            other => {
                let token = match other {
                    ',' => Token::Comma,
                    '.' => Token::Period,
                    ';' => Token::SemiColon,
                    ':' => Token::Colon,
                    '=' => Token::Eq,
                    '+' => Token::Plus,
                    '*' => Token::Mul,
                    '/' => Token::Div,
                    '%' => Token::Mod,
                    '(' => Token::LeftParen,
                    ')' => Token::RightParen,
                    '[' => Token::LeftBracket,
                    ']' => Token::RightBracket,
                    other => {
                        return Err(DbError::new(format!("Unexpected character: '{other}'"))
                            .with_field("line", state.line)
                            .with_field("col", state.col));
                    }
                };
                state.next();
                token
            }
        };

        Ok(NextToken::Token(token))
    }

    /// Read until the closing quote. A doubled quote is an escaped quote.
    fn take_quoted(state: &mut State, quote: char) -> Result<String> {
        let mut s = String::new();
        loop {
            match state.next() {
                Some(ch) if ch == quote => {
                    if state.peek() == Some(&quote) {
                        state.next();
                        s.push(quote);
                    } else {
                        return Ok(s);
                    }
                }
                Some(ch) => s.push(ch),
                None => {
                    return Err(DbError::new("Unterminated quoted string")
                        .with_field("line", state.line)
                        .with_field("col", state.col));
                }
            }
        }
    }
}

enum NextToken {
    Token(Token),
    Skip,
    Eof,
}
