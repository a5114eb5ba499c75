use std::fmt;

use planlens_error::{DbError, Result};
use serde::{Deserialize, Serialize};

use super::AstParseable;
use crate::format::{FormatAst, FormatSettings, HILITE_LITERAL, write_quoted_string};
use crate::keywords::Keyword;
use crate::parser::Parser;
use crate::tokens::Token;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingValue {
    Number(String),
    String(String),
    Boolean(bool),
    Ident(String),
}

impl SettingValue {
    /// The value without any quoting, suitable for feeding into a setting
    /// parser.
    pub fn as_unquoted(&self) -> String {
        match self {
            Self::Number(n) => n.clone(),
            Self::String(s) => s.clone(),
            Self::Boolean(b) => b.to_string(),
            Self::Ident(s) => s.clone(),
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Ident(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingChange {
    pub name: String,
    pub value: SettingValue,
}

/// Settings given to an EXPLAIN, e.g. `EXPLAIN header = 1, indent = 4 SELECT ...`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SettingsChanges {
    pub changes: Vec<SettingChange>,
}

impl SettingsChanges {
    pub fn new(changes: impl IntoIterator<Item = (String, SettingValue)>) -> Self {
        SettingsChanges {
            changes: changes
                .into_iter()
                .map(|(name, value)| SettingChange { name, value })
                .collect(),
        }
    }

    /// Get the last value set for `name`.
    pub fn get(&self, name: &str) -> Option<&SettingValue> {
        self.changes
            .iter()
            .rev()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .map(|c| &c.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SettingChange> {
        self.changes.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl AstParseable for SettingsChanges {
    fn parse(parser: &mut Parser) -> Result<Self> {
        let mut changes = Vec::new();

        loop {
            let name = match parser.next_token() {
                Some(Token::Word(word)) => word.value.clone(),
                other => {
                    return Err(DbError::new(format!(
                        "Expected setting name, got {other:?}"
                    )));
                }
            };
            parser.expect_token(&Token::Eq)?;

            let value = match parser.next_token() {
                Some(Token::Number(n)) => SettingValue::Number(n.clone()),
                Some(Token::SingleQuotedString(s)) => SettingValue::String(s.clone()),
                Some(Token::Minus) => match parser.next_token() {
                    Some(Token::Number(n)) => SettingValue::Number(format!("-{n}")),
                    other => {
                        return Err(DbError::new(format!(
                            "Expected number after '-' for setting '{name}', got {other:?}"
                        )));
                    }
                },
                Some(Token::Word(word)) => match word.keyword {
                    Some(Keyword::TRUE) => SettingValue::Boolean(true),
                    Some(Keyword::FALSE) => SettingValue::Boolean(false),
                    _ => SettingValue::Ident(word.value.clone()),
                },
                other => {
                    return Err(DbError::new(format!(
                        "Unexpected value for setting '{name}': {other:?}"
                    )));
                }
            };

            changes.push(SettingChange { name, value });

            if !parser.peek_setting_after_comma() {
                break;
            }
            parser.expect_token(&Token::Comma)?;
        }

        Ok(SettingsChanges { changes })
    }
}

impl FormatAst for SettingsChanges {
    fn format_ast(&self, settings: &FormatSettings, out: &mut String) -> Result<()> {
        for (idx, change) in self.changes.iter().enumerate() {
            if idx > 0 {
                out.push_str(", ");
            }
            out.push_str(&change.name);
            out.push_str(" = ");
            match &change.value {
                SettingValue::String(s) => write_quoted_string(settings, out, s),
                other => settings.write_hilited(out, HILITE_LITERAL, &other.to_string()),
            }
        }
        Ok(())
    }
}
