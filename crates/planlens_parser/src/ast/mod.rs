pub mod explain;
pub mod output;
pub mod raw_query;
pub mod settings;

pub use explain::{ExplainKind, ExplainQuery, SettingsClonePolicy};
pub use output::OutputOptions;
pub use raw_query::RawQuery;
pub use settings::{SettingChange, SettingValue, SettingsChanges};

use planlens_error::Result;

use crate::parser::Parser;

pub trait AstParseable: Sized {
    /// Parse an instance of Self from the provided parser.
    ///
    /// It's assumed that the parser is in the correct state for parsing Self,
    /// and if it isn't, an error should be returned.
    fn parse(parser: &mut Parser) -> Result<Self>;
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use crate::tokens::Tokenizer;

    /// Parse an AST node directly from a string.
    pub(crate) fn parse_ast<A: AstParseable>(s: &str) -> Result<A> {
        let toks = Tokenizer::new(s).tokenize()?;
        let mut parser = Parser::with_tokens(toks);
        A::parse(&mut parser)
    }
}
