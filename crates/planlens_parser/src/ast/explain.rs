use std::fmt;

use planlens_error::{DbError, Result};
use serde::{Deserialize, Serialize};

use super::{AstParseable, OutputOptions, RawQuery, SettingsChanges};
use crate::format::{FormatAst, FormatSettings};
use crate::keywords::Keyword;
use crate::parser::Parser;
use crate::tokens::Token;

/// Which projection of a query an EXPLAIN renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExplainKind {
    /// 'EXPLAIN AST SELECT ...'
    RawAst,
    /// 'EXPLAIN SYNTAX SELECT ...'
    AnalyzedSyntax,
    /// 'EXPLAIN SELECT ...'
    QueryPlan,
}

impl ExplainKind {
    pub const ALL: [ExplainKind; 3] = [Self::RawAst, Self::AnalyzedSyntax, Self::QueryPlan];

    /// Keyword text for this kind.
    ///
    /// Legacy syntax is the form predating the EXPLAIN keyword: "EXPLAIN AST"
    /// was written "AST", and "EXPLAIN SYNTAX" was written "ANALYZE".
    pub const fn keyword(&self, legacy_syntax: bool) -> &'static str {
        match self {
            Self::RawAst => {
                if legacy_syntax {
                    "AST"
                } else {
                    "EXPLAIN AST"
                }
            }
            Self::AnalyzedSyntax => {
                if legacy_syntax {
                    "ANALYZE"
                } else {
                    "EXPLAIN SYNTAX"
                }
            }
            Self::QueryPlan => "EXPLAIN",
        }
    }
}

impl fmt::Display for ExplainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword(false))
    }
}

/// What happens to the settings subtree when cloning an [`ExplainQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsClonePolicy {
    /// Settings only apply where the directive was issued and are not carried
    /// into the copy. This is what `Clone` does.
    #[default]
    Drop,
    /// Deep copy the settings along with the query.
    Keep,
}

/// An EXPLAIN directive wrapping the query being explained.
///
/// Built in two phases: construction with the kind, then the explained query
/// (required) and settings (optional) are attached.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct ExplainQuery<Q> {
    kind: ExplainKind,
    legacy_syntax: bool,
    query: Option<Q>,
    settings: Option<SettingsChanges>,
    output: OutputOptions,
}

impl<Q> ExplainQuery<Q> {
    pub fn new(kind: ExplainKind, legacy_syntax: bool) -> Self {
        ExplainQuery {
            kind,
            legacy_syntax,
            query: None,
            settings: None,
            output: OutputOptions::default(),
        }
    }

    pub fn kind(&self) -> ExplainKind {
        self.kind
    }

    pub fn legacy_syntax(&self) -> bool {
        self.legacy_syntax
    }

    /// The keyword text this directive is rendered with.
    pub fn keyword(&self) -> &'static str {
        self.kind.keyword(self.legacy_syntax)
    }

    /// Attach the query being explained.
    ///
    /// Errors if a query has already been attached.
    pub fn set_explained_query(&mut self, query: Q) -> Result<()> {
        if self.query.is_some() {
            return Err(DbError::logical("Explained query already set")
                .with_field("explain", self.keyword()));
        }
        self.query = Some(query);
        Ok(())
    }

    pub fn set_settings(&mut self, settings: SettingsChanges) {
        self.settings = Some(settings);
    }

    pub fn set_output_options(&mut self, output: OutputOptions) {
        self.output = output;
    }

    pub fn explained_query(&self) -> Option<&Q> {
        self.query.as_ref()
    }

    pub fn settings(&self) -> Option<&SettingsChanges> {
        self.settings.as_ref()
    }

    pub fn output_options(&self) -> &OutputOptions {
        &self.output
    }

    /// Identifier for this node, e.g. "Explain_EXPLAIN AST".
    ///
    /// Directives rendered with different keywords have different ids.
    pub fn id(&self, delimiter: char) -> String {
        format!("Explain{delimiter}{}", self.keyword())
    }
}

impl<Q: Clone> ExplainQuery<Q> {
    /// Deep copy this directive.
    ///
    /// The explained query and output options are always copied. Settings are
    /// copied depending on `policy`.
    pub fn clone_with(&self, policy: SettingsClonePolicy) -> Self {
        let settings = match policy {
            SettingsClonePolicy::Drop => None,
            SettingsClonePolicy::Keep => self.settings.clone(),
        };

        ExplainQuery {
            kind: self.kind,
            legacy_syntax: self.legacy_syntax,
            query: self.query.clone(),
            settings,
            output: self.output.clone(),
        }
    }
}

/// Clones using [`SettingsClonePolicy::Drop`]; the settings subtree is not
/// carried over. Use `clone_with` to keep it.
impl<Q: Clone> Clone for ExplainQuery<Q> {
    fn clone(&self) -> Self {
        self.clone_with(SettingsClonePolicy::default())
    }
}

impl<Q: FormatAst> FormatAst for ExplainQuery<Q> {
    fn format_ast(&self, settings: &FormatSettings, out: &mut String) -> Result<()> {
        let query = self.query.as_ref().ok_or_else(|| {
            DbError::logical("Cannot format EXPLAIN without an explained query")
                .with_field("explain", self.keyword())
        })?;

        settings.write_keyword(out, self.keyword());
        out.push(' ');
        if let Some(changes) = self.settings.as_ref().filter(|c| !c.is_empty()) {
            changes.format_ast(settings, out)?;
            out.push(' ');
        }
        query.format_ast(settings, out)?;
        self.output.format_ast(settings, out)?;

        Ok(())
    }
}

impl AstParseable for ExplainQuery<RawQuery> {
    fn parse(parser: &mut Parser) -> Result<Self> {
        let (kind, legacy_syntax) = if parser.parse_keyword(Keyword::AST) {
            (ExplainKind::RawAst, true)
        } else if parser.parse_keyword(Keyword::ANALYZE) {
            (ExplainKind::AnalyzedSyntax, true)
        } else {
            parser.expect_keyword(Keyword::EXPLAIN)?;
            if parser.parse_keyword(Keyword::AST) {
                (ExplainKind::RawAst, false)
            } else if parser.parse_keyword(Keyword::SYNTAX) {
                (ExplainKind::AnalyzedSyntax, false)
            } else {
                // 'PLAN' is optional.
                parser.parse_keyword(Keyword::PLAN);
                (ExplainKind::QueryPlan, false)
            }
        };

        let mut explain = ExplainQuery::new(kind, legacy_syntax);

        if parser.peek_setting_start() {
            explain.set_settings(SettingsChanges::parse(parser)?);
        }

        let mut toks = parser.take_remaining();
        while toks.last() == Some(&Token::SemiColon) {
            toks.pop();
        }

        explain.set_output_options(take_output_options(&mut toks));

        if toks.is_empty() {
            return Err(DbError::new(format!(
                "Missing query after {}",
                explain.keyword()
            )));
        }

        explain.set_explained_query(RawQuery::new(toks))?;

        Ok(explain)
    }
}

/// Pop trailing `INTO OUTFILE '<path>'` and `FORMAT <name>` off the token
/// list.
fn take_output_options(toks: &mut Vec<Token>) -> OutputOptions {
    let mut output = OutputOptions::default();

    if let [.., fmt_kw, Token::Word(name)] = toks.as_slice() {
        if fmt_kw.is_keyword(Keyword::FORMAT) && name.quote.is_none() {
            output.format = Some(name.value.clone());
            toks.truncate(toks.len() - 2);
        }
    }

    if let [.., into, outfile, Token::SingleQuotedString(path)] = toks.as_slice() {
        if into.is_keyword(Keyword::INTO) && outfile.is_keyword(Keyword::OUTFILE) {
            output.into_outfile = Some(path.clone());
            toks.truncate(toks.len() - 3);
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::ast::SettingValue;
    use crate::ast::testutil::parse_ast;
    use crate::format::{HILITE_KEYWORD, HILITE_NONE};

    fn format_plain<Q: FormatAst>(explain: &ExplainQuery<Q>) -> String {
        explain.to_query_string(&FormatSettings::PLAIN).unwrap()
    }

    #[test]
    fn keyword_table() {
        let cases = [
            (ExplainKind::RawAst, true, "AST"),
            (ExplainKind::RawAst, false, "EXPLAIN AST"),
            (ExplainKind::AnalyzedSyntax, true, "ANALYZE"),
            (ExplainKind::AnalyzedSyntax, false, "EXPLAIN SYNTAX"),
            (ExplainKind::QueryPlan, true, "EXPLAIN"),
            (ExplainKind::QueryPlan, false, "EXPLAIN"),
        ];

        for (kind, legacy, expected) in cases {
            assert_eq!(expected, kind.keyword(legacy), "kind: {kind:?}, legacy: {legacy}");
        }
    }

    #[test]
    fn id_format() {
        let explain = ExplainQuery::<RawQuery>::new(ExplainKind::RawAst, false);
        assert_eq!("Explain_EXPLAIN AST", explain.id('_'));
    }

    #[test]
    fn id_distinct_per_kind_and_spelling() {
        // Legacy and modern spellings of the plan kind are the same keyword,
        // so they are the same node for id purposes.
        let mut ids = HashSet::new();
        for kind in ExplainKind::ALL {
            for legacy in [true, false] {
                let explain = ExplainQuery::<RawQuery>::new(kind, legacy);
                ids.insert((explain.keyword(), explain.id(' ')));
            }
        }
        let keywords: HashSet<_> = ids.iter().map(|(k, _)| *k).collect();
        let id_strings: HashSet<_> = ids.iter().map(|(_, id)| id.clone()).collect();
        assert_eq!(5, keywords.len());
        assert_eq!(keywords.len(), id_strings.len());
    }

    #[test]
    fn parse_modern_kinds() {
        let explain: ExplainQuery<RawQuery> = parse_ast("explain ast select 1").unwrap();
        assert_eq!(ExplainKind::RawAst, explain.kind());
        assert!(!explain.legacy_syntax());

        let explain: ExplainQuery<RawQuery> = parse_ast("explain syntax select 1").unwrap();
        assert_eq!(ExplainKind::AnalyzedSyntax, explain.kind());

        let explain: ExplainQuery<RawQuery> = parse_ast("explain select 1").unwrap();
        assert_eq!(ExplainKind::QueryPlan, explain.kind());

        let explain: ExplainQuery<RawQuery> = parse_ast("explain plan select 1").unwrap();
        assert_eq!(ExplainKind::QueryPlan, explain.kind());
        assert_eq!("EXPLAIN select 1", format_plain(&explain));
    }

    #[test]
    fn parse_legacy_kinds() {
        let explain: ExplainQuery<RawQuery> = parse_ast("AST select 1").unwrap();
        assert_eq!(ExplainKind::RawAst, explain.kind());
        assert!(explain.legacy_syntax());
        assert_eq!("AST select 1", format_plain(&explain));

        let explain: ExplainQuery<RawQuery> = parse_ast("ANALYZE select 1").unwrap();
        assert_eq!(ExplainKind::AnalyzedSyntax, explain.kind());
        assert!(explain.legacy_syntax());
        assert_eq!("ANALYZE select 1", format_plain(&explain));
    }

    #[test]
    fn parse_with_settings() {
        let explain: ExplainQuery<RawQuery> =
            parse_ast("explain header = 1, indent = 4 select a from t").unwrap();
        let settings = explain.settings().unwrap();
        assert_eq!(
            Some(&SettingValue::Number("1".to_string())),
            settings.get("header")
        );
        assert_eq!(
            Some(&SettingValue::Number("4".to_string())),
            settings.get("indent")
        );
        assert_eq!(
            "EXPLAIN header = 1, indent = 4 select a from t",
            format_plain(&explain)
        );
    }

    #[test]
    fn parse_output_options() {
        let explain: ExplainQuery<RawQuery> =
            parse_ast("explain syntax select a from t into outfile 'out.txt' format TSV;").unwrap();
        let output = explain.output_options();
        assert_eq!(Some("out.txt"), output.into_outfile.as_deref());
        assert_eq!(Some("TSV"), output.format.as_deref());
        assert_eq!(
            "EXPLAIN SYNTAX select a from t INTO OUTFILE 'out.txt' FORMAT TSV",
            format_plain(&explain)
        );
    }

    #[test]
    fn parse_format_name_matching_keyword() {
        let explain: ExplainQuery<RawQuery> =
            parse_ast("explain select a from t format Values").unwrap();
        assert_eq!(Some("Values"), explain.output_options().format.as_deref());
        assert_eq!("EXPLAIN select a from t FORMAT Values", format_plain(&explain));
    }

    #[test]
    fn parse_quoted_format_name_stays_in_query() {
        let explain: ExplainQuery<RawQuery> =
            parse_ast("explain select a from t format \"x\"").unwrap();
        assert_eq!(None, explain.output_options().format);
    }

    #[test]
    fn parse_missing_query() {
        let err = parse_ast::<ExplainQuery<RawQuery>>("explain ast").unwrap_err();
        assert_eq!("Missing query after EXPLAIN AST", err.message());

        parse_ast::<ExplainQuery<RawQuery>>("explain header = 1").unwrap_err();
    }

    #[test]
    fn format_hilite() {
        let explain: ExplainQuery<RawQuery> = parse_ast("explain ast select 1").unwrap();
        let s = explain.to_query_string(&FormatSettings::HILITE).unwrap();
        assert!(s.starts_with(&format!("{HILITE_KEYWORD}EXPLAIN AST{HILITE_NONE} ")));
    }

    #[test]
    fn format_without_query_is_logical_error() {
        let explain = ExplainQuery::<RawQuery>::new(ExplainKind::QueryPlan, false);
        let err = explain.to_query_string(&FormatSettings::PLAIN).unwrap_err();
        assert!(err.is_logical());
    }

    #[test]
    fn set_explained_query_twice() {
        let mut explain = ExplainQuery::new(ExplainKind::QueryPlan, false);
        explain.set_explained_query(RawQuery::new(Vec::new())).unwrap();
        let err = explain
            .set_explained_query(RawQuery::new(Vec::new()))
            .unwrap_err();
        assert!(err.is_logical());
    }

    #[test]
    fn clone_drops_settings() {
        let explain: ExplainQuery<RawQuery> =
            parse_ast("ast header = 1 select a from t format JSON").unwrap();

        let cloned = explain.clone();
        assert_eq!(explain.kind(), cloned.kind());
        assert_eq!(explain.legacy_syntax(), cloned.legacy_syntax());
        assert_eq!(explain.explained_query(), cloned.explained_query());
        assert_eq!(explain.output_options(), cloned.output_options());
        assert!(explain.settings().is_some());
        assert_eq!(None, cloned.settings());
    }

    #[test]
    fn clone_keep_settings() {
        let explain: ExplainQuery<RawQuery> =
            parse_ast("explain syntax header = 1 select a from t").unwrap();

        let cloned = explain.clone_with(SettingsClonePolicy::Keep);
        assert_eq!(explain, cloned);
    }

    #[test]
    fn clone_is_disjoint() {
        #[derive(Debug, Clone, PartialEq)]
        struct Node {
            children: Vec<Node>,
        }

        let mut explain = ExplainQuery::new(ExplainKind::RawAst, true);
        explain
            .set_explained_query(Node {
                children: vec![Node {
                    children: Vec::new(),
                }],
            })
            .unwrap();

        let mut cloned = explain.clone();
        cloned.query.as_mut().unwrap().children.clear();

        assert_eq!(1, explain.explained_query().unwrap().children.len());
        assert_eq!(0, cloned.explained_query().unwrap().children.len());
    }
}
