pub mod explainable;
pub mod node;

use planlens_error::{DbError, OptionExt, Result};
use planlens_parser::ast::{ExplainKind, ExplainQuery};
use planlens_parser::format::{FormatAst, FormatSettings};
use tracing::trace;

use crate::config::ExplainSettings;
use crate::plan::QueryPlan;

/// What a caller has available for rendering an EXPLAIN.
///
/// Which of these are required depends on the kind of EXPLAIN.
#[derive(Debug)]
pub struct ExplainInputs<'a, Q> {
    /// The explained query after analysis.
    pub analyzed_query: Option<&'a Q>,
    /// The plan built for the explained query.
    pub plan: Option<&'a QueryPlan>,
}

impl<Q> Default for ExplainInputs<'_, Q> {
    fn default() -> Self {
        ExplainInputs {
            analyzed_query: None,
            plan: None,
        }
    }
}

/// Render the projection of the query selected by the directive.
pub fn render_explain<Q: FormatAst>(
    explain: &ExplainQuery<Q>,
    inputs: ExplainInputs<'_, Q>,
    format: &FormatSettings,
) -> Result<String> {
    trace!(kind = %explain.kind(), "rendering explain");

    match explain.kind() {
        ExplainKind::RawAst => {
            reject_settings(explain)?;
            let query = explain
                .explained_query()
                .required("explained query")?;
            query.to_query_string(format)
        }
        ExplainKind::AnalyzedSyntax => {
            reject_settings(explain)?;
            let query = inputs.analyzed_query.required("analyzed query")?;
            query.to_query_string(format)
        }
        ExplainKind::QueryPlan => {
            let plan = inputs.plan.required("query plan")?;
            let settings = explain_settings(explain)?;
            plan.explain_plan(&settings)
        }
    }
}

/// Build plan explain settings from the settings list on the directive.
pub fn explain_settings<Q>(explain: &ExplainQuery<Q>) -> Result<ExplainSettings> {
    let mut settings = ExplainSettings::default();
    if let Some(changes) = explain.settings() {
        settings.apply_changes(changes)?;
    }
    Ok(settings)
}

fn reject_settings<Q>(explain: &ExplainQuery<Q>) -> Result<()> {
    match explain.settings() {
        Some(changes) if !changes.is_empty() => Err(DbError::new(format!(
            "Settings are not supported for {}",
            explain.keyword()
        ))),
        _ => Ok(()),
    }
}
