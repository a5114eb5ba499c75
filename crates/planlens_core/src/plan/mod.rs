pub mod builder;
pub mod operator;
pub mod query_plan;
pub mod step_distinct;
pub mod step_expression;
pub mod step_filter;
pub mod step_limit;
pub mod step_read;
pub mod step_sink;
pub mod step_sort;
pub mod step_union;

pub use builder::PlanBuilder;
pub use operator::{Node, PlanStep, QueryPlanStep, StepId, StepKind};
pub use query_plan::{PipelineProcessors, QueryPlan};

use planlens_error::{DbError, Result};

use crate::stream::DataStream;

/// Get the single input for steps that require exactly one child.
pub(crate) fn single_input<'a>(step: &'static str, inputs: &'a [DataStream]) -> Result<&'a DataStream> {
    match inputs {
        [input] => Ok(input),
        _ => Err(DbError::logical(format!(
            "Expected 1 input to {step}, have {}",
            inputs.len()
        ))),
    }
}

/// Error if any of `columns` is missing from `stream`.
pub(crate) fn check_columns_exist<'a>(
    step: &'static str,
    stream: &DataStream,
    columns: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    for column in columns {
        if stream.field(column).is_none() {
            return Err(DbError::logical(format!(
                "Missing column '{column}' in input to {step}"
            ))
            .with_field("header", stream.display_header()));
        }
    }
    Ok(())
}
