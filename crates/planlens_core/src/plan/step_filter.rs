use planlens_error::{DbError, Result};

use super::operator::StepKind;
use super::single_input;
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::stream::{DataStream, DataType};

/// Keeps rows where a boolean column is true.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterStep {
    /// Boolean column holding the filter result.
    pub column: String,
    /// Drop the filter column from the output.
    pub remove_column: bool,
}

impl Explainable for FilterStep {
    fn explain_entry(&self, _conf: ExplainConfig) -> ExplainEntry {
        ExplainEntry::new(self.name())
            .with_value("column", &self.column)
            .with_value("remove_column", self.remove_column)
    }
}

impl StepKind for FilterStep {
    fn name(&self) -> &'static str {
        "Filter"
    }

    fn derive_output_stream(&self, inputs: &[DataStream]) -> Result<Option<DataStream>> {
        let input = single_input(self.name(), inputs)?;

        let field = input.field(&self.column).ok_or_else(|| {
            DbError::logical(format!("Missing filter column '{}'", self.column))
                .with_field("header", input.display_header())
        })?;
        if field.datatype != DataType::Boolean {
            return Err(DbError::logical(format!(
                "Filter column '{}' must be Boolean, got {}",
                self.column, field.datatype
            )));
        }

        if self.remove_column {
            Ok(Some(input.without_column(&self.column)))
        } else {
            Ok(Some(input.clone()))
        }
    }
}
