use planlens_error::{DbError, Result};

use super::operator::StepKind;
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::stream::{DataStream, Field};

/// Reads rows from a table. Leaf of the plan.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadFromSourceStep {
    pub table: String,
    /// Columns read from the table.
    pub columns: Vec<Field>,
}

impl Explainable for ReadFromSourceStep {
    fn explain_entry(&self, _conf: ExplainConfig) -> ExplainEntry {
        ExplainEntry::new(self.name())
            .with_value("table", &self.table)
            .with_values("columns", self.columns.iter().map(|c| &c.name))
    }
}

impl StepKind for ReadFromSourceStep {
    fn name(&self) -> &'static str {
        "ReadFromSource"
    }

    fn derive_output_stream(&self, inputs: &[DataStream]) -> Result<Option<DataStream>> {
        if !inputs.is_empty() {
            return Err(DbError::logical(format!(
                "ReadFromSource takes no inputs, have {}",
                inputs.len()
            )));
        }
        Ok(Some(DataStream::new(self.columns.iter().cloned())))
    }
}
