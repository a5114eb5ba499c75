use planlens_error::Result;

use super::operator::StepKind;
use super::{check_columns_exist, single_input};
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::stream::DataStream;

/// Removes duplicate rows.
#[derive(Debug, Clone, PartialEq)]
pub struct DistinctStep {
    /// Columns to distinct on. Empty means all columns.
    pub columns: Vec<String>,
}

impl Explainable for DistinctStep {
    fn explain_entry(&self, _conf: ExplainConfig) -> ExplainEntry {
        if self.columns.is_empty() {
            ExplainEntry::new(self.name())
        } else {
            ExplainEntry::new(self.name()).with_values("columns", &self.columns)
        }
    }
}

impl StepKind for DistinctStep {
    fn name(&self) -> &'static str {
        "Distinct"
    }

    fn derive_output_stream(&self, inputs: &[DataStream]) -> Result<Option<DataStream>> {
        let input = single_input(self.name(), inputs)?;
        check_columns_exist(self.name(), input, self.columns.iter().map(|c| c.as_str()))?;

        let columns: Vec<String> = if self.columns.is_empty() {
            input.fields().iter().map(|f| f.name.clone()).collect()
        } else {
            self.columns.clone()
        };

        Ok(Some(input.clone().with_distinct_columns(columns)))
    }
}
