use planlens_error::Result;

use super::operator::StepKind;
use super::{check_columns_exist, single_input};
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::stream::{DataStream, SortColumn};

/// Orders rows, optionally keeping only the first `limit` rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SortStep {
    pub description: Vec<SortColumn>,
    pub limit: Option<usize>,
}

impl Explainable for SortStep {
    fn explain_entry(&self, _conf: ExplainConfig) -> ExplainEntry {
        let ent = ExplainEntry::new(self.name()).with_values("description", &self.description);
        match self.limit {
            Some(limit) => ent.with_value("limit", limit),
            None => ent,
        }
    }
}

impl StepKind for SortStep {
    fn name(&self) -> &'static str {
        "Sort"
    }

    fn derive_output_stream(&self, inputs: &[DataStream]) -> Result<Option<DataStream>> {
        let input = single_input(self.name(), inputs)?;
        check_columns_exist(
            self.name(),
            input,
            self.description.iter().map(|s| s.column.as_str()),
        )?;

        Ok(Some(input.clone().with_sort_description(self.description.clone())))
    }
}
