use planlens_error::Result;

use super::operator::StepKind;
use super::single_input;
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::stream::DataStream;

#[derive(Debug, Clone, PartialEq)]
pub struct LimitStep {
    pub limit: usize,
    pub offset: usize,
}

impl Explainable for LimitStep {
    fn explain_entry(&self, _conf: ExplainConfig) -> ExplainEntry {
        ExplainEntry::new(self.name())
            .with_value("limit", self.limit)
            .with_value("offset", self.offset)
    }
}

impl StepKind for LimitStep {
    fn name(&self) -> &'static str {
        "Limit"
    }

    fn derive_output_stream(&self, inputs: &[DataStream]) -> Result<Option<DataStream>> {
        let input = single_input(self.name(), inputs)?;
        Ok(Some(input.clone()))
    }
}
