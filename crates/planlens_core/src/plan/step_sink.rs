use planlens_error::Result;

use super::operator::StepKind;
use super::single_input;
use crate::describe::{PipelineFormatSettings, describe_processors};
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::processor::Processor;
use crate::stream::DataStream;

/// Writes its input to a destination. Produces no output stream.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteToSinkStep {
    pub destination: String,
}

impl Explainable for WriteToSinkStep {
    fn explain_entry(&self, _conf: ExplainConfig) -> ExplainEntry {
        ExplainEntry::new(self.name()).with_value("destination", &self.destination)
    }
}

impl StepKind for WriteToSinkStep {
    fn name(&self) -> &'static str {
        "WriteToSink"
    }

    fn derive_output_stream(&self, inputs: &[DataStream]) -> Result<Option<DataStream>> {
        single_input(self.name(), inputs)?;
        Ok(None)
    }

    /// The processors writing to the destination are described on a single
    /// line naming the destination. Everything upstream of them is described
    /// as usual.
    fn describe_pipeline(
        &self,
        processors: &[&dyn Processor],
        settings: &mut PipelineFormatSettings,
        out: &mut String,
    ) {
        let Some(first) = processors.first() else {
            return;
        };

        let run = processors
            .iter()
            .take_while(|p| p.name() == first.name())
            .count();

        settings.write_indent(out);
        out.push_str(first.name());
        if run > 1 {
            out.push_str(&format!(" (x{run})"));
        }
        out.push_str(" -> ");
        out.push_str(&self.destination);
        out.push('\n');
        settings.offset += settings.indent;

        describe_processors(&processors[run..], settings, out);
    }
}
