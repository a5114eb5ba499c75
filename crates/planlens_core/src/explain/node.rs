use serde::{Deserialize, Serialize};

use super::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::config::ExplainSettings;
use crate::plan::{PlanStep, QueryPlanStep};
use crate::stream::DataStream;

/// A step in an explained plan.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExplainNode {
    pub entry: ExplainEntry,
    /// Output of the step. Only set when headers were requested and the step
    /// produces an output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<DataStream>,
    pub children: Vec<ExplainNode>,
}

impl ExplainNode {
    pub fn walk_plan(config: ExplainConfig, settings: &ExplainSettings, step: &PlanStep) -> Self {
        let entry = if settings.description {
            step.explain_entry(config)
        } else {
            ExplainEntry::new(step.name())
        };

        let output = if settings.header {
            step.output_stream().cloned()
        } else {
            None
        };

        let children = step
            .children()
            .iter()
            .map(|child| Self::walk_plan(config, settings, child))
            .collect();

        ExplainNode {
            entry,
            output,
            children,
        }
    }
}
