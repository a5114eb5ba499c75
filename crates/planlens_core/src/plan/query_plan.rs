use std::collections::BTreeMap;
use std::sync::Arc;

use planlens_error::{Result, ResultExt};
use tracing::trace;

use super::operator::{PlanStep, QueryPlanStep, StepId};
use crate::config::ExplainSettings;
use crate::describe::PipelineFormatSettings;
use crate::explain::explainable::ExplainConfig;
use crate::explain::node::ExplainNode;
use crate::processor::Processor;
use crate::stream::DataStream;

/// Processors materialized for each step of a plan.
#[derive(Debug, Default, Clone)]
pub struct PipelineProcessors {
    processors: BTreeMap<StepId, Vec<Arc<dyn Processor>>>,
}

impl PipelineProcessors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add processors for a step, in pipeline order (sources first).
    pub fn insert<P>(&mut self, step: StepId, processors: impl IntoIterator<Item = P>)
    where
        P: Processor + 'static,
    {
        self.processors
            .entry(step)
            .or_default()
            .extend(processors.into_iter().map(|p| Arc::new(p) as Arc<dyn Processor>));
    }

    pub fn get(&self, step: StepId) -> &[Arc<dyn Processor>] {
        self.processors.get(&step).map(|p| p.as_slice()).unwrap_or(&[])
    }
}

/// A frozen plan.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    root: PlanStep,
}

impl QueryPlan {
    pub(crate) fn new(root: PlanStep) -> Self {
        QueryPlan { root }
    }

    pub fn root(&self) -> &PlanStep {
        &self.root
    }

    pub fn output_stream(&self) -> Option<&DataStream> {
        self.root.output_stream()
    }

    /// All steps, parents before children.
    pub fn steps(&self) -> Vec<&PlanStep> {
        let mut steps = Vec::new();
        self.root.walk(&mut |step| steps.push(step));
        steps
    }

    /// Render the step tree.
    pub fn explain_plan(&self, settings: &ExplainSettings) -> Result<String> {
        let conf = ExplainConfig {
            verbose: settings.verbose,
        };
        let node = ExplainNode::walk_plan(conf, settings, &self.root);
        trace!(?settings, "explaining plan");

        if settings.json {
            return serde_json::to_string_pretty(&node).context("Failed to serialize explain plan");
        }

        let mut out = String::new();
        let mut fmt = settings.pipeline_format_settings();
        write_plan_node(&node, settings, &mut fmt, &mut out);

        Ok(out)
    }

    /// Render the processors making up each step.
    ///
    /// Each step is printed as `(StepName)` followed by its processors. A
    /// step's children are nested under the last of its processors.
    pub fn explain_pipeline(&self, processors: &PipelineProcessors, settings: &ExplainSettings) -> String {
        trace!(?settings, "explaining pipeline");

        let mut out = String::new();
        let mut fmt = settings.pipeline_format_settings();
        write_pipeline_step(&self.root, processors, &mut fmt, &mut out);

        out
    }
}

fn write_plan_node(
    node: &ExplainNode,
    settings: &ExplainSettings,
    fmt: &mut PipelineFormatSettings,
    out: &mut String,
) {
    fmt.write_indent(out);
    out.push_str(&node.entry.to_string());
    out.push('\n');

    if settings.header {
        fmt.write_indent(out);
        match &node.output {
            Some(output) => out.push_str(&format!("Header: {}", output.display_header())),
            None => out.push_str("Header: <none>"),
        }
        out.push('\n');
    }

    fmt.offset += fmt.indent;
    for child in &node.children {
        write_plan_node(child, settings, fmt, out);
    }
    fmt.offset -= fmt.indent;
}

fn write_pipeline_step(
    step: &PlanStep,
    processors: &PipelineProcessors,
    fmt: &mut PipelineFormatSettings,
    out: &mut String,
) {
    let start = fmt.offset;

    fmt.write_indent(out);
    out.push('(');
    out.push_str(step.name());
    out.push_str(")\n");

    // Describer expects processors closest to the output first.
    let step_processors: Vec<&dyn Processor> = processors
        .get(step.step_id())
        .iter()
        .rev()
        .map(|p| p.as_ref())
        .collect();
    step.describe_pipeline(&step_processors, fmt, out);

    if fmt.offset == start {
        fmt.offset += fmt.indent;
    }

    let child_offset = fmt.offset;
    for child in step.children() {
        fmt.offset = child_offset;
        write_pipeline_step(child, processors, fmt, out);
    }

    fmt.offset = start;
}
