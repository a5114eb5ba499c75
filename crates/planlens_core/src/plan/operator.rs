use std::fmt;

use planlens_error::{DbError, Result};
use serde::{Deserialize, Serialize};

use super::step_distinct::DistinctStep;
use super::step_expression::ExpressionStep;
use super::step_filter::FilterStep;
use super::step_limit::LimitStep;
use super::step_read::ReadFromSourceStep;
use super::step_sink::WriteToSinkStep;
use super::step_sort::SortStep;
use super::step_union::UnionStep;
use crate::describe::{PipelineFormatSettings, describe_processors};
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::processor::Processor;
use crate::stream::DataStream;

/// Identifies a step within a single plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(usize);

impl StepId {
    pub const fn new(v: usize) -> Self {
        StepId(v)
    }

    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Step specific logic.
///
/// Everything common to all steps (inputs, output, children) lives on
/// `Node<S>`.
pub trait StepKind: Explainable + fmt::Debug + Clone + PartialEq {
    /// Name of the step.
    fn name(&self) -> &'static str;

    /// Compute the output stream of this step given the output streams of its
    /// children.
    ///
    /// Returns `None` for steps that don't produce any output (sinks). Errors
    /// indicate the plan was built incorrectly.
    fn derive_output_stream(&self, inputs: &[DataStream]) -> Result<Option<DataStream>>;

    /// Describe the processors instantiated for this step.
    ///
    /// Processors are ordered closest to the output first.
    fn describe_pipeline(
        &self,
        processors: &[&dyn Processor],
        settings: &mut PipelineFormatSettings,
        out: &mut String,
    ) {
        describe_processors(processors, settings, out)
    }
}

/// Common operations across all steps in a plan.
///
/// Implemented on `Node<S>` for every step kind, and on `PlanStep`.
pub trait QueryPlanStep {
    fn name(&self) -> &'static str;

    fn step_id(&self) -> StepId;

    /// The output stream if this step produces one.
    fn output_stream(&self) -> Option<&DataStream>;

    fn has_output_stream(&self) -> bool {
        self.output_stream().is_some()
    }

    /// Get the output stream for this step.
    ///
    /// Errors if the step doesn't produce an output. This is always a bug in
    /// how the plan was built, not something caused by the query.
    fn get_output_stream(&self) -> Result<&DataStream> {
        self.output_stream().ok_or_else(|| {
            DbError::logical(format!(
                "QueryPlanStep {} does not have output stream.",
                self.name()
            ))
            .with_field("step_id", self.step_id())
        })
    }

    /// Streams consumed by this step, one per child.
    fn input_streams(&self) -> &[DataStream];

    fn children(&self) -> &[PlanStep];

    /// Describe the processors instantiated for this step.
    ///
    /// Processors are ordered closest to the output first.
    fn describe_pipeline(
        &self,
        processors: &[&dyn Processor],
        settings: &mut PipelineFormatSettings,
        out: &mut String,
    );
}

/// A step in the plan along with its inputs, output and children.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<S> {
    /// Step specific logic.
    pub step: S,
    id: StepId,
    input_streams: Vec<DataStream>,
    output_stream: Option<DataStream>,
    children: Vec<PlanStep>,
}

impl<S> Node<S> {
    pub(crate) fn new(
        step: S,
        id: StepId,
        input_streams: Vec<DataStream>,
        output_stream: Option<DataStream>,
        children: Vec<PlanStep>,
    ) -> Self {
        Node {
            step,
            id,
            input_streams,
            output_stream,
            children,
        }
    }
}

impl<S: StepKind> QueryPlanStep for Node<S> {
    fn name(&self) -> &'static str {
        self.step.name()
    }

    fn step_id(&self) -> StepId {
        self.id
    }

    fn output_stream(&self) -> Option<&DataStream> {
        self.output_stream.as_ref()
    }

    fn input_streams(&self) -> &[DataStream] {
        &self.input_streams
    }

    fn children(&self) -> &[PlanStep] {
        &self.children
    }

    fn describe_pipeline(
        &self,
        processors: &[&dyn Processor],
        settings: &mut PipelineFormatSettings,
        out: &mut String,
    ) {
        self.step.describe_pipeline(processors, settings, out)
    }
}

impl<S: StepKind> Explainable for Node<S> {
    fn explain_entry(&self, conf: ExplainConfig) -> ExplainEntry {
        let ent = self.step.explain_entry(conf);
        if conf.verbose {
            ent.with_value("step_id", self.id)
                .with_value("inputs", self.input_streams.len())
        } else {
            ent
        }
    }
}

/// A step in the physical plan.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanStep {
    ReadFromSource(Node<ReadFromSourceStep>),
    Filter(Node<FilterStep>),
    Expression(Node<ExpressionStep>),
    Sort(Node<SortStep>),
    Distinct(Node<DistinctStep>),
    Limit(Node<LimitStep>),
    Union(Node<UnionStep>),
    WriteToSink(Node<WriteToSinkStep>),
}

impl PlanStep {
    fn as_step(&self) -> &dyn QueryPlanStep {
        match self {
            Self::ReadFromSource(n) => n,
            Self::Filter(n) => n,
            Self::Expression(n) => n,
            Self::Sort(n) => n,
            Self::Distinct(n) => n,
            Self::Limit(n) => n,
            Self::Union(n) => n,
            Self::WriteToSink(n) => n,
        }
    }

    /// Visit this step and all steps below it, parents before children.
    pub fn walk<'a, F>(&'a self, func: &mut F)
    where
        F: FnMut(&'a PlanStep),
    {
        func(self);
        for child in self.children() {
            child.walk(func);
        }
    }
}

impl QueryPlanStep for PlanStep {
    fn name(&self) -> &'static str {
        self.as_step().name()
    }

    fn step_id(&self) -> StepId {
        self.as_step().step_id()
    }

    fn output_stream(&self) -> Option<&DataStream> {
        self.as_step().output_stream()
    }

    fn input_streams(&self) -> &[DataStream] {
        self.as_step().input_streams()
    }

    fn children(&self) -> &[PlanStep] {
        self.as_step().children()
    }

    fn describe_pipeline(
        &self,
        processors: &[&dyn Processor],
        settings: &mut PipelineFormatSettings,
        out: &mut String,
    ) {
        self.as_step().describe_pipeline(processors, settings, out)
    }
}

impl Explainable for PlanStep {
    fn explain_entry(&self, conf: ExplainConfig) -> ExplainEntry {
        match self {
            Self::ReadFromSource(n) => n.explain_entry(conf),
            Self::Filter(n) => n.explain_entry(conf),
            Self::Expression(n) => n.explain_entry(conf),
            Self::Sort(n) => n.explain_entry(conf),
            Self::Distinct(n) => n.explain_entry(conf),
            Self::Limit(n) => n.explain_entry(conf),
            Self::Union(n) => n.explain_entry(conf),
            Self::WriteToSink(n) => n.explain_entry(conf),
        }
    }
}

macro_rules! impl_from_node {
    ($variant:ident, $step:ty) => {
        impl From<Node<$step>> for PlanStep {
            fn from(node: Node<$step>) -> Self {
                PlanStep::$variant(node)
            }
        }
    };
}

impl_from_node!(ReadFromSource, ReadFromSourceStep);
impl_from_node!(Filter, FilterStep);
impl_from_node!(Expression, ExpressionStep);
impl_from_node!(Sort, SortStep);
impl_from_node!(Distinct, DistinctStep);
impl_from_node!(Limit, LimitStep);
impl_from_node!(Union, UnionStep);
impl_from_node!(WriteToSink, WriteToSinkStep);
