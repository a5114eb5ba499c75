use planlens_error::Result;
use tracing::debug;

use super::operator::{Node, PlanStep, QueryPlanStep, StepId, StepKind};
use super::query_plan::QueryPlan;

/// Builds a plan bottom up.
///
/// Steps are created with their children already built, so every step's
/// inputs are known (and validated) at creation.
#[derive(Debug, Default)]
pub struct PlanBuilder {
    next_id: usize,
}

impl PlanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a step on top of `children`.
    ///
    /// The step's inputs are the output streams of its children, in order.
    /// Errors if any child doesn't produce an output, or if the step rejects
    /// its inputs.
    pub fn add_step<S>(&mut self, step: S, children: Vec<PlanStep>) -> Result<PlanStep>
    where
        S: StepKind,
        Node<S>: Into<PlanStep>,
    {
        let inputs = children
            .iter()
            .map(|child| {
                child
                    .get_output_stream()
                    .cloned()
                    .map_err(|e| e.with_field("parent", step.name()))
            })
            .collect::<Result<Vec<_>>>()?;

        let output = step.derive_output_stream(&inputs)?;

        let id = StepId::new(self.next_id);
        self.next_id += 1;

        debug!(
            step = step.name(),
            %id,
            inputs = inputs.len(),
            has_output = output.is_some(),
            "added plan step"
        );

        Ok(Node::new(step, id, inputs, output, children).into())
    }

    /// Freeze the plan rooted at `root`.
    pub fn build(self, root: PlanStep) -> QueryPlan {
        debug!(root = root.name(), steps = self.next_id, "built query plan");
        QueryPlan::new(root)
    }
}
