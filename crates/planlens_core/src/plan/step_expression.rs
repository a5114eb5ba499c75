use std::fmt;

use planlens_error::{DbError, Result};

use super::operator::StepKind;
use super::single_input;
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::stream::{DataStream, Field};

/// A column computed from an expression over the input.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedColumn {
    /// Text of the expression, used for explaining.
    pub expr: String,
    /// Resulting column.
    pub output: Field,
}

impl fmt::Display for ComputedColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} AS {}", self.expr, self.output.name)
    }
}

/// Appends computed columns to the input.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStep {
    pub computed: Vec<ComputedColumn>,
}

impl Explainable for ExpressionStep {
    fn explain_entry(&self, conf: ExplainConfig) -> ExplainEntry {
        let ent = ExplainEntry::new(self.name()).with_values("expressions", &self.computed);
        if conf.verbose {
            ent.with_values("datatypes", self.computed.iter().map(|c| c.output.datatype))
        } else {
            ent
        }
    }
}

impl StepKind for ExpressionStep {
    fn name(&self) -> &'static str {
        "Expression"
    }

    fn derive_output_stream(&self, inputs: &[DataStream]) -> Result<Option<DataStream>> {
        let input = single_input(self.name(), inputs)?;

        for (idx, computed) in self.computed.iter().enumerate() {
            let name = &computed.output.name;
            let dup_in_input = input.field(name).is_some();
            let dup_in_computed = self.computed[..idx].iter().any(|c| &c.output.name == name);
            if dup_in_input || dup_in_computed {
                return Err(DbError::logical(format!(
                    "Duplicate column '{name}' produced by Expression"
                )));
            }
        }

        Ok(Some(input.with_appended(
            self.computed.iter().map(|c| c.output.clone()),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::DataType;

    fn computed(name: &str) -> ComputedColumn {
        ComputedColumn {
            expr: "a > 1".to_string(),
            output: Field::new(name, DataType::Boolean),
        }
    }

    #[test]
    fn appends_columns() {
        let input = DataStream::new([Field::new("a", DataType::Int64)]);
        let step = ExpressionStep {
            computed: vec![computed("gt")],
        };
        let out = step.derive_output_stream(&[input]).unwrap().unwrap();
        assert_eq!("a Int64, gt Boolean", out.display_header().to_string());
    }

    #[test]
    fn duplicate_column() {
        let input = DataStream::new([Field::new("a", DataType::Int64)]);
        let step = ExpressionStep {
            computed: vec![computed("gt"), computed("gt")],
        };
        step.derive_output_stream(&[input.clone()]).unwrap_err();

        let step = ExpressionStep {
            computed: vec![computed("a")],
        };
        step.derive_output_stream(&[input]).unwrap_err();
    }
}
