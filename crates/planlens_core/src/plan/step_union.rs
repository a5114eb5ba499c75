use planlens_error::{DbError, Result};

use super::operator::StepKind;
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::stream::DataStream;

/// Concatenates rows from two or more inputs with identical headers.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionStep;

impl Explainable for UnionStep {
    fn explain_entry(&self, _conf: ExplainConfig) -> ExplainEntry {
        ExplainEntry::new(self.name())
    }
}

impl StepKind for UnionStep {
    fn name(&self) -> &'static str {
        "Union"
    }

    fn derive_output_stream(&self, inputs: &[DataStream]) -> Result<Option<DataStream>> {
        let first = match inputs {
            [first, _, ..] => first,
            _ => {
                return Err(DbError::logical(format!(
                    "Union requires at least 2 inputs, have {}",
                    inputs.len()
                )));
            }
        };

        for (idx, input) in inputs.iter().enumerate().skip(1) {
            if !first.has_equal_header(input) {
                return Err(DbError::logical("Union inputs have different headers")
                    .with_field("first", first.display_header())
                    .with_field("input_idx", idx)
                    .with_field("input", input.display_header()));
            }
        }

        // Interleaving rows loses any ordering or distinctness.
        Ok(Some(first.header_only()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{DataType, Field, SortColumn};

    #[test]
    fn drops_metadata() {
        let a = DataStream::new([Field::new("a", DataType::Int64)])
            .with_sort_description(vec![SortColumn::asc("a")]);
        let b = DataStream::new([Field::new("a", DataType::Int64)]);

        let out = UnionStep.derive_output_stream(&[a, b]).unwrap().unwrap();
        assert_eq!(None, out.sort_description());
    }

    #[test]
    fn mismatched_headers() {
        let a = DataStream::new([Field::new("a", DataType::Int64)]);
        let b = DataStream::new([Field::new("a", DataType::Utf8)]);

        let err = UnionStep.derive_output_stream(&[a, b]).unwrap_err();
        assert!(err.is_logical());
        assert_eq!(Some("1"), err.get_field("input_idx"));
    }

    #[test]
    fn single_input() {
        let a = DataStream::new([Field::new("a", DataType::Int64)]);
        UnionStep.derive_output_stream(&[a]).unwrap_err();
    }
}
