//! Text rendering of the processors making up a pipeline.

use crate::processor::Processor;

/// Formatting state for pipeline descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineFormatSettings {
    /// Current indentation, in repetitions of `indent_char`.
    pub offset: usize,
    /// Amount `offset` grows per nesting level.
    pub indent: usize,
    pub indent_char: char,
}

impl Default for PipelineFormatSettings {
    fn default() -> Self {
        PipelineFormatSettings {
            offset: 0,
            indent: 2,
            indent_char: ' ',
        }
    }
}

impl PipelineFormatSettings {
    pub fn write_indent(&self, out: &mut String) {
        out.extend(std::iter::repeat_n(self.indent_char, self.offset));
    }
}

/// Describe a sequence of processors, collapsing consecutive processors with
/// the same name into a single line with a count.
///
/// Processors must be ordered closest to the final output first. Each emitted
/// line is nested one level under the previous one since it feeds into it, so
/// `settings.offset` is left increased by one `indent` per emitted line.
///
/// `[A, A, A, B, B, C]` at offset 0 with an indent of 2 produces:
///
/// ```text
/// A (x3)
///   B (x2)
///     C
/// ```
pub fn describe_processors<'a, P>(
    processors: impl IntoIterator<Item = &'a P>,
    settings: &mut PipelineFormatSettings,
    out: &mut String,
) where
    P: Processor + ?Sized + 'a,
{
    // (name, count) of the run being accumulated.
    let mut current: Option<(&str, usize)> = None;

    for processor in processors {
        let name = processor.name();
        match current {
            Some((prev, ref mut count)) if prev == name => *count += 1,
            Some((prev, count)) => {
                write_run(prev, count, settings, out);
                current = Some((name, 1));
            }
            None => current = Some((name, 1)),
        }
    }

    if let Some((name, count)) = current {
        write_run(name, count, settings, out);
    }
}

fn write_run(name: &str, count: usize, settings: &mut PipelineFormatSettings, out: &mut String) {
    settings.write_indent(out);
    out.push_str(name);
    if count > 1 {
        out.push_str(" (x");
        out.push_str(&count.to_string());
        out.push(')');
    }
    out.push('\n');

    settings.offset += settings.indent;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::NamedProcessor;

    fn processors(names: &[&str]) -> Vec<NamedProcessor> {
        names.iter().map(|n| NamedProcessor::new(*n)).collect()
    }

    fn describe(names: &[&str], settings: &mut PipelineFormatSettings) -> String {
        let mut out = String::new();
        describe_processors(&processors(names), settings, &mut out);
        out
    }

    #[test]
    fn collapses_runs() {
        let mut settings = PipelineFormatSettings::default();
        let out = describe(&["A", "A", "A", "B", "B", "C"], &mut settings);
        assert_eq!("A (x3)\n  B (x2)\n    C\n", out);
        assert_eq!(6, settings.offset);
    }

    #[test]
    fn single_processor() {
        let mut settings = PipelineFormatSettings::default();
        let out = describe(&["X"], &mut settings);
        assert_eq!("X\n", out);
    }

    #[test]
    fn empty() {
        let mut settings = PipelineFormatSettings::default();
        let out = describe(&[], &mut settings);
        assert_eq!("", out);
        assert_eq!(0, settings.offset);
    }

    #[test]
    fn non_adjacent_names_not_merged() {
        let mut settings = PipelineFormatSettings::default();
        let out = describe(&["A", "B", "A"], &mut settings);
        assert_eq!("A\n  B\n    A\n", out);
    }

    #[test]
    fn uses_offset_and_fill_char() {
        let mut settings = PipelineFormatSettings {
            offset: 1,
            indent: 3,
            indent_char: '.',
        };
        let out = describe(&["Source", "Source", "Sink"], &mut settings);
        assert_eq!(".Source (x2)\n....Sink\n", out);
        assert_eq!(7, settings.offset);
    }

    #[test]
    fn trait_objects() {
        let procs: Vec<Box<dyn Processor>> = vec![
            Box::new(NamedProcessor::new("Resize")),
            Box::new(NamedProcessor::new("Resize")),
        ];
        let mut settings = PipelineFormatSettings::default();
        let mut out = String::new();
        describe_processors(&procs, &mut settings, &mut out);
        assert_eq!("Resize (x2)\n", out);
    }
}
