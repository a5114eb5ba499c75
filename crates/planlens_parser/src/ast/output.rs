use planlens_error::Result;
use serde::{Deserialize, Serialize};

use crate::format::{FormatAst, FormatSettings, write_quoted_string};

/// Options controlling where and how a query's result is written.
///
/// These trail the query text, e.g. `... INTO OUTFILE 'plan.txt' FORMAT TSV`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutputOptions {
    pub into_outfile: Option<String>,
    pub format: Option<String>,
}

impl OutputOptions {
    pub fn is_empty(&self) -> bool {
        self.into_outfile.is_none() && self.format.is_none()
    }
}

impl FormatAst for OutputOptions {
    /// Writes each present option with a leading space.
    fn format_ast(&self, settings: &FormatSettings, out: &mut String) -> Result<()> {
        if let Some(path) = &self.into_outfile {
            out.push(' ');
            settings.write_keyword(out, "INTO OUTFILE");
            out.push(' ');
            write_quoted_string(settings, out, path);
        }

        if let Some(format) = &self.format {
            out.push(' ');
            settings.write_keyword(out, "FORMAT");
            out.push(' ');
            out.push_str(format);
        }

        Ok(())
    }
}
