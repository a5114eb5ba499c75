//! Settings controlling plan explain output.

use std::collections::HashMap;
use std::sync::LazyLock;

use planlens_error::{DbError, Result};
use planlens_parser::ast::SettingsChanges;

use crate::describe::PipelineFormatSettings;

/// Settings for rendering a plan explain.
///
/// Set from the settings list of an EXPLAIN directive, e.g.
/// `EXPLAIN header = 1, indent = 4 SELECT ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplainSettings {
    /// Print the output header of each step.
    pub header: bool,
    /// Print each step's explain items.
    pub description: bool,
    /// Render as a json document instead of text.
    pub json: bool,
    /// Include step ids and input counts in each step's explain items.
    pub verbose: bool,
    pub indent: usize,
    pub indent_char: char,
}

impl Default for ExplainSettings {
    fn default() -> Self {
        ExplainSettings {
            header: false,
            description: true,
            json: false,
            verbose: false,
            indent: 2,
            indent_char: ' ',
        }
    }
}

impl ExplainSettings {
    pub fn set_from_str(&mut self, name: &str, value: &str) -> Result<()> {
        let func = GET_SET_FUNCTIONS
            .get(name)
            .ok_or_else(|| DbError::new(format!("Missing setting for '{name}'")))?;

        (func.set)(value, self)
    }

    pub fn get_as_string(&self, name: &str) -> Result<String> {
        let func = GET_SET_FUNCTIONS
            .get(name)
            .ok_or_else(|| DbError::new(format!("Missing setting for '{name}'")))?;

        Ok((func.get)(self))
    }

    /// Apply all changes from an EXPLAIN settings list, in order.
    pub fn apply_changes(&mut self, changes: &SettingsChanges) -> Result<()> {
        for change in changes.iter() {
            let name = change.name.to_ascii_lowercase();
            self.set_from_str(&name, &change.value.as_unquoted())?;
        }
        Ok(())
    }

    /// Formatting state for describing pipelines starting at offset 0.
    pub fn pipeline_format_settings(&self) -> PipelineFormatSettings {
        PipelineFormatSettings {
            offset: 0,
            indent: self.indent,
            indent_char: self.indent_char,
        }
    }

    /// Name, current value and description of every setting, sorted by
    /// name.
    pub fn describe_settings(&self) -> Vec<SettingDescription> {
        let mut settings: Vec<_> = GET_SET_FUNCTIONS
            .iter()
            .map(|(name, func)| SettingDescription {
                name: *name,
                value: (func.get)(self),
                description: func.description,
            })
            .collect();
        settings.sort_unstable_by_key(|s| s.name);
        settings
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingDescription {
    pub name: &'static str,
    pub value: String,
    pub description: &'static str,
}

struct SettingFunctions {
    set: fn(value: &str, conf: &mut ExplainSettings) -> Result<()>,
    get: fn(conf: &ExplainSettings) -> String,
    description: &'static str,
}

impl SettingFunctions {
    const fn new<S: ExplainSetting>() -> Self {
        SettingFunctions {
            set: S::set_from_str as _,
            get: S::get_as_string as _,
            description: S::DESCRIPTION,
        }
    }
}

fn insert_setting<S: ExplainSetting>(map: &mut HashMap<&'static str, SettingFunctions>) {
    if map.insert(S::NAME, SettingFunctions::new::<S>()).is_some() {
        panic!("Duplicate settings names: {}", S::NAME);
    }
}

static GET_SET_FUNCTIONS: LazyLock<HashMap<&'static str, SettingFunctions>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    insert_setting::<Header>(&mut map);
    insert_setting::<Description>(&mut map);
    insert_setting::<Json>(&mut map);
    insert_setting::<Verbose>(&mut map);
    insert_setting::<Indent>(&mut map);
    insert_setting::<IndentChar>(&mut map);

    map
});

pub trait ExplainSetting: Sync + Send + 'static {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    fn set_from_str(value: &str, conf: &mut ExplainSettings) -> Result<()>;
    fn get_as_string(conf: &ExplainSettings) -> String;
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(DbError::new(format!(
            "Invalid value for '{name}', expected a boolean"
        ))
        .with_field("value", value.to_string())),
    }
}

fn bool_to_string(b: bool) -> String {
    let s = if b { "1" } else { "0" };
    s.to_string()
}

pub struct Header;

impl ExplainSetting for Header {
    const NAME: &'static str = "header";
    const DESCRIPTION: &'static str = "Print the output header of each step";

    fn set_from_str(value: &str, conf: &mut ExplainSettings) -> Result<()> {
        conf.header = parse_bool(Self::NAME, value)?;
        Ok(())
    }

    fn get_as_string(conf: &ExplainSettings) -> String {
        bool_to_string(conf.header)
    }
}

pub struct Description;

impl ExplainSetting for Description {
    const NAME: &'static str = "description";
    const DESCRIPTION: &'static str = "Print the explain items of each step";

    fn set_from_str(value: &str, conf: &mut ExplainSettings) -> Result<()> {
        conf.description = parse_bool(Self::NAME, value)?;
        Ok(())
    }

    fn get_as_string(conf: &ExplainSettings) -> String {
        bool_to_string(conf.description)
    }
}

pub struct Json;

impl ExplainSetting for Json {
    const NAME: &'static str = "json";
    const DESCRIPTION: &'static str = "Render the plan as json";

    fn set_from_str(value: &str, conf: &mut ExplainSettings) -> Result<()> {
        conf.json = parse_bool(Self::NAME, value)?;
        Ok(())
    }

    fn get_as_string(conf: &ExplainSettings) -> String {
        bool_to_string(conf.json)
    }
}

pub struct Verbose;

impl ExplainSetting for Verbose {
    const NAME: &'static str = "verbose";
    const DESCRIPTION: &'static str = "Include step ids in the explain output";

    fn set_from_str(value: &str, conf: &mut ExplainSettings) -> Result<()> {
        conf.verbose = parse_bool(Self::NAME, value)?;
        Ok(())
    }

    fn get_as_string(conf: &ExplainSettings) -> String {
        bool_to_string(conf.verbose)
    }
}

const MAX_INDENT: usize = 64;

pub struct Indent;

impl ExplainSetting for Indent {
    const NAME: &'static str = "indent";
    const DESCRIPTION: &'static str = "Indentation added per nesting level";

    fn set_from_str(value: &str, conf: &mut ExplainSettings) -> Result<()> {
        let val: usize = value.parse().map_err(|_| {
            DbError::new("Invalid value for 'indent', expected an integer")
                .with_field("value", value.to_string())
        })?;

        if val == 0 {
            return Err(DbError::new("Indent cannot be less than 1"));
        }
        if val > MAX_INDENT {
            return Err(DbError::new(format!(
                "Indent cannot be greater than {MAX_INDENT}"
            )));
        }

        conf.indent = val;
        Ok(())
    }

    fn get_as_string(conf: &ExplainSettings) -> String {
        conf.indent.to_string()
    }
}

pub struct IndentChar;

impl ExplainSetting for IndentChar {
    const NAME: &'static str = "indent_char";
    const DESCRIPTION: &'static str = "Character used for indentation";

    fn set_from_str(value: &str, conf: &mut ExplainSettings) -> Result<()> {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                conf.indent_char = c;
                Ok(())
            }
            _ => Err(DbError::new("Indent char must be a single character")
                .with_field("value", value.to_string())),
        }
    }

    fn get_as_string(conf: &ExplainSettings) -> String {
        conf.indent_char.to_string()
    }
}
