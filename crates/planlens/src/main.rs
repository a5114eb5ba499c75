use std::io::{self, BufWriter, Write};

use clap::{Parser, Subcommand};
use planlens_core::config::ExplainSettings;
use planlens_core::describe::describe_processors;
use planlens_core::explain::{ExplainInputs, render_explain};
use planlens_core::plan::PlanBuilder;
use planlens_core::plan::step_read::ReadFromSourceStep;
use planlens_core::plan::step_sink::WriteToSinkStep;
use planlens_core::processor::NamedProcessor;
use planlens_core::stream::{DataType, Field};
use planlens_error::{DbError, Result};
use planlens_parser::format::{FormatAst, FormatSettings};
use planlens_parser::parse_explain;

#[derive(Parser)]
#[clap(name = "planlens")]
struct Arguments {
    /// Log as json.
    #[clap(long, env = "PLANLENS_LOG_JSON")]
    log_json: bool,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse an EXPLAIN statement and print it back out.
    Format {
        sql: String,
        /// Highlight keywords and literals.
        #[clap(long)]
        hilite: bool,
    },
    /// Render an EXPLAIN against a single table scan.
    Explain {
        sql: String,
        /// Table the plan reads from.
        #[clap(long, default_value = "t")]
        table: String,
        /// Columns of the table, as 'name:type'.
        #[clap(long = "column", value_parser = parse_column)]
        columns: Vec<Field>,
        /// Write the scan to this destination.
        #[clap(long)]
        sink: Option<String>,
    },
    /// Describe a pipeline of processors, closest to the output first.
    Describe {
        processors: Vec<String>,
        #[clap(long, default_value_t = 2)]
        indent: usize,
        #[clap(long, default_value_t = ' ')]
        indent_char: char,
    },
    /// List the settings accepted by a plan EXPLAIN, with their defaults.
    Settings,
}

fn parse_column(s: &str) -> Result<Field> {
    let (name, datatype) = s
        .split_once(':')
        .ok_or_else(|| DbError::new(format!("Expected 'name:type', got '{s}'")))?;
    Ok(Field::new(name, datatype.parse()?))
}

fn main() {
    let args = Arguments::parse();
    let format = if args.log_json {
        logutil::LogFormat::Json
    } else {
        logutil::LogFormat::HumanReadable
    };
    logutil::configure_global_logger(tracing::Level::ERROR, format, io::stderr);

    if let Err(err) = inner(args.command) {
        println!("ERROR: {err}");
        std::process::exit(1);
    }
}

fn inner(command: Command) -> Result<()> {
    let mut stdout = BufWriter::new(io::stdout());

    match command {
        Command::Format { sql, hilite } => {
            let explain = parse_explain(&sql)?
                .ok_or_else(|| DbError::new("Not an EXPLAIN statement"))?;
            let settings = FormatSettings { hilite };

            writeln!(stdout, "{}", explain.to_query_string(&settings)?)?;
            writeln!(stdout, "id: {}", explain.id('_'))?;
        }
        Command::Explain {
            sql,
            table,
            columns,
            sink,
        } => {
            let explain = parse_explain(&sql)?
                .ok_or_else(|| DbError::new("Not an EXPLAIN statement"))?;

            let columns = if columns.is_empty() {
                vec![Field::new("a", DataType::Int64)]
            } else {
                columns
            };

            let mut builder = PlanBuilder::new();
            let mut root = builder.add_step(ReadFromSourceStep { table, columns }, Vec::new())?;
            if let Some(destination) = sink {
                root = builder.add_step(WriteToSinkStep { destination }, vec![root])?;
            }
            let plan = builder.build(root);

            // Without an analyzer, the explained query stands in for the
            // analyzed one.
            let inputs = ExplainInputs {
                analyzed_query: explain.explained_query(),
                plan: Some(&plan),
            };
            let out = render_explain(&explain, inputs, &FormatSettings::PLAIN)?;
            write!(stdout, "{out}")?;
            if !out.ends_with('\n') {
                writeln!(stdout)?;
            }
        }
        Command::Settings => {
            for setting in ExplainSettings::default().describe_settings() {
                writeln!(
                    stdout,
                    "{} = '{}'\t{}",
                    setting.name, setting.value, setting.description
                )?;
            }
        }
        Command::Describe {
            processors,
            indent,
            indent_char,
        } => {
            let mut settings = ExplainSettings::default();
            settings.set_from_str("indent", &indent.to_string())?;
            settings.indent_char = indent_char;

            let processors: Vec<_> = processors.into_iter().map(NamedProcessor::new).collect();
            let mut fmt = settings.pipeline_format_settings();
            let mut out = String::new();
            describe_processors(&processors, &mut fmt, &mut out);

            write!(stdout, "{out}")?;
        }
    }

    stdout.flush()?;
    Ok(())
}
