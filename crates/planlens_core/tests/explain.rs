use planlens_core::config::ExplainSettings;
use planlens_core::explain::{ExplainInputs, explain_settings, render_explain};
use planlens_core::plan::step_distinct::DistinctStep;
use planlens_core::plan::step_expression::{ComputedColumn, ExpressionStep};
use planlens_core::plan::step_filter::FilterStep;
use planlens_core::plan::step_limit::LimitStep;
use planlens_core::plan::step_read::ReadFromSourceStep;
use planlens_core::plan::step_sink::WriteToSinkStep;
use planlens_core::plan::step_sort::SortStep;
use planlens_core::plan::{PipelineProcessors, PlanBuilder, QueryPlan, QueryPlanStep};
use planlens_core::processor::NamedProcessor;
use planlens_core::stream::{DataType, Field, SortColumn};
use planlens_parser::ast::{ExplainKind, SettingsClonePolicy};
use planlens_parser::format::{FormatAst, FormatSettings};
use planlens_parser::parse_explain;

/// WriteToSink <- Limit <- Sort <- Distinct <- Filter <- Expression <- ReadFromSource
fn build_plan() -> QueryPlan {
    let mut builder = PlanBuilder::new();

    let read = builder
        .add_step(
            ReadFromSourceStep {
                table: "orders".to_string(),
                columns: vec![
                    Field::new("id", DataType::Int64),
                    Field::new("amount", DataType::Float64),
                ],
            },
            Vec::new(),
        )
        .unwrap();
    let expr = builder
        .add_step(
            ExpressionStep {
                computed: vec![ComputedColumn {
                    expr: "amount > 10".to_string(),
                    output: Field::new("big", DataType::Boolean),
                }],
            },
            vec![read],
        )
        .unwrap();
    let filter = builder
        .add_step(
            FilterStep {
                column: "big".to_string(),
                remove_column: true,
            },
            vec![expr],
        )
        .unwrap();
    let distinct = builder
        .add_step(DistinctStep { columns: Vec::new() }, vec![filter])
        .unwrap();
    let sort = builder
        .add_step(
            SortStep {
                description: vec![SortColumn::desc("amount")],
                limit: None,
            },
            vec![distinct],
        )
        .unwrap();
    let limit = builder
        .add_step(LimitStep { limit: 5, offset: 0 }, vec![sort])
        .unwrap();
    let sink = builder
        .add_step(
            WriteToSinkStep {
                destination: "top.csv".to_string(),
            },
            vec![limit],
        )
        .unwrap();

    builder.build(sink)
}

#[test]
fn explain_plan_end_to_end() {
    logutil::init_test();

    let explain = parse_explain("EXPLAIN PLAN header = 1 SELECT id, amount FROM orders;")
        .unwrap()
        .unwrap();
    assert_eq!(ExplainKind::QueryPlan, explain.kind());
    assert_eq!("Explain_EXPLAIN", explain.id('_'));

    let plan = build_plan();
    let inputs = ExplainInputs {
        analyzed_query: None,
        plan: Some(&plan),
    };
    let out = render_explain(&explain, inputs, &FormatSettings::PLAIN).unwrap();

    let expected = [
        "WriteToSink (destination = top.csv)",
        "Header: <none>",
        "  Limit (limit = 5, offset = 0)",
        "  Header: id Int64, amount Float64",
        "    Sort (description = [amount DESC])",
        "    Header: id Int64, amount Float64",
        "      Distinct",
        "      Header: id Int64, amount Float64",
        "        Filter (column = big, remove_column = true)",
        "        Header: id Int64, amount Float64",
        "          Expression (expressions = [amount > 10 AS big])",
        "          Header: id Int64, amount Float64, big Boolean",
        "            ReadFromSource (columns = [id, amount], table = orders)",
        "            Header: id Int64, amount Float64",
        "",
    ]
    .join("\n");
    assert_eq!(expected, out);
}

#[test]
fn metadata_flows_through_plan() {
    let plan = build_plan();
    let steps = plan.steps();

    let limit = steps[1];
    let output = limit.get_output_stream().unwrap();
    assert_eq!(Some(&[SortColumn::desc("amount")][..]), output.sort_description());
    assert_eq!(2, output.distinct_columns().unwrap().len());

    let sink = steps[0];
    assert!(sink.get_output_stream().unwrap_err().is_logical());
}

#[test]
fn explain_pipeline_end_to_end() {
    logutil::init_test();

    let plan = build_plan();
    let mut processors = PipelineProcessors::new();
    for step in plan.steps() {
        let names: &[&str] = match step.name() {
            "ReadFromSource" => &["Source", "Source", "Source"],
            "Expression" => &["ExpressionTransform", "ExpressionTransform", "ExpressionTransform"],
            "Filter" => &["FilterTransform", "FilterTransform", "FilterTransform"],
            "Distinct" => &["Resize", "DistinctTransform"],
            "Sort" => &["PartialSorting", "PartialSorting", "MergeSorting"],
            "Limit" => &["Limit"],
            "WriteToSink" => &["CsvSink"],
            _ => &[],
        };
        processors.insert(step.step_id(), names.iter().map(|n| NamedProcessor::new(*n)));
    }

    let explain = parse_explain("EXPLAIN indent = 1, indent_char = '.' SELECT 1")
        .unwrap()
        .unwrap();
    let settings = explain_settings(&explain).unwrap();
    let out = plan.explain_pipeline(&processors, &settings);

    let expected = [
        "(WriteToSink)",
        "CsvSink -> top.csv",
        ".(Limit)",
        ".Limit",
        "..(Sort)",
        "..MergeSorting",
        "...PartialSorting (x2)",
        "....(Distinct)",
        "....DistinctTransform",
        ".....Resize",
        "......(Filter)",
        "......FilterTransform (x3)",
        ".......(Expression)",
        ".......ExpressionTransform (x3)",
        "........(ReadFromSource)",
        "........Source (x3)",
        "",
    ]
    .join("\n");
    assert_eq!(expected, out);
}

#[test]
fn raw_ast_round_trip() {
    let explain = parse_explain("ast  select a ,b from t into outfile 'x.txt' format JSON")
        .unwrap()
        .unwrap();
    assert!(explain.legacy_syntax());
    assert_eq!("Explain_AST", explain.id('_'));

    let out = render_explain(&explain, ExplainInputs::default(), &FormatSettings::PLAIN).unwrap();
    assert_eq!("select a, b from t", out);
    assert_eq!(
        "AST select a, b from t INTO OUTFILE 'x.txt' FORMAT JSON",
        explain.to_query_string(&FormatSettings::PLAIN).unwrap()
    );
}

#[test]
fn clone_policies() {
    let explain = parse_explain("EXPLAIN SYNTAX json = 1 SELECT a FROM t")
        .unwrap()
        .unwrap();

    let cloned = explain.clone();
    assert_eq!(explain.kind(), cloned.kind());
    assert_eq!(explain.explained_query(), cloned.explained_query());
    assert!(cloned.settings().is_none());

    let kept = explain.clone_with(SettingsClonePolicy::Keep);
    assert_eq!(explain, kept);
    assert!(explain_settings(&kept).unwrap().json);
    assert_eq!(ExplainSettings::default(), explain_settings(&cloned).unwrap());
}
