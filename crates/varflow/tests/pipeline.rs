use pretty_assertions::assert_eq;
use varflow::{
    analyze_source, report_to_string, AnalysisConfig, BindingStrategy, BranchTag, EmitterConfig,
    Error, OutputFormat,
};

const SOURCE: &str = "\
routine @main(%a: i32, %b: i32) -> i32 {
entry:
    %x = alloca i32
    store %a, %x
    %v = load i32, %x
    %s = mul %v, %b
    ret %s
}
";

#[test]
fn test_analyze_source_end_to_end() {
    let (module, results) = analyze_source(SOURCE, &AnalysisConfig::default()).unwrap();
    let dataflow = &results["main"];

    let x = dataflow.variables.find_by_name("x").unwrap();
    let versions: Vec<i64> = x.synonyms().iter().map(|s| s.version).collect();
    assert_eq!(versions, vec![0, 1, 1]);
    assert!(dataflow
        .graph
        .edges()
        .iter()
        .all(|edge| edge.label.tag == BranchTag::Common));

    let text = report_to_string(&module, &results, OutputFormat::Text, &EmitterConfig::plain())
        .unwrap();
    assert!(text.contains("# edge # %v -> $s0 (s<common>)"));
    assert!(text.contains("# edge # $s0 -> %s (s<common>)"));
}

#[test]
fn test_analyze_source_reports_parse_errors() {
    let err = analyze_source("routine @f( {", &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}

#[test]
fn test_analyze_source_reports_analysis_errors() {
    let source = "\
routine @main(%fp: ptr) {
entry:
    call void %fp()
    ret
}
";
    let err = analyze_source(source, &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(err, Error::Analysis(_)));

    let config = AnalysisConfig {
        binding: BindingStrategy::CallSiteOperands,
        ..AnalysisConfig::default()
    };
    assert!(analyze_source(source, &config).is_ok());
}

#[test]
fn test_unnamed_temporaries_keep_separate_labels() {
    let source = "\
declare @sink(i32) -> i32

routine @main(%a: i32) -> i32 {
entry:
    %3 = add %a, 1
    %4 = mul %3, %a
    %5 = call i32 @sink(%4)
    ret %5
}
";
    let (_, results) = analyze_source(source, &AnalysisConfig::default()).unwrap();
    let dataflow = &results["main"];

    let names: Vec<&str> = dataflow.variables.records().iter().map(|r| r.name()).collect();
    assert_eq!(names.len(), 3);
    assert!(names.iter().all(|name| !name.is_empty()));
    assert_ne!(names[0], names[1]);
    assert_ne!(names[1], names[2]);

    assert_eq!(dataflow.graph.edges_labeled("").count(), 0);
    for name in names {
        assert!(dataflow.graph.edges_labeled(name).count() >= 2);
    }
}
