use crate::analysis::{
    analyze_module, AnalysisConfig, Analyzer, AnalyzerState, BindingStrategy, Synonym,
};
use crate::builder::{InstBuilder, ModuleBuilder};
use crate::module::Module;
use crate::types::Type;
use crate::values::{SyntheticId, ValueId};
use crate::AnalysisError;
use pretty_assertions::assert_eq;

fn two_routines() -> Module {
    let mut mb = ModuleBuilder::new();
    mb.declare("ext", &[Type::I32], Type::I32).unwrap();
    for name in ["first", "second"] {
        let mut rb = mb.routine(name);
        let a = rb.param("a", Type::I32);
        let mut entry = rb.entry_block();
        let t = entry.add("t", a, a);
        entry.ret(Some(t)).unwrap();
        rb.build().unwrap();
    }
    mb.finish()
}

fn assert_invalid(err: AnalysisError, expected: AnalyzerState, found: AnalyzerState) {
    match err {
        AnalysisError::InvalidState {
            expected: e,
            found: f,
        } => {
            assert_eq!(e, expected);
            assert_eq!(f, found);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_states_advance_in_order() {
    let module = two_routines();
    let mut analyzer = Analyzer::for_routine(&module, "first").unwrap();
    assert_eq!(analyzer.state(), AnalyzerState::Unclassified);

    analyzer.classify().unwrap();
    assert_eq!(analyzer.state(), AnalyzerState::Classified);

    analyzer.build().unwrap();
    assert_eq!(analyzer.state(), AnalyzerState::Built);
}

#[test]
fn test_build_requires_classification() {
    let module = two_routines();
    let mut analyzer = Analyzer::for_routine(&module, "first").unwrap();

    let err = analyzer.build().unwrap_err();
    assert_invalid(err, AnalyzerState::Classified, AnalyzerState::Unclassified);
    assert_eq!(analyzer.state(), AnalyzerState::Unclassified);
}

#[test]
fn test_queries_refused_before_built() {
    let module = two_routines();
    let mut analyzer = Analyzer::for_routine(&module, "first").unwrap();

    assert!(analyzer.pending().is_err());
    analyzer.classify().unwrap();
    assert!(analyzer.pending().is_ok());

    let err = analyzer.variables().unwrap_err();
    assert_invalid(err, AnalyzerState::Built, AnalyzerState::Classified);
    assert!(analyzer.graph().is_err());
}

#[test]
fn test_analyzer_runs_once() {
    let module = two_routines();
    let mut analyzer = Analyzer::for_routine(&module, "first").unwrap();
    analyzer.run().unwrap();

    let err = analyzer.run().unwrap_err();
    assert_invalid(err, AnalyzerState::Unclassified, AnalyzerState::Built);
    assert_eq!(analyzer.graph().unwrap().len(), 3);
}

#[test]
fn test_declaration_builds_empty_tables() {
    let module = two_routines();
    let mut analyzer = Analyzer::for_routine(&module, "ext").unwrap();
    analyzer.run().unwrap();

    let dataflow = analyzer.into_dataflow().unwrap();
    assert_eq!(dataflow.routine, "ext");
    assert!(dataflow.variables.is_empty());
    assert!(dataflow.graph.is_empty());
    assert!(dataflow.unconsumed.is_empty());
}

#[test]
fn test_unknown_routine() {
    let module = two_routines();
    let err = Analyzer::for_routine(&module, "nope").unwrap_err();
    assert!(matches!(err, AnalysisError::UnknownRoutine(name) if name == "nope"));
}

#[test]
fn test_analyze_module_uses_fresh_analyzers() {
    let module = two_routines();
    let results = analyze_module(&module, &AnalysisConfig::default()).unwrap();

    let names: Vec<_> = results.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["first", "second"]);

    // Synthetic ids restart for every routine.
    let hub = ValueId::Synthetic(SyntheticId(0));
    for dataflow in results.values() {
        assert_eq!(
            dataflow.variables.records()[0].synonyms(),
            &[Synonym::new(hub, -1)]
        );
    }
}

#[test]
fn test_analyze_module_honours_filter() {
    let module = two_routines();
    let config = AnalysisConfig::default()
        .with_binding(BindingStrategy::CallSiteOperands)
        .with_routine("second");
    let results = analyze_module(&module, &config).unwrap();
    assert_eq!(results.len(), 1);
    assert!(results.contains_key("second"));

    let missing = AnalysisConfig::default().with_routine("third");
    let err = analyze_module(&module, &missing).unwrap_err();
    assert!(matches!(err, AnalysisError::UnknownRoutine(_)));
}

#[test]
fn test_analyze_module_stops_on_failure() {
    let mut mb = ModuleBuilder::new();
    let mut rb = mb.routine("broken");
    {
        let mut entry = rb.entry_block();
        entry.call("r", "nowhere", vec![], Type::I32);
        entry.ret(None).unwrap();
    }
    rb.build().unwrap();
    let module = mb.finish();

    let err = analyze_module(&module, &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(err, AnalysisError::UnresolvedCallee { .. }));

    let config = AnalysisConfig::default().with_binding(BindingStrategy::CallSiteOperands);
    assert_eq!(analyze_module(&module, &config).unwrap().len(), 1);
}
