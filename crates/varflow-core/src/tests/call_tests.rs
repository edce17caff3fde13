use crate::analysis::{
    Analyzer, AnalyzerState, BindingStrategy, BranchTag, CallSiteOperands, Synonym,
};
use crate::builder::{InstBuilder, ModuleBuilder};
use crate::module::Module;
use crate::types::Type;
use crate::values::{ParamId, SyntheticId, ValueId};
use crate::AnalysisError;
use pretty_assertions::assert_eq;

/// `@sink(i32, i32) -> i32` called once from `@main` with `(%a, 7)`.
fn call_into_sink() -> (Module, ValueId, ValueId) {
    let mut mb = ModuleBuilder::new();
    mb.declare("sink", &[Type::I32, Type::I32], Type::I32)
        .unwrap();
    let mut rb = mb.routine("main");
    let a = rb.param("a", Type::I32);
    let r = {
        let mut entry = rb.entry_block();
        let r = entry.call("r", "sink", vec![a, ValueId::int(7)], Type::I32);
        entry.ret(Some(r)).unwrap();
        r
    };
    rb.build().unwrap();
    (mb.finish(), a, r)
}

#[test]
fn test_call_binds_formal_parameters() {
    let (module, _, r) = call_into_sink();
    let sink = module.routine("sink").unwrap().id;
    let formal = |index| ValueId::Param(ParamId {
        routine: sink,
        index,
    });

    let mut analyzer = Analyzer::for_routine(&module, "main").unwrap();
    analyzer.run().unwrap();
    let graph = analyzer.graph().unwrap();
    let hub = ValueId::Synthetic(SyntheticId(0));

    let edges: Vec<_> = graph.edges().iter().map(|e| (e.from, e.to)).collect();
    assert_eq!(edges, vec![(formal(0), hub), (formal(1), hub), (hub, r)]);
    assert!(graph.edges_labeled("r").all(|e| e.label.tag == BranchTag::Common));

    let vars = analyzer.variables().unwrap();
    assert_eq!(vars.records()[0].synonyms(), &[Synonym::new(hub, -1)]);
}

#[test]
fn test_call_binds_call_site_operands() {
    let (module, a, r) = call_into_sink();

    let mut analyzer = Analyzer::for_routine(&module, "main")
        .unwrap()
        .with_binding(CallSiteOperands);
    analyzer.run().unwrap();
    let graph = analyzer.graph().unwrap();
    let hub = ValueId::Synthetic(SyntheticId(0));

    let edges: Vec<_> = graph.edges().iter().map(|e| (e.from, e.to)).collect();
    assert_eq!(
        edges,
        vec![(a, hub), (ValueId::int(7), hub), (hub, r)]
    );
    assert!(graph.flows_to(a, r));
}

#[test]
fn test_call_hub_matches_record() {
    let (module, _, _) = call_into_sink();

    let mut analyzer = Analyzer::for_routine(&module, "main")
        .unwrap()
        .with_strategy(BindingStrategy::CallSiteOperands);
    analyzer.run().unwrap();

    let record = &analyzer.variables().unwrap().records()[0];
    assert!(record.is_synthetic());
    let hub = record.defining().value;
    for edge in analyzer.graph().unwrap().edges() {
        assert!(edge.from == hub || edge.to == hub);
    }
}

#[test]
fn test_call_without_arguments() {
    let mut mb = ModuleBuilder::new();
    mb.declare("tick", &[], Type::Void).unwrap();
    let mut rb = mb.routine("main");
    let call = {
        let mut entry = rb.entry_block();
        let call = entry.call("", "tick", vec![], Type::Void);
        entry.ret(None).unwrap();
        call
    };
    rb.build().unwrap();
    let module = mb.finish();

    let mut analyzer = Analyzer::for_routine(&module, "main").unwrap();
    analyzer.run().unwrap();

    let graph = analyzer.graph().unwrap();
    assert_eq!(graph.len(), 1);
    assert_eq!(graph.edges()[0].to, call);
    assert_eq!(graph.edges()[0].label.variable, "%0");
    assert_eq!(analyzer.variables().unwrap().len(), 1);
}

#[test]
fn test_unresolved_callee_fails_analysis() {
    let mut mb = ModuleBuilder::new();
    let mut rb = mb.routine("main");
    {
        let mut entry = rb.entry_block();
        let x = entry.alloca("x", Type::I32);
        entry.store(ValueId::int(1), x);
        entry.call("r", "missing", vec![], Type::I32);
        entry.ret(None).unwrap();
    }
    rb.build().unwrap();
    let module = mb.finish();

    let mut analyzer = Analyzer::for_routine(&module, "main").unwrap();
    let err = analyzer.run().unwrap_err();

    match err {
        AnalysisError::UnresolvedCallee { routine, callee } => {
            assert_eq!(routine, "main");
            assert_eq!(callee, "@missing");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(analyzer.state(), AnalyzerState::Failed);
    assert!(analyzer.variables().is_err());
    assert!(analyzer.graph().is_err());
}

#[test]
fn test_indirect_call_needs_call_site_binding() {
    let mut mb = ModuleBuilder::new();
    let mut rb = mb.routine("main");
    let target = rb.param("fp", Type::Ptr);
    let a = rb.param("a", Type::I32);
    {
        let mut entry = rb.entry_block();
        let r = entry.call_indirect("r", target, vec![a], Type::I32);
        entry.ret(Some(r)).unwrap();
    }
    rb.build().unwrap();
    let module = mb.finish();

    let mut formal = Analyzer::for_routine(&module, "main").unwrap();
    assert!(formal.run().is_err());
    assert_eq!(formal.state(), AnalyzerState::Failed);

    let mut operands = Analyzer::for_routine(&module, "main")
        .unwrap()
        .with_binding(CallSiteOperands);
    operands.run().unwrap();
    assert_eq!(operands.graph().unwrap().len(), 2);
}

#[test]
fn test_call_and_binary_share_block_tag() {
    let mut mb = ModuleBuilder::new();
    mb.declare("sink", &[Type::I32], Type::I32).unwrap();
    let mut rb = mb.routine("main");
    let c = rb.param("c", Type::BOOL);
    let a = rb.param("a", Type::I32);
    let then_b = rb.create_block("then");
    let else_b = rb.create_block("else");
    rb.entry_block().branch(c, then_b, else_b).unwrap();
    {
        let mut bb = rb.block(then_b).unwrap();
        let r = bb.call("r", "sink", vec![a], Type::I32);
        let s = bb.add("s", r, a);
        bb.ret(Some(s)).unwrap();
    }
    rb.block(else_b).unwrap().ret(None).unwrap();
    rb.build().unwrap();
    let module = mb.finish();

    let mut analyzer = Analyzer::for_routine(&module, "main")
        .unwrap()
        .with_binding(CallSiteOperands);
    analyzer.run().unwrap();

    let graph = analyzer.graph().unwrap();
    let r_in = graph.edges_labeled("r").next().unwrap();
    assert_eq!(r_in.label.tag, BranchTag::Common);
    assert!(graph
        .edges_labeled("s")
        .all(|e| e.label.tag == BranchTag::Common));

    let unconsumed: Vec<_> = analyzer.pending().unwrap().remaining().collect();
    assert_eq!(unconsumed.len(), 1);
    assert_eq!(unconsumed[0].block, else_b);
    assert_eq!(unconsumed[0].tag, BranchTag::Inhibit);
}
