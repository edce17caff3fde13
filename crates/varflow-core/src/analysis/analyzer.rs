use super::{
    binding::{ArgumentBinding, BindingStrategy, CallSite, FormalParameters},
    branch::{classify_branches, BranchTag, PendingBranches, PendingEntry},
    graph::{DataflowGraph, EdgeLabel},
    synthetic::SyntheticIds,
    variables::VariableTable,
};
use crate::{
    block::BlockId,
    describe::{Describe, ValueNames},
    instructions::{Instruction, Operation},
    module::Module,
    routine::Routine,
    values::ValueId,
    AnalysisError,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, debug_span, trace};

type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalyzerState {
    Unclassified,
    Classifying,
    Classified,
    Building,
    Built,
    Failed,
}

impl fmt::Display for AnalyzerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Everything one analysis produced, detached from the IR it was built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutineDataflow {
    pub routine: String,
    pub variables: VariableTable,
    pub graph: DataflowGraph,
    /// Branch tags no data-producing operation claimed.
    pub unconsumed: Vec<PendingEntry>,
}

/// Alias and dataflow analysis of a single routine.
///
/// Runs in two passes: [`Analyzer::classify`] tags successor blocks by the
/// branch edge that reaches them, then [`Analyzer::build`] walks every
/// instruction in program order to grow the variable table and edge graph.
pub struct Analyzer<'a> {
    module: &'a Module,
    routine: &'a Routine,
    names: Box<dyn Describe + 'a>,
    binding: Box<dyn ArgumentBinding>,
    state: AnalyzerState,
    pending: PendingBranches,
    variables: VariableTable,
    graph: DataflowGraph,
    synthetic: SyntheticIds,
}

impl<'a> Analyzer<'a> {
    pub fn new(module: &'a Module, routine: &'a Routine) -> Self {
        Self {
            module,
            routine,
            names: Box::new(ValueNames::new(module, routine)),
            binding: Box::new(FormalParameters),
            state: AnalyzerState::Unclassified,
            pending: PendingBranches::new(),
            variables: VariableTable::new(),
            graph: DataflowGraph::new(),
            synthetic: SyntheticIds::new(),
        }
    }

    pub fn for_routine(module: &'a Module, name: &str) -> Result<Self> {
        module
            .routine(name)
            .map(|routine| Self::new(module, routine))
            .ok_or_else(|| AnalysisError::UnknownRoutine(name.to_string()))
    }

    pub fn with_binding<B: ArgumentBinding + 'static>(mut self, binding: B) -> Self {
        self.binding = Box::new(binding);
        self
    }

    pub fn with_strategy(mut self, strategy: BindingStrategy) -> Self {
        self.binding = strategy.binding();
        self
    }

    pub fn with_describer<D: Describe + 'a>(mut self, names: D) -> Self {
        self.names = Box::new(names);
        self
    }

    pub fn state(&self) -> AnalyzerState {
        self.state
    }

    pub fn routine(&self) -> &Routine {
        self.routine
    }

    pub fn binding(&self) -> &dyn ArgumentBinding {
        self.binding.as_ref()
    }

    /// Classifies and builds.
    pub fn run(&mut self) -> Result<()> {
        let span = debug_span!("analyze", routine = %self.routine.name);
        let _enter = span.enter();

        debug!(binding = self.binding.name(), "begin routine");
        self.classify()?;
        self.build()?;
        debug!(
            variables = self.variables.len(),
            edges = self.graph.len(),
            unconsumed = self.pending.len(),
            "end of routine"
        );
        Ok(())
    }

    /// First pass: register a branch tag for every successor edge.
    pub fn classify(&mut self) -> Result<()> {
        self.expect_state(AnalyzerState::Unclassified)?;
        self.state = AnalyzerState::Classifying;

        self.pending = classify_branches(self.routine);
        trace!(
            entries = self.pending.len(),
            shadowed = self.pending.shadowed(),
            "branches classified"
        );

        self.state = AnalyzerState::Classified;
        Ok(())
    }

    /// Second pass: dispatch every instruction in program order.
    ///
    /// A hard failure leaves the analyzer `Failed` and discards what was built.
    pub fn build(&mut self) -> Result<()> {
        self.expect_state(AnalyzerState::Classified)?;
        self.state = AnalyzerState::Building;

        let routine = self.routine;
        for block in routine.blocks() {
            for inst in &block.instructions {
                if let Err(err) = self.dispatch(block.id, inst) {
                    self.fail();
                    return Err(err);
                }
            }
        }

        self.state = AnalyzerState::Built;
        Ok(())
    }

    pub fn variables(&self) -> Result<&VariableTable> {
        self.expect_state(AnalyzerState::Built)?;
        Ok(&self.variables)
    }

    pub fn graph(&self) -> Result<&DataflowGraph> {
        self.expect_state(AnalyzerState::Built)?;
        Ok(&self.graph)
    }

    /// Tags still waiting to be claimed. Readable once classification is done.
    pub fn pending(&self) -> Result<&PendingBranches> {
        match self.state {
            AnalyzerState::Classified | AnalyzerState::Building | AnalyzerState::Built => {
                Ok(&self.pending)
            }
            found => Err(AnalysisError::InvalidState {
                expected: AnalyzerState::Classified,
                found,
            }),
        }
    }

    pub fn into_dataflow(self) -> Result<RoutineDataflow> {
        self.expect_state(AnalyzerState::Built)?;
        Ok(RoutineDataflow {
            routine: self.routine.name.clone(),
            unconsumed: self.pending.remaining().collect(),
            variables: self.variables,
            graph: self.graph,
        })
    }

    fn expect_state(&self, expected: AnalyzerState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(AnalysisError::InvalidState {
                expected,
                found: self.state,
            })
        }
    }

    fn fail(&mut self) {
        self.state = AnalyzerState::Failed;
        self.pending = PendingBranches::new();
        self.variables = VariableTable::new();
        self.graph = DataflowGraph::new();
    }

    fn dispatch(&mut self, block: BlockId, inst: &'a Instruction) -> Result<()> {
        match inst.operation() {
            Operation::StackAlloc { result } => self.on_alloca(result),
            Operation::Load { result, address } => self.on_load(result, address),
            Operation::Store { address, value } => self.on_store(address, value),
            Operation::Binary {
                result,
                left,
                right,
            } => self.on_binary(block, result, left, right),
            Operation::Call {
                result,
                callee,
                args,
            } => {
                let site = CallSite {
                    routine: &self.routine.name,
                    block,
                    result,
                    callee,
                    args,
                };
                let bound = self.binding.bind(&site, self.module)?;
                self.on_call(block, result, &bound);
            }
            Operation::Ignored => {
                trace!(inst = %self.names.describe(inst.value()), "skipped");
            }
        }
        Ok(())
    }

    fn on_alloca(&mut self, target: ValueId) {
        debug!(target = %self.names.describe(target), "alloca");

        let name = self.names.name(target);
        self.variables.introduce(name, target);
    }

    fn on_load(&mut self, target: ValueId, address: ValueId) {
        debug!(
            from = %self.names.describe(address),
            to = %self.names.describe(target),
            "load"
        );

        if self.variables.record_read(address, target).is_none() {
            trace!(address = %address, "load from untracked address dropped");
        }
    }

    fn on_store(&mut self, address: ValueId, value: ValueId) {
        debug!(
            from = %self.names.describe(value),
            to = %self.names.describe(address),
            "store"
        );

        let names = &self.names;
        if self
            .variables
            .record_write(address, value, |v| names.name(v))
            .is_none()
        {
            trace!(address = %address, "store to untracked address dropped");
        }
    }

    fn on_binary(&mut self, block: BlockId, target: ValueId, left: ValueId, right: ValueId) {
        debug!(
            left = %self.names.describe(left),
            right = %self.names.describe(right),
            target = %self.names.describe(target),
            block = %block,
            "binary"
        );

        let tag = self.claim_tag(block);
        let name = self.names.label(target);
        let hub = self.introduce_hub(&name);

        let incoming = EdgeLabel::new(name.clone(), tag);
        self.graph.add_edge(left, hub, incoming.clone());
        self.graph.add_edge(right, hub, incoming);
        self.graph
            .add_edge(hub, target, EdgeLabel::new(name, BranchTag::Common));
    }

    fn on_call(&mut self, block: BlockId, result: ValueId, args: &[ValueId]) {
        debug!(
            result = %self.names.describe(result),
            args = args.len(),
            block = %block,
            "call"
        );

        let tag = self.claim_tag(block);
        let name = self.names.label(result);
        let hub = self.introduce_hub(&name);

        let incoming = EdgeLabel::new(name.clone(), tag);
        for &arg in args {
            trace!(arg = %self.names.describe(arg), "call argument");
            self.graph.add_edge(arg, hub, incoming.clone());
        }
        self.graph
            .add_edge(hub, result, EdgeLabel::new(name, BranchTag::Common));
    }

    /// The block's pending tag, consumed; `Common` once it has been taken.
    fn claim_tag(&mut self, block: BlockId) -> BranchTag {
        match self.pending.claim(block) {
            Some(tag) => {
                trace!(block = %block, %tag, "claimed branch tag");
                tag
            }
            None => BranchTag::Common,
        }
    }

    /// One identity serves both as the hub record's synonym and as the node
    /// every edge of the operation goes through.
    fn introduce_hub(&mut self, name: &str) -> ValueId {
        let hub = self.synthetic.allocate();
        self.variables.introduce_synthetic(name, hub);
        hub
    }
}

impl fmt::Debug for Analyzer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("routine", &self.routine.name)
            .field("binding", &self.binding.name())
            .field("state", &self.state)
            .field("variables", &self.variables.len())
            .field("edges", &self.graph.len())
            .finish()
    }
}
