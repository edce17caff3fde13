/*! Track variable aliases and dataflow through a single routine.
 *
 * The analyzer is a syntactic, best-effort tracker. A first pass tags every successor block with
 * the branch edge that reaches it; a second pass walks instructions in program order, recording
 * which values alias each stack variable over time and which values flow into computed and
 * called results. Memory reached any other way is simply not tracked.
 */

pub mod analyzer;
pub mod binding;
pub mod branch;
pub mod config;
pub mod graph;
pub mod synthetic;
pub mod variables;

pub use analyzer::{Analyzer, AnalyzerState, RoutineDataflow};
pub use binding::{ArgumentBinding, BindingStrategy, CallSite, CallSiteOperands, FormalParameters};
pub use branch::{classify_branches, BranchTag, PendingBranches, PendingEntry};
pub use config::AnalysisConfig;
pub use graph::{DataflowGraph, Edge, EdgeLabel};
pub use synthetic::SyntheticIds;
pub use variables::{Synonym, VariableRecord, VariableTable, SYNTHETIC_VERSION};

use crate::{module::Module, AnalysisError};
use indexmap::IndexMap;
use tracing::info;

/// Analyzes routines of `module` one at a time, each with a fresh analyzer.
///
/// Stops at the first routine that fails.
pub fn analyze_module(
    module: &Module,
    config: &AnalysisConfig,
) -> Result<IndexMap<String, RoutineDataflow>, AnalysisError> {
    let routines: Vec<_> = if config.routines.is_empty() {
        module.defined_routines().collect()
    } else {
        config
            .routines
            .iter()
            .map(|name| {
                module
                    .routine(name)
                    .ok_or_else(|| AnalysisError::UnknownRoutine(name.clone()))
            })
            .collect::<Result<_, _>>()?
    };

    let mut results = IndexMap::new();
    for routine in routines {
        let mut analyzer = Analyzer::new(module, routine).with_strategy(config.binding);
        analyzer.run()?;
        let dataflow = analyzer.into_dataflow()?;
        info!(
            routine = %routine.name,
            variables = dataflow.variables.len(),
            edges = dataflow.graph.len(),
            "routine analyzed"
        );
        results.insert(routine.name.clone(), dataflow);
    }

    Ok(results)
}
