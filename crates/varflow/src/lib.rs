/*! Unified interface for varflow.
 *
 * One import for the whole pipeline: parsing textual IR, running the alias and dataflow analyzer,
 * and emitting reports. The member crates stay reachable as `core`, `parser` and `emit`.
 */

pub use varflow_core as core;
pub use varflow_emit as emit;
pub use varflow_parser as parser;

pub use varflow_core::{
    analyze_module, AnalysisConfig, AnalysisError, Analyzer, AnalyzerState, BindingStrategy,
    BranchTag, DataflowGraph, Module, ModuleBuilder, RoutineDataflow, VariableTable,
};
pub use varflow_emit::{report_to_string, EmitterConfig, OutputFormat};
pub use varflow_parser::{parse_file, parse_module, ParseError};

use indexmap::IndexMap;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Parses `source` and analyzes its routines, keyed by routine name.
pub fn analyze_source(
    source: &str,
    config: &AnalysisConfig,
) -> Result<(Module, IndexMap<String, RoutineDataflow>), Error> {
    let module = parse_module(source)?;
    let results = analyze_module(&module, config)?;
    Ok((module, results))
}
