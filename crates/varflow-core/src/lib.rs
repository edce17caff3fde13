/*! Core IR types and the variable alias / dataflow analyzer.
 *
 * Knowing which values are the same logical variable at different points in time, and which values
 * feed which results under which branch, is the raw material for slicing and taint questions. This
 * crate provides a small SSA-style IR to pose those questions on, and the analyzer that answers
 * them for one routine at a time.
 */

pub mod analysis;
pub mod block;
pub mod builder;
pub mod describe;
pub mod format;
pub mod instructions;
pub mod ir_persist;
pub mod module;
pub mod routine;
pub mod types;
pub mod values;

pub use analysis::{
    analyze_module, AnalysisConfig, Analyzer, AnalyzerState, ArgumentBinding, BindingStrategy,
    BranchTag, CallSiteOperands, DataflowGraph, Edge, EdgeLabel, FormalParameters, PendingEntry,
    RoutineDataflow, Synonym, VariableRecord, VariableTable,
};
pub use block::{BasicBlock, BlockId, Terminator};
pub use builder::{BlockBuilder, InstBuilder, ModuleBuilder, RoutineBuilder};
pub use describe::{Describe, ValueNames};
pub use format::{format_module, format_routine};
pub use instructions::{BinaryOp, Callee, CastOp, Instruction, IntPredicate, Operation};
pub use module::Module;
pub use routine::{Parameter, Routine, RoutineBody};
pub use types::Type;
pub use values::{Constant, GlobalId, InstId, ParamId, RoutineId, SyntheticId, ValueId};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IrError {
    #[error("Builder error: {0}")]
    BuilderError(String),
    #[error("Unknown block: {0}")]
    UnknownBlock(BlockId),
    #[error("Duplicate routine: @{0}")]
    DuplicateRoutine(String),
    #[error("Duplicate global: @{0}")]
    DuplicateGlobal(String),
}

pub type Result<T> = std::result::Result<T, IrError>;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Unresolved callee {callee} in @{routine}: no formal parameters to bind")]
    UnresolvedCallee { routine: String, callee: String },
    #[error("Analyzer is {found}, expected {expected}")]
    InvalidState {
        expected: AnalyzerState,
        found: AnalyzerState,
    },
    #[error("Routine not found: @{0}")]
    UnknownRoutine(String),
}

#[cfg(test)]
mod tests;
