use crate::{
    block::BlockId, instructions::Callee, module::Module, values::ValueId, AnalysisError,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A call instruction as seen by the analyzer.
#[derive(Debug, Clone, Copy)]
pub struct CallSite<'a> {
    pub routine: &'a str,
    pub block: BlockId,
    pub result: ValueId,
    pub callee: &'a Callee,
    pub args: &'a [ValueId],
}

/// Chooses which values feed a call's hub node.
pub trait ArgumentBinding: fmt::Debug {
    fn name(&self) -> &'static str;

    fn bind(&self, call: &CallSite<'_>, module: &Module) -> Result<Vec<ValueId>, AnalysisError>;
}

/// Binds the callee's declared parameters. The callee must be statically
/// known; an indirect or unknown callee is a hard failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormalParameters;

impl ArgumentBinding for FormalParameters {
    fn name(&self) -> &'static str {
        "formal-parameters"
    }

    fn bind(&self, call: &CallSite<'_>, module: &Module) -> Result<Vec<ValueId>, AnalysisError> {
        module
            .resolve(call.callee)
            .map(|callee| callee.param_values())
            .ok_or_else(|| AnalysisError::UnresolvedCallee {
                routine: call.routine.to_string(),
                callee: call.callee.to_string(),
            })
    }
}

/// Binds the actual operands passed at the call site.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallSiteOperands;

impl ArgumentBinding for CallSiteOperands {
    fn name(&self) -> &'static str {
        "call-site-operands"
    }

    fn bind(&self, call: &CallSite<'_>, _module: &Module) -> Result<Vec<ValueId>, AnalysisError> {
        Ok(call.args.to_vec())
    }
}

/// Serializable selector for the built-in bindings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BindingStrategy {
    #[default]
    FormalParameters,
    CallSiteOperands,
}

impl BindingStrategy {
    pub fn binding(&self) -> Box<dyn ArgumentBinding> {
        match self {
            BindingStrategy::FormalParameters => Box::new(FormalParameters),
            BindingStrategy::CallSiteOperands => Box::new(CallSiteOperands),
        }
    }
}
