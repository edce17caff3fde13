use crate::block::BlockId;
use crate::types::Type;
use crate::values::{InstId, ValueId};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    Alloca {
        result: InstId,
        ty: Type,
    },
    Load {
        result: InstId,
        address: ValueId,
        ty: Type,
    },
    Store {
        id: InstId,
        address: ValueId,
        value: ValueId,
    },
    Binary {
        result: InstId,
        op: BinaryOp,
        left: ValueId,
        right: ValueId,
    },
    Call {
        result: InstId,
        callee: Callee,
        args: Vec<ValueId>,
        ty: Type,
    },
    Compare {
        result: InstId,
        pred: IntPredicate,
        left: ValueId,
        right: ValueId,
    },
    Cast {
        result: InstId,
        op: CastOp,
        value: ValueId,
        ty: Type,
    },
    Phi {
        result: InstId,
        incoming: Vec<(ValueId, BlockId)>,
        ty: Type,
    },
}

/// Opcode classification the analyzer dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation<'a> {
    StackAlloc {
        result: ValueId,
    },
    Load {
        result: ValueId,
        address: ValueId,
    },
    Store {
        address: ValueId,
        value: ValueId,
    },
    Binary {
        result: ValueId,
        left: ValueId,
        right: ValueId,
    },
    Call {
        result: ValueId,
        callee: &'a Callee,
        args: &'a [ValueId],
    },
    Ignored,
}

impl Instruction {
    /// The instruction's own value. Instructions without a meaningful result
    /// (stores) still have an identity.
    pub fn id(&self) -> InstId {
        match self {
            Instruction::Alloca { result, .. }
            | Instruction::Load { result, .. }
            | Instruction::Binary { result, .. }
            | Instruction::Call { result, .. }
            | Instruction::Compare { result, .. }
            | Instruction::Cast { result, .. }
            | Instruction::Phi { result, .. } => *result,
            Instruction::Store { id, .. } => *id,
        }
    }

    pub fn value(&self) -> ValueId {
        ValueId::Inst(self.id())
    }

    pub fn has_result(&self) -> bool {
        match self {
            Instruction::Store { .. } => false,
            Instruction::Call { ty, .. } => !ty.is_void(),
            _ => true,
        }
    }

    pub fn operation(&self) -> Operation<'_> {
        match self {
            Instruction::Alloca { result, .. } => Operation::StackAlloc {
                result: ValueId::Inst(*result),
            },
            Instruction::Load {
                result, address, ..
            } => Operation::Load {
                result: ValueId::Inst(*result),
                address: *address,
            },
            Instruction::Store { address, value, .. } => Operation::Store {
                address: *address,
                value: *value,
            },
            Instruction::Binary {
                result,
                left,
                right,
                ..
            } => Operation::Binary {
                result: ValueId::Inst(*result),
                left: *left,
                right: *right,
            },
            Instruction::Call {
                result,
                callee,
                args,
                ..
            } => Operation::Call {
                result: ValueId::Inst(*result),
                callee,
                args,
            },
            Instruction::Compare { .. } | Instruction::Cast { .. } | Instruction::Phi { .. } => {
                Operation::Ignored
            }
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Alloca { .. } => "alloca",
            Instruction::Load { .. } => "load",
            Instruction::Store { .. } => "store",
            Instruction::Binary { op, .. } => op.mnemonic(),
            Instruction::Call { .. } => "call",
            Instruction::Compare { .. } => "icmp",
            Instruction::Cast { op, .. } => op.mnemonic(),
            Instruction::Phi { .. } => "phi",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Callee {
    Direct(String),
    Indirect(ValueId),
}

impl fmt::Display for Callee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callee::Direct(name) => write!(f, "@{}", name),
            Callee::Indirect(value) => write!(f, "{}", value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    SDiv,
    UDiv,
    SRem,
    URem,
    And,
    Or,
    Xor,
    Shl,
    LShr,
    AShr,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 13] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::SDiv,
        BinaryOp::UDiv,
        BinaryOp::SRem,
        BinaryOp::URem,
        BinaryOp::And,
        BinaryOp::Or,
        BinaryOp::Xor,
        BinaryOp::Shl,
        BinaryOp::LShr,
        BinaryOp::AShr,
    ];

    pub fn mnemonic(&self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::SDiv => "sdiv",
            BinaryOp::UDiv => "udiv",
            BinaryOp::SRem => "srem",
            BinaryOp::URem => "urem",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
            BinaryOp::Shl => "shl",
            BinaryOp::LShr => "lshr",
            BinaryOp::AShr => "ashr",
        }
    }

    pub fn from_mnemonic(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.mnemonic() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntPredicate {
    Eq,
    Ne,
    Slt,
    Sle,
    Sgt,
    Sge,
    Ult,
    Ule,
    Ugt,
    Uge,
}

impl IntPredicate {
    pub const ALL: [IntPredicate; 10] = [
        IntPredicate::Eq,
        IntPredicate::Ne,
        IntPredicate::Slt,
        IntPredicate::Sle,
        IntPredicate::Sgt,
        IntPredicate::Sge,
        IntPredicate::Ult,
        IntPredicate::Ule,
        IntPredicate::Ugt,
        IntPredicate::Uge,
    ];

    pub fn mnemonic(&self) -> &'static str {
        match self {
            IntPredicate::Eq => "eq",
            IntPredicate::Ne => "ne",
            IntPredicate::Slt => "slt",
            IntPredicate::Sle => "sle",
            IntPredicate::Sgt => "sgt",
            IntPredicate::Sge => "sge",
            IntPredicate::Ult => "ult",
            IntPredicate::Ule => "ule",
            IntPredicate::Ugt => "ugt",
            IntPredicate::Uge => "uge",
        }
    }

    pub fn from_mnemonic(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.mnemonic() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastOp {
    Trunc,
    ZExt,
    SExt,
    Bitcast,
    PtrToInt,
    IntToPtr,
}

impl CastOp {
    pub const ALL: [CastOp; 6] = [
        CastOp::Trunc,
        CastOp::ZExt,
        CastOp::SExt,
        CastOp::Bitcast,
        CastOp::PtrToInt,
        CastOp::IntToPtr,
    ];

    pub fn mnemonic(&self) -> &'static str {
        match self {
            CastOp::Trunc => "trunc",
            CastOp::ZExt => "zext",
            CastOp::SExt => "sext",
            CastOp::Bitcast => "bitcast",
            CastOp::PtrToInt => "ptrtoint",
            CastOp::IntToPtr => "inttoptr",
        }
    }

    pub fn from_mnemonic(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.mnemonic() == s)
    }
}
