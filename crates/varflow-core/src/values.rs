use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of any value the analyzer can see.
///
/// Equality is identity: two instructions computing the same thing are still
/// different values. Constants are the exception, they are uniqued by their
/// literal so every `1` in a routine is the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueId {
    Inst(InstId),
    Param(ParamId),
    Global(GlobalId),
    Const(Constant),
    Synthetic(SyntheticId),
}

impl ValueId {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, ValueId::Synthetic(_))
    }

    pub fn int(value: i64) -> Self {
        ValueId::Const(Constant::Int(value))
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueId::Inst(id) => write!(f, "{}", id),
            ValueId::Param(id) => write!(f, "{}", id),
            ValueId::Global(id) => write!(f, "{}", id),
            ValueId::Const(c) => write!(f, "{}", c),
            ValueId::Synthetic(id) => write!(f, "{}", id),
        }
    }
}

impl From<InstId> for ValueId {
    fn from(id: InstId) -> Self {
        ValueId::Inst(id)
    }
}

impl From<ParamId> for ValueId {
    fn from(id: ParamId) -> Self {
        ValueId::Param(id)
    }
}

impl From<GlobalId> for ValueId {
    fn from(id: GlobalId) -> Self {
        ValueId::Global(id)
    }
}

impl From<Constant> for ValueId {
    fn from(c: Constant) -> Self {
        ValueId::Const(c)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstId(pub u32);

impl fmt::Display for InstId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoutineId(pub u32);

impl fmt::Display for RoutineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn{}", self.0)
    }
}

/// A formal parameter, scoped to the routine that declares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamId {
    pub routine: RoutineId,
    pub index: u32,
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:p{}", self.routine, self.index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GlobalId(pub u32);

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Identity of a hub node introduced by the analyzer. Never produced by IR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SyntheticId(pub u32);

impl fmt::Display for SyntheticId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constant {
    Int(i64),
    Bool(bool),
    Null,
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(v) => write!(f, "{}", v),
            Constant::Bool(b) => write!(f, "{}", b),
            Constant::Null => write!(f, "null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_uniqued_by_literal() {
        assert_eq!(ValueId::int(1), ValueId::Const(Constant::Int(1)));
        assert_ne!(ValueId::int(1), ValueId::int(2));
    }

    #[test]
    fn instructions_are_identity_compared() {
        assert_ne!(ValueId::Inst(InstId(0)), ValueId::Inst(InstId(1)));
        assert_ne!(
            ValueId::Param(ParamId {
                routine: RoutineId(0),
                index: 0
            }),
            ValueId::Param(ParamId {
                routine: RoutineId(1),
                index: 0
            })
        );
    }

    #[test]
    fn display_matches_textual_form() {
        assert_eq!(ValueId::Inst(InstId(3)).to_string(), "v3");
        assert_eq!(ValueId::Synthetic(SyntheticId(0)).to_string(), "s0");
        assert_eq!(ValueId::int(-4).to_string(), "-4");
        assert_eq!(ValueId::Const(Constant::Null).to_string(), "null");
    }
}
