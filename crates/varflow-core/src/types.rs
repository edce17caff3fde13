use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Int(u16),
    Ptr,
    Void,
}

impl Type {
    pub const BOOL: Type = Type::Int(1);
    pub const I32: Type = Type::Int(32);
    pub const I64: Type = Type::Int(64);

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }
}

impl Default for Type {
    fn default() -> Self {
        Type::Void
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int(bits) => write!(f, "i{}", bits),
            Type::Ptr => write!(f, "ptr"),
            Type::Void => write!(f, "void"),
        }
    }
}

impl FromStr for Type {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ptr" => Ok(Type::Ptr),
            "void" => Ok(Type::Void),
            _ => s
                .strip_prefix('i')
                .and_then(|bits| bits.parse::<u16>().ok())
                .filter(|bits| *bits > 0)
                .map(Type::Int)
                .ok_or_else(|| format!("unknown type `{}`", s)),
        }
    }
}
