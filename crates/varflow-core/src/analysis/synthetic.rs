use crate::values::{SyntheticId, ValueId};

/// Hands out hub identities for one analysis. Identities are never reused.
#[derive(Debug, Clone, Default)]
pub struct SyntheticIds {
    next: u32,
}

impl SyntheticIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh identity and advances the counter past it.
    pub fn allocate(&mut self) -> ValueId {
        let id = SyntheticId(self.next);
        self.next += 1;
        ValueId::Synthetic(id)
    }

    pub fn allocated(&self) -> u32 {
        self.next
    }
}
