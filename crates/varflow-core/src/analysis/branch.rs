use crate::{block::BlockId, routine::Routine};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Which outgoing edge of a terminator a block was reached through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchTag {
    /// First successor of a terminator, or no branch information at all.
    #[default]
    Common,
    /// Any successor after the first.
    Inhibit,
}

impl BranchTag {
    pub fn for_successor(index: usize) -> Self {
        if index == 0 {
            BranchTag::Common
        } else {
            BranchTag::Inhibit
        }
    }
}

impl fmt::Display for BranchTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchTag::Common => write!(f, "common"),
            BranchTag::Inhibit => write!(f, "inhibit"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingEntry {
    pub block: BlockId,
    pub tag: BranchTag,
}

/// Branch tags waiting to be claimed by the first data-producing operation of
/// their block. Each entry can be claimed once.
#[derive(Debug, Clone, Default)]
pub struct PendingBranches {
    entries: IndexMap<BlockId, BranchTag>,
    shadowed: usize,
}

impl PendingBranches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `tag` for `block`. A block reached by several edges keeps the
    /// tag of the first edge registered; returns `false` for the later ones.
    pub fn register(&mut self, block: BlockId, tag: BranchTag) -> bool {
        if self.entries.contains_key(&block) {
            self.shadowed += 1;
            return false;
        }
        self.entries.insert(block, tag);
        true
    }

    /// Removes and returns the tag for `block`.
    pub fn claim(&mut self, block: BlockId) -> Option<BranchTag> {
        self.entries.shift_remove(&block)
    }

    pub fn peek(&self, block: BlockId) -> Option<BranchTag> {
        self.entries.get(&block).copied()
    }

    pub fn remaining(&self) -> impl Iterator<Item = PendingEntry> + '_ {
        self.entries
            .iter()
            .map(|(&block, &tag)| PendingEntry { block, tag })
    }

    /// Registrations dropped because their block already had a tag.
    pub fn shadowed(&self) -> usize {
        self.shadowed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Tags the entry of every successor block: the first successor of each
/// terminator is `Common`, the rest are `Inhibit`.
pub fn classify_branches(routine: &Routine) -> PendingBranches {
    let mut pending = PendingBranches::new();

    for block in routine.blocks() {
        for (index, succ) in block.terminator.successors().into_iter().enumerate() {
            let tag = BranchTag::for_successor(index);
            if !pending.register(succ, tag) {
                trace!(from = %block.id, to = %succ, %tag, "successor already tagged");
            }
        }
    }

    pending
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{InstBuilder, ModuleBuilder};
    use crate::instructions::IntPredicate;
    use crate::types::Type;
    use crate::values::{Constant, ValueId};

    #[test]
    fn first_successor_is_common() {
        let mut mb = ModuleBuilder::new();
        let mut rb = mb.routine("f");
        let a = rb.param("a", Type::I32);
        let then_b = rb.create_block("then");
        let else_b = rb.create_block("else");
        {
            let mut entry = rb.entry_block();
            let c = entry.icmp("c", IntPredicate::Eq, a, ValueId::int(0));
            entry.branch(c, then_b, else_b).unwrap();
        }
        rb.block(then_b).unwrap().ret(None).unwrap();
        rb.block(else_b).unwrap().ret(None).unwrap();
        rb.build().unwrap();
        let module = mb.finish();

        let pending = classify_branches(module.routine("f").unwrap());
        assert_eq!(pending.peek(then_b), Some(BranchTag::Common));
        assert_eq!(pending.peek(else_b), Some(BranchTag::Inhibit));
        assert_eq!(pending.peek(BlockId(0)), None);
        assert_eq!(pending.len(), 2);
    }

    #[test]
    fn every_switch_case_after_default_is_inhibit() {
        let mut mb = ModuleBuilder::new();
        let mut rb = mb.routine("sw");
        let v = rb.param("v", Type::I32);
        let d = rb.create_block("default");
        let c1 = rb.create_block("one");
        let c2 = rb.create_block("two");
        rb.entry_block()
            .switch(v, d, vec![(Constant::Int(1), c1), (Constant::Int(2), c2)])
            .unwrap();
        for b in [d, c1, c2] {
            rb.block(b).unwrap().ret(None).unwrap();
        }
        rb.build().unwrap();
        let module = mb.finish();

        let pending = classify_branches(module.routine("sw").unwrap());
        let tags: Vec<_> = pending.remaining().map(|e| (e.block, e.tag)).collect();
        assert_eq!(
            tags,
            vec![
                (d, BranchTag::Common),
                (c1, BranchTag::Inhibit),
                (c2, BranchTag::Inhibit)
            ]
        );
    }

    #[test]
    fn claims_are_one_shot() {
        let mut pending = PendingBranches::new();
        pending.register(BlockId(1), BranchTag::Inhibit);

        assert_eq!(pending.claim(BlockId(1)), Some(BranchTag::Inhibit));
        assert_eq!(pending.claim(BlockId(1)), None);
        assert!(pending.is_empty());
    }

    #[test]
    fn first_registration_wins() {
        let mut pending = PendingBranches::new();
        assert!(pending.register(BlockId(4), BranchTag::Common));
        assert!(!pending.register(BlockId(4), BranchTag::Inhibit));

        assert_eq!(pending.peek(BlockId(4)), Some(BranchTag::Common));
        assert_eq!(pending.shadowed(), 1);
    }

    #[test]
    fn terminators_without_successors_contribute_nothing() {
        let mut mb = ModuleBuilder::new();
        let mut rb = mb.routine("leaf");
        rb.entry_block().unreachable().unwrap();
        rb.build().unwrap();
        let module = mb.finish();

        assert!(classify_branches(module.routine("leaf").unwrap()).is_empty());
    }
}
