use super::inst_builder::InstBuilder;
use crate::{
    block::{BlockId, Terminator},
    instructions::Instruction,
    routine::RoutineBody,
    values::{Constant, InstId, ValueId},
    IrError, Result,
};

/// Appends instructions to one block of a routine under construction.
pub struct BlockBuilder<'a> {
    block_id: BlockId,
    body: &'a mut RoutineBody,
}

impl<'a> BlockBuilder<'a> {
    pub(crate) fn new(block_id: BlockId, body: &'a mut RoutineBody) -> Self {
        Self { block_id, body }
    }

    pub fn block_id(&self) -> BlockId {
        self.block_id
    }

    pub fn is_terminated(&self) -> bool {
        self.body
            .get_block(self.block_id)
            .map(|block| block.is_terminated())
            .unwrap_or(false)
    }

    pub fn jump(&mut self, target: BlockId) -> Result<()> {
        self.terminate(Terminator::Jump(target))
    }

    pub fn branch(
        &mut self,
        condition: ValueId,
        then_block: BlockId,
        else_block: BlockId,
    ) -> Result<()> {
        self.terminate(Terminator::Branch {
            condition,
            then_block,
            else_block,
        })
    }

    pub fn switch(
        &mut self,
        value: ValueId,
        default: BlockId,
        cases: Vec<(Constant, BlockId)>,
    ) -> Result<()> {
        self.terminate(Terminator::Switch {
            value,
            default,
            cases,
        })
    }

    pub fn ret(&mut self, value: Option<ValueId>) -> Result<()> {
        self.terminate(Terminator::Return(value))
    }

    pub fn unreachable(&mut self) -> Result<()> {
        self.terminate(Terminator::Unreachable)
    }

    fn terminate(&mut self, term: Terminator) -> Result<()> {
        let block_id = self.block_id;
        let block = self
            .body
            .get_block_mut(block_id)
            .ok_or(IrError::UnknownBlock(block_id))?;

        if block.is_terminated() {
            return Err(IrError::BuilderError(format!(
                "{} already has a terminator",
                block_id
            )));
        }

        block.set_terminator(term);
        Ok(())
    }
}

impl InstBuilder for BlockBuilder<'_> {
    fn append<F>(&mut self, name: &str, make: F) -> ValueId
    where
        F: FnOnce(InstId) -> Instruction,
    {
        let id = self.body.next_inst();
        self.body.name_inst(id, name);
        if let Some(block) = self.body.get_block_mut(self.block_id) {
            block.add_instruction(make(id));
        }
        ValueId::Inst(id)
    }
}
