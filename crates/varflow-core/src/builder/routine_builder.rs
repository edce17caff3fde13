use super::BlockBuilder;
use crate::{
    block::{BasicBlock, BlockId},
    module::Module,
    routine::{Parameter, Routine, RoutineBody},
    types::Type,
    values::{ParamId, RoutineId, ValueId},
    IrError, Result,
};

pub struct RoutineBuilder<'m> {
    module: &'m mut Module,
    routine: Routine,
    body: RoutineBody,
}

impl<'m> RoutineBuilder<'m> {
    pub(crate) fn new(module: &'m mut Module, name: &str) -> Self {
        let routine = Routine::new(module.next_routine_id(), name);
        let mut body = RoutineBody::new();
        let entry = body.entry_block();
        body.blocks
            .insert(entry, BasicBlock::with_label(entry, "entry"));

        Self {
            module,
            routine,
            body,
        }
    }

    pub fn id(&self) -> RoutineId {
        self.routine.id
    }

    pub fn param(&mut self, name: &str, ty: Type) -> ValueId {
        let index = self.routine.params.len() as u32;
        self.routine.params.push(Parameter::new(name, ty));
        ValueId::Param(ParamId {
            routine: self.routine.id,
            index,
        })
    }

    pub fn returns(&mut self, ty: Type) -> &mut Self {
        self.routine.returns = ty;
        self
    }

    pub fn create_block(&mut self, label: &str) -> BlockId {
        let id = self.body.create_block();
        if let Some(block) = self.body.get_block_mut(id) {
            block.label = Some(label.to_string());
        }
        id
    }

    pub fn entry_block(&mut self) -> BlockBuilder<'_> {
        let entry = self.body.entry_block();
        BlockBuilder::new(entry, &mut self.body)
    }

    pub fn block(&mut self, id: BlockId) -> Result<BlockBuilder<'_>> {
        if self.body.get_block(id).is_none() {
            return Err(IrError::UnknownBlock(id));
        }
        Ok(BlockBuilder::new(id, &mut self.body))
    }

    /// Registers the routine with its module. Every block must be terminated.
    pub fn build(self) -> Result<RoutineId> {
        if let Some(open) = self.body.blocks.values().find(|b| !b.is_terminated()) {
            return Err(IrError::BuilderError(format!(
                "block `{}` of @{} has no terminator",
                open.name(),
                self.routine.name
            )));
        }

        let mut routine = self.routine;
        routine.body = Some(self.body);
        self.module.add_routine(routine)
    }
}
