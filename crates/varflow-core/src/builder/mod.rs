/*! Fluent API for constructing IR programmatically.
 *
 * Wiring blocks, instruction ids and value names by hand is tedious. These builders allocate ids,
 * record source names and check that every block ends in a terminator.
 */

pub mod block_builder;
pub mod inst_builder;
pub mod routine_builder;

pub use block_builder::BlockBuilder;
pub use inst_builder::InstBuilder;
pub use routine_builder::RoutineBuilder;

use crate::{
    module::Module,
    routine::{Parameter, Routine},
    types::Type,
    values::{RoutineId, ValueId},
    Result,
};

#[derive(Debug, Default)]
pub struct ModuleBuilder {
    module: Module,
}

impl ModuleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global(&mut self, name: &str) -> Result<ValueId> {
        self.module.add_global(name).map(ValueId::Global)
    }

    pub fn routine(&mut self, name: &str) -> RoutineBuilder<'_> {
        RoutineBuilder::new(&mut self.module, name)
    }

    /// Adds an external routine: a signature without a body.
    pub fn declare(&mut self, name: &str, params: &[Type], returns: Type) -> Result<RoutineId> {
        let mut routine = Routine::new(self.module.next_routine_id(), name);
        routine.params = params
            .iter()
            .enumerate()
            .map(|(i, ty)| Parameter::new(format!("arg{}", i), *ty))
            .collect();
        routine.returns = returns;
        self.module.add_routine(routine)
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn finish(self) -> Module {
        self.module
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IrError;

    #[test]
    fn unterminated_blocks_are_rejected() {
        let mut mb = ModuleBuilder::new();
        let mut rb = mb.routine("open");
        let mut entry = rb.entry_block();
        entry.alloca("x", Type::I32);

        let err = rb.build().unwrap_err();
        assert!(matches!(err, IrError::BuilderError(msg) if msg.contains("entry")));
        assert!(mb.module().routine("open").is_none());
    }

    #[test]
    fn blocks_cannot_be_terminated_twice() {
        let mut mb = ModuleBuilder::new();
        let mut rb = mb.routine("twice");
        let mut entry = rb.entry_block();
        entry.ret(None).unwrap();
        assert!(entry.ret(None).is_err());
    }

    #[test]
    fn declarations_get_positional_parameter_names() {
        let mut mb = ModuleBuilder::new();
        mb.declare("sink", &[Type::I32, Type::Ptr], Type::Void)
            .unwrap();
        let module = mb.finish();

        let sink = module.routine("sink").unwrap();
        assert!(sink.is_declaration());
        assert_eq!(sink.params[1].name, "arg1");
        assert_eq!(sink.params[1].param_type, Type::Ptr);
    }

    #[test]
    fn blocks_keep_creation_order() {
        let mut mb = ModuleBuilder::new();
        let mut rb = mb.routine("order");
        let b1 = rb.create_block("first");
        let b2 = rb.create_block("second");
        rb.entry_block().jump(b1).unwrap();
        rb.block(b1).unwrap().jump(b2).unwrap();
        rb.block(b2).unwrap().ret(None).unwrap();
        rb.build().unwrap();

        let module = mb.finish();
        let labels: Vec<_> = module
            .routine("order")
            .unwrap()
            .blocks()
            .map(|b| b.name())
            .collect();
        assert_eq!(labels, vec!["entry", "first", "second"]);
    }
}
