use crate::instructions::Callee;
use crate::routine::Routine;
use crate::values::{GlobalId, RoutineId};
use crate::{IrError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A translation unit: named globals plus every routine, in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub globals: IndexMap<String, GlobalId>,
    pub routines: IndexMap<String, Routine>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_routine_id(&self) -> RoutineId {
        RoutineId(self.routines.len() as u32)
    }

    pub fn add_routine(&mut self, routine: Routine) -> Result<RoutineId> {
        if self.routines.contains_key(&routine.name) {
            return Err(IrError::DuplicateRoutine(routine.name));
        }
        let id = routine.id;
        self.routines.insert(routine.name.clone(), routine);
        Ok(id)
    }

    pub fn add_global(&mut self, name: impl Into<String>) -> Result<GlobalId> {
        let name = name.into();
        if self.globals.contains_key(&name) {
            return Err(IrError::DuplicateGlobal(name));
        }
        let id = GlobalId(self.globals.len() as u32);
        self.globals.insert(name, id);
        Ok(id)
    }

    pub fn global(&self, name: &str) -> Option<GlobalId> {
        self.globals.get(name).copied()
    }

    pub fn global_name(&self, id: GlobalId) -> Option<&str> {
        self.globals
            .iter()
            .find(|(_, g)| **g == id)
            .map(|(name, _)| name.as_str())
    }

    pub fn routine(&self, name: &str) -> Option<&Routine> {
        self.routines.get(name)
    }

    pub fn routine_by_id(&self, id: RoutineId) -> Option<&Routine> {
        self.routines.values().find(|r| r.id == id)
    }

    /// Statically known call target. Indirect calls never resolve.
    pub fn resolve(&self, callee: &Callee) -> Option<&Routine> {
        match callee {
            Callee::Direct(name) => self.routine(name),
            Callee::Indirect(_) => None,
        }
    }

    pub fn defined_routines(&self) -> impl Iterator<Item = &Routine> {
        self.routines.values().filter(|r| !r.is_declaration())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::ValueId;

    #[test]
    fn rejects_duplicate_routines() {
        let mut module = Module::new();
        let id = module.next_routine_id();
        module.add_routine(Routine::new(id, "f")).unwrap();
        let err = module.add_routine(Routine::new(RoutineId(1), "f"));
        assert!(matches!(err, Err(IrError::DuplicateRoutine(name)) if name == "f"));
    }

    #[test]
    fn resolves_only_direct_callees() {
        let mut module = Module::new();
        module.add_routine(Routine::new(RoutineId(0), "g")).unwrap();

        assert!(module.resolve(&Callee::Direct("g".into())).is_some());
        assert!(module.resolve(&Callee::Direct("missing".into())).is_none());
        assert!(module.resolve(&Callee::Indirect(ValueId::int(0))).is_none());
    }

    #[test]
    fn globals_are_numbered_in_order() {
        let mut module = Module::new();
        assert_eq!(module.add_global("a").unwrap(), GlobalId(0));
        assert_eq!(module.add_global("b").unwrap(), GlobalId(1));
        assert_eq!(module.global_name(GlobalId(1)), Some("b"));
        assert!(module.add_global("a").is_err());
    }
}
