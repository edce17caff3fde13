use crate::module::Module;
use crate::routine::Routine;
use crate::values::ValueId;

/// Human-readable naming for values.
///
/// Used to label variables and edges and to print diagnostics. Nothing in the
/// analysis compares these strings.
pub trait Describe {
    /// Short source name, empty when the value has none.
    fn name(&self, value: ValueId) -> String;

    /// Label for a computed result: its name, or its spelling when unnamed so
    /// that unrelated temporaries never share a label.
    fn label(&self, value: ValueId) -> String {
        let name = self.name(value);
        if name.is_empty() {
            value.to_string()
        } else {
            name
        }
    }

    fn describe(&self, value: ValueId) -> String {
        let name = self.name(value);
        if name.is_empty() {
            value.to_string()
        } else {
            format!("{} ({})", name, value)
        }
    }
}

/// Names values of one routine using the names recorded in its module.
#[derive(Debug, Clone, Copy)]
pub struct ValueNames<'a> {
    module: &'a Module,
    routine: &'a Routine,
}

impl<'a> ValueNames<'a> {
    pub fn new(module: &'a Module, routine: &'a Routine) -> Self {
        Self { module, routine }
    }

    /// Operand spelling in the textual IR.
    pub fn operand(&self, value: ValueId) -> String {
        match value {
            ValueId::Inst(id) => match self.routine.inst_name(id) {
                Some(name) => format!("%{}", name),
                None => format!("%{}", id.0),
            },
            ValueId::Param(p) => {
                let name = self.name(value);
                if name.is_empty() {
                    format!("%arg{}", p.index)
                } else {
                    format!("%{}", name)
                }
            }
            ValueId::Global(g) => match self.module.global_name(g) {
                Some(name) => format!("@{}", name),
                None => format!("@{}", g),
            },
            ValueId::Const(c) => c.to_string(),
            ValueId::Synthetic(s) => format!("${}", s),
        }
    }
}

impl Describe for ValueNames<'_> {
    fn name(&self, value: ValueId) -> String {
        match value {
            ValueId::Inst(id) => self.routine.inst_name(id).unwrap_or_default().to_string(),
            ValueId::Param(p) => {
                let owner = if p.routine == self.routine.id {
                    Some(self.routine)
                } else {
                    self.module.routine_by_id(p.routine)
                };
                owner
                    .and_then(|r| r.params.get(p.index as usize))
                    .map(|param| param.name.clone())
                    .unwrap_or_default()
            }
            ValueId::Global(g) => self.module.global_name(g).unwrap_or_default().to_string(),
            ValueId::Const(_) | ValueId::Synthetic(_) => String::new(),
        }
    }

    fn label(&self, value: ValueId) -> String {
        let name = self.name(value);
        if name.is_empty() {
            self.operand(value)
        } else {
            name
        }
    }

    fn describe(&self, value: ValueId) -> String {
        match value {
            ValueId::Inst(id) => match self.routine.instruction(id) {
                Some(inst) => format!("{} = {}", self.operand(value), inst.mnemonic()),
                None => self.operand(value),
            },
            ValueId::Param(p) => {
                let owner = self
                    .module
                    .routine_by_id(p.routine)
                    .map(|r| r.name.as_str())
                    .unwrap_or(self.routine.name.as_str());
                format!("{} (arg {} of @{})", self.operand(value), p.index, owner)
            }
            ValueId::Synthetic(_) => format!("{} (synthetic)", self.operand(value)),
            _ => self.operand(value),
        }
    }
}
