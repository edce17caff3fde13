use crate::block::{BasicBlock, BlockId};
use crate::instructions::Instruction;
use crate::types::Type;
use crate::values::{InstId, ParamId, RoutineId, ValueId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    pub id: RoutineId,
    pub name: String,
    pub params: Vec<Parameter>,
    pub returns: Type,
    /// `None` for external declarations.
    pub body: Option<RoutineBody>,
}

impl Routine {
    pub fn new(id: RoutineId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            params: Vec::new(),
            returns: Type::Void,
            body: None,
        }
    }

    pub fn is_declaration(&self) -> bool {
        self.body.is_none()
    }

    pub fn param_value(&self, index: usize) -> Option<ValueId> {
        (index < self.params.len()).then(|| {
            ValueId::Param(ParamId {
                routine: self.id,
                index: index as u32,
            })
        })
    }

    /// Formal parameter identities, in declaration order.
    pub fn param_values(&self) -> Vec<ValueId> {
        (0..self.params.len() as u32)
            .map(|index| {
                ValueId::Param(ParamId {
                    routine: self.id,
                    index,
                })
            })
            .collect()
    }

    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock> {
        self.body.iter().flat_map(|body| body.blocks.values())
    }

    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.body.as_ref().and_then(|body| body.blocks.get(&id))
    }

    pub fn instructions(&self) -> impl Iterator<Item = (BlockId, &Instruction)> {
        self.blocks()
            .flat_map(|block| block.instructions.iter().map(move |inst| (block.id, inst)))
    }

    pub fn instruction(&self, id: InstId) -> Option<&Instruction> {
        self.instructions()
            .map(|(_, inst)| inst)
            .find(|inst| inst.id() == id)
    }

    pub fn inst_name(&self, id: InstId) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|body| body.inst_names.get(&id))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub param_type: Type,
}

impl Parameter {
    pub fn new(name: impl Into<String>, param_type: Type) -> Self {
        Self {
            name: name.into(),
            param_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineBody {
    pub entry_block: BlockId,
    /// Program order is insertion order.
    pub blocks: IndexMap<BlockId, BasicBlock>,
    pub inst_names: IndexMap<InstId, String>,
    next_block_id: u32,
    next_inst_id: u32,
}

impl RoutineBody {
    pub fn new() -> Self {
        let entry_block = BlockId(0);
        let mut blocks = IndexMap::new();
        blocks.insert(entry_block, BasicBlock::new(entry_block));

        Self {
            entry_block,
            blocks,
            inst_names: IndexMap::new(),
            next_block_id: 1,
            next_inst_id: 0,
        }
    }

    pub fn create_block(&mut self) -> BlockId {
        let id = BlockId(self.next_block_id);
        self.next_block_id += 1;
        self.blocks.insert(id, BasicBlock::new(id));
        id
    }

    pub fn next_inst(&mut self) -> InstId {
        let id = InstId(self.next_inst_id);
        self.next_inst_id += 1;
        id
    }

    pub fn name_inst(&mut self, id: InstId, name: impl Into<String>) {
        let name = name.into();
        if !name.is_empty() {
            self.inst_names.insert(id, name);
        }
    }

    pub fn get_block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(&id)
    }

    pub fn get_block_mut(&mut self, id: BlockId) -> Option<&mut BasicBlock> {
        self.blocks.get_mut(&id)
    }

    pub fn entry_block(&self) -> BlockId {
        self.entry_block
    }
}

impl Default for RoutineBody {
    fn default() -> Self {
        Self::new()
    }
}
