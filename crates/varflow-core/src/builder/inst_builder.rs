use crate::{
    block::BlockId,
    instructions::{BinaryOp, Callee, CastOp, Instruction, IntPredicate},
    types::Type,
    values::{InstId, ValueId},
};

/// Instruction constructors shared by every builder that can append to a block.
///
/// Implementors only provide [`InstBuilder::append`]; `name` is recorded as the
/// value's source name unless it is empty.
pub trait InstBuilder {
    fn append<F>(&mut self, name: &str, make: F) -> ValueId
    where
        F: FnOnce(InstId) -> Instruction;

    fn alloca(&mut self, name: &str, ty: Type) -> ValueId {
        self.append(name, |result| Instruction::Alloca { result, ty })
    }

    fn load(&mut self, name: &str, address: ValueId, ty: Type) -> ValueId {
        self.append(name, |result| Instruction::Load {
            result,
            address,
            ty,
        })
    }

    fn store(&mut self, value: ValueId, address: ValueId) -> ValueId {
        self.append("", |id| Instruction::Store { id, address, value })
    }

    fn binary(&mut self, name: &str, op: BinaryOp, left: ValueId, right: ValueId) -> ValueId {
        self.append(name, |result| Instruction::Binary {
            result,
            op,
            left,
            right,
        })
    }

    fn add(&mut self, name: &str, left: ValueId, right: ValueId) -> ValueId {
        self.binary(name, BinaryOp::Add, left, right)
    }

    fn sub(&mut self, name: &str, left: ValueId, right: ValueId) -> ValueId {
        self.binary(name, BinaryOp::Sub, left, right)
    }

    fn mul(&mut self, name: &str, left: ValueId, right: ValueId) -> ValueId {
        self.binary(name, BinaryOp::Mul, left, right)
    }

    fn call(&mut self, name: &str, callee: &str, args: Vec<ValueId>, ty: Type) -> ValueId {
        let callee = Callee::Direct(callee.to_string());
        self.append(name, |result| Instruction::Call {
            result,
            callee,
            args,
            ty,
        })
    }

    fn call_indirect(
        &mut self,
        name: &str,
        target: ValueId,
        args: Vec<ValueId>,
        ty: Type,
    ) -> ValueId {
        self.append(name, |result| Instruction::Call {
            result,
            callee: Callee::Indirect(target),
            args,
            ty,
        })
    }

    fn icmp(&mut self, name: &str, pred: IntPredicate, left: ValueId, right: ValueId) -> ValueId {
        self.append(name, |result| Instruction::Compare {
            result,
            pred,
            left,
            right,
        })
    }

    fn cast(&mut self, name: &str, op: CastOp, value: ValueId, ty: Type) -> ValueId {
        self.append(name, |result| Instruction::Cast {
            result,
            op,
            value,
            ty,
        })
    }

    fn phi(&mut self, name: &str, incoming: Vec<(ValueId, BlockId)>, ty: Type) -> ValueId {
        self.append(name, |result| Instruction::Phi {
            result,
            incoming,
            ty,
        })
    }
}
