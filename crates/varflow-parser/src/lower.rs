use crate::{ParseError, Rule};
use pest::error::{Error as PestError, ErrorVariant};
use pest::iterators::{Pair, Pairs};
use std::collections::HashMap;
use varflow_core::{
    BinaryOp, BlockId, Callee, CastOp, Constant, Instruction, InstId, IntPredicate, Module,
    Parameter, Routine, RoutineBody, Terminator, Type, ValueId,
};

type Result<T> = std::result::Result<T, ParseError>;

/// Builds a module from a parsed `module` pair.
///
/// Globals come first, then every routine signature, then bodies, so
/// references may point forward anywhere in the file.
pub(crate) fn lower_module(pair: Pair<'_, Rule>) -> Result<Module> {
    let items: Vec<_> = pair
        .into_inner()
        .filter(|p| p.as_rule() != Rule::EOI)
        .collect();
    let mut module = Module::new();

    for item in items.iter().filter(|p| p.as_rule() == Rule::global_decl) {
        let name = ref_name(&next(&mut item.clone().into_inner(), "global name")?);
        module
            .add_global(name)
            .map_err(|_| ParseError::DuplicateName {
                scope: "module".to_string(),
                name: format!("@{}", name),
            })?;
    }

    let mut bodies = Vec::new();
    for item in &items {
        let (routine, blocks) = match item.as_rule() {
            Rule::declare_decl => (lower_signature(&module, item.clone())?, Vec::new()),
            Rule::routine_def => {
                let routine = lower_signature(&module, item.clone())?;
                let blocks: Vec<_> = item
                    .clone()
                    .into_inner()
                    .filter(|p| p.as_rule() == Rule::block)
                    .collect();
                (routine, blocks)
            }
            _ => continue,
        };

        let name = routine.name.clone();
        if !blocks.is_empty() {
            bodies.push((name.clone(), blocks));
        }
        module
            .add_routine(routine)
            .map_err(|_| ParseError::DuplicateRoutine(name))?;
    }

    for (name, blocks) in bodies {
        let body = match module.routine(&name) {
            Some(routine) => BodyLowering::new(&module, routine).lower(blocks)?,
            None => continue,
        };
        if let Some(routine) = module.routines.get_mut(&name) {
            routine.body = Some(body);
        }
    }

    Ok(module)
}

fn lower_signature(module: &Module, pair: Pair<'_, Rule>) -> Result<Routine> {
    let mut inner = pair.into_inner();
    let name = ref_name(&next(&mut inner, "routine name")?);
    let mut routine = Routine::new(module.next_routine_id(), name);

    for part in inner {
        match part.as_rule() {
            Rule::type_list => {
                for (i, ty) in part.into_inner().enumerate() {
                    routine
                        .params
                        .push(Parameter::new(format!("arg{}", i), lower_type(&ty)?));
                }
            }
            Rule::param_list => {
                for param in part.into_inner() {
                    let mut fields = param.into_inner();
                    let local = next(&mut fields, "parameter name")?;
                    let ty = lower_type(&next(&mut fields, "parameter type")?)?;
                    let param_name = ref_name(&local);
                    if routine.params.iter().any(|p| p.name == param_name) {
                        return Err(ParseError::DuplicateName {
                            scope: format!("@{}", routine.name),
                            name: format!("%{}", param_name),
                        });
                    }
                    routine.params.push(Parameter::new(param_name, ty));
                }
            }
            Rule::return_type => {
                routine.returns = lower_type(&next(&mut part.into_inner(), "return type")?)?;
            }
            _ => {}
        }
    }

    Ok(routine)
}

/// Lowers one routine body in two passes: the first assigns ids to every
/// label and instruction, the second builds instructions and terminators.
struct BodyLowering<'m> {
    module: &'m Module,
    routine: &'m Routine,
    body: RoutineBody,
    values: HashMap<String, ValueId>,
    labels: HashMap<String, BlockId>,
}

impl<'m> BodyLowering<'m> {
    fn new(module: &'m Module, routine: &'m Routine) -> Self {
        let values = routine
            .params
            .iter()
            .zip(routine.param_values())
            .map(|(param, value)| (param.name.clone(), value))
            .collect();

        Self {
            module,
            routine,
            body: RoutineBody::new(),
            values,
            labels: HashMap::new(),
        }
    }

    fn lower(mut self, blocks: Vec<Pair<'_, Rule>>) -> Result<RoutineBody> {
        let mut layout = Vec::with_capacity(blocks.len());
        for (i, block) in blocks.iter().enumerate() {
            layout.push(self.declare_block(i, block.clone())?);
        }

        for (block, (block_id, inst_ids)) in blocks.into_iter().zip(layout) {
            self.define_block(block, block_id, inst_ids)?;
        }

        Ok(self.body)
    }

    fn declare_block(
        &mut self,
        index: usize,
        block: Pair<'_, Rule>,
    ) -> Result<(BlockId, Vec<InstId>)> {
        let mut inner = block.into_inner();
        let label = next(&mut inner, "block label")?.as_str().to_string();

        let id = if index == 0 {
            self.body.entry_block()
        } else {
            self.body.create_block()
        };
        if self.labels.insert(label.clone(), id).is_some() {
            return Err(self.duplicate(label));
        }
        if let Some(bb) = self.body.get_block_mut(id) {
            bb.label = Some(label);
        }

        let mut inst_ids = Vec::new();
        for inst in inner.filter(|p| p.as_rule() == Rule::instruction) {
            let inst_id = self.body.next_inst();
            let form = next(&mut inst.into_inner(), "instruction")?;
            if form.as_rule() == Rule::assign {
                let result = next(&mut form.into_inner(), "result name")?;
                let name = ref_name(&result);
                if self
                    .values
                    .insert(name.to_string(), ValueId::Inst(inst_id))
                    .is_some()
                {
                    return Err(self.duplicate(format!("%{}", name)));
                }
                // `%7` spells an unnamed value.
                if !name.bytes().all(|b| b.is_ascii_digit()) {
                    self.body.name_inst(inst_id, name);
                }
            }
            inst_ids.push(inst_id);
        }

        Ok((id, inst_ids))
    }

    fn define_block(
        &mut self,
        block: Pair<'_, Rule>,
        id: BlockId,
        inst_ids: Vec<InstId>,
    ) -> Result<()> {
        let mut instructions = Vec::with_capacity(inst_ids.len());
        let mut terminator = Terminator::Invalid;
        let mut ids = inst_ids.into_iter();

        for part in block.into_inner() {
            match part.as_rule() {
                Rule::instruction => {
                    let inst_id = ids.next().ok_or(ParseError::Malformed("instruction id"))?;
                    instructions.push(self.instruction(inst_id, part)?);
                }
                Rule::terminator => terminator = self.terminator(part)?,
                _ => {}
            }
        }

        if let Some(bb) = self.body.get_block_mut(id) {
            bb.instructions = instructions;
            bb.terminator = terminator;
        }
        Ok(())
    }

    fn instruction(&self, id: InstId, pair: Pair<'_, Rule>) -> Result<Instruction> {
        let form = next(&mut pair.into_inner(), "instruction")?;
        match form.as_rule() {
            Rule::store_inst => {
                let mut inner = form.into_inner();
                let value = self.operand(next(&mut inner, "stored value")?)?;
                let address = self.operand(next(&mut inner, "store address")?)?;
                Ok(Instruction::Store { id, address, value })
            }
            Rule::call => self.call(id, form),
            Rule::assign => {
                let mut inner = form.into_inner();
                let _result = next(&mut inner, "result name")?;
                self.assignment(id, next(&mut inner, "right-hand side")?)
            }
            _ => Err(ParseError::Malformed("instruction")),
        }
    }

    fn assignment(&self, result: InstId, rhs: Pair<'_, Rule>) -> Result<Instruction> {
        let rule = rhs.as_rule();
        if rule == Rule::call {
            return self.call(result, rhs);
        }

        let mut inner = rhs.into_inner();
        let inst = match rule {
            Rule::alloca => Instruction::Alloca {
                result,
                ty: lower_type(&next(&mut inner, "type")?)?,
            },
            Rule::load => {
                let ty = lower_type(&next(&mut inner, "type")?)?;
                let address = self.operand(next(&mut inner, "address")?)?;
                Instruction::Load {
                    result,
                    address,
                    ty,
                }
            }
            Rule::binary => {
                let op_pair = next(&mut inner, "opcode")?;
                let op = BinaryOp::from_mnemonic(op_pair.as_str())
                    .ok_or_else(|| custom(&op_pair, "unknown binary operator"))?;
                let left = self.operand(next(&mut inner, "left operand")?)?;
                let right = self.operand(next(&mut inner, "right operand")?)?;
                Instruction::Binary {
                    result,
                    op,
                    left,
                    right,
                }
            }
            Rule::icmp => {
                let pred_pair = next(&mut inner, "predicate")?;
                let pred = IntPredicate::from_mnemonic(pred_pair.as_str())
                    .ok_or_else(|| custom(&pred_pair, "unknown predicate"))?;
                let left = self.operand(next(&mut inner, "left operand")?)?;
                let right = self.operand(next(&mut inner, "right operand")?)?;
                Instruction::Compare {
                    result,
                    pred,
                    left,
                    right,
                }
            }
            Rule::cast => {
                let op_pair = next(&mut inner, "cast opcode")?;
                let op = CastOp::from_mnemonic(op_pair.as_str())
                    .ok_or_else(|| custom(&op_pair, "unknown cast"))?;
                let value = self.operand(next(&mut inner, "cast operand")?)?;
                let ty = lower_type(&next(&mut inner, "cast type")?)?;
                Instruction::Cast {
                    result,
                    op,
                    value,
                    ty,
                }
            }
            Rule::phi => {
                let ty = lower_type(&next(&mut inner, "type")?)?;
                let mut incoming = Vec::new();
                for arm in inner {
                    let mut fields = arm.into_inner();
                    let value = self.operand(next(&mut fields, "incoming value")?)?;
                    let block = self.block(next(&mut fields, "incoming block")?.as_str())?;
                    incoming.push((value, block));
                }
                Instruction::Phi {
                    result,
                    incoming,
                    ty,
                }
            }
            _ => return Err(ParseError::Malformed("instruction body")),
        };
        Ok(inst)
    }

    fn call(&self, result: InstId, pair: Pair<'_, Rule>) -> Result<Instruction> {
        let mut inner = pair.into_inner();
        let ty = lower_type(&next(&mut inner, "call type")?)?;

        let target = next(&mut next(&mut inner, "callee")?.into_inner(), "callee")?;
        let callee = match target.as_rule() {
            Rule::global_ref => Callee::Direct(ref_name(&target).to_string()),
            _ => Callee::Indirect(self.local(ref_name(&target))?),
        };

        let mut args = Vec::new();
        if let Some(list) = inner.next() {
            for arg in list.into_inner() {
                args.push(self.operand(arg)?);
            }
        }

        Ok(Instruction::Call {
            result,
            callee,
            args,
            ty,
        })
    }

    fn terminator(&self, pair: Pair<'_, Rule>) -> Result<Terminator> {
        let form = next(&mut pair.into_inner(), "terminator")?;
        let rule = form.as_rule();
        let mut inner = form.into_inner();

        let term = match rule {
            Rule::ret => match inner.next() {
                Some(value) => Terminator::Return(Some(self.operand(value)?)),
                None => Terminator::Return(None),
            },
            Rule::br => {
                let condition = self.operand(next(&mut inner, "condition")?)?;
                let then_block = self.block(next(&mut inner, "then label")?.as_str())?;
                let else_block = self.block(next(&mut inner, "else label")?.as_str())?;
                Terminator::Branch {
                    condition,
                    then_block,
                    else_block,
                }
            }
            Rule::jump => Terminator::Jump(self.block(next(&mut inner, "jump label")?.as_str())?),
            Rule::switch => {
                let value = self.operand(next(&mut inner, "switch value")?)?;
                let default = self.block(next(&mut inner, "default label")?.as_str())?;
                let mut cases = Vec::new();
                for case in inner {
                    let mut fields = case.into_inner();
                    let constant = lower_constant(next(&mut fields, "case value")?)?;
                    let target = self.block(next(&mut fields, "case label")?.as_str())?;
                    cases.push((constant, target));
                }
                Terminator::Switch {
                    value,
                    default,
                    cases,
                }
            }
            Rule::unreachable => Terminator::Unreachable,
            _ => return Err(ParseError::Malformed("terminator")),
        };
        Ok(term)
    }

    fn operand(&self, pair: Pair<'_, Rule>) -> Result<ValueId> {
        let value = next(&mut pair.into_inner(), "operand")?;
        match value.as_rule() {
            Rule::local_ref => self.local(ref_name(&value)),
            Rule::global_ref => {
                let name = ref_name(&value);
                self.module
                    .global(name)
                    .map(ValueId::Global)
                    .ok_or_else(|| ParseError::UndefinedValue {
                        routine: self.routine.name.clone(),
                        name: format!("@{}", name),
                    })
            }
            _ => lower_constant(value).map(ValueId::Const),
        }
    }

    fn local(&self, name: &str) -> Result<ValueId> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| ParseError::UndefinedValue {
                routine: self.routine.name.clone(),
                name: format!("%{}", name),
            })
    }

    fn block(&self, label: &str) -> Result<BlockId> {
        self.labels
            .get(label)
            .copied()
            .ok_or_else(|| ParseError::UndefinedBlock {
                routine: self.routine.name.clone(),
                label: label.to_string(),
            })
    }

    fn duplicate(&self, name: String) -> ParseError {
        ParseError::DuplicateName {
            scope: format!("@{}", self.routine.name),
            name,
        }
    }
}

fn lower_constant(pair: Pair<'_, Rule>) -> Result<Constant> {
    let literal = next(&mut pair.into_inner(), "literal")?;
    match literal.as_rule() {
        Rule::bool_lit => Ok(Constant::Bool(literal.as_str() == "true")),
        Rule::null_lit => Ok(Constant::Null),
        _ => literal
            .as_str()
            .parse::<i64>()
            .map(Constant::Int)
            .map_err(|e| custom(&literal, &format!("invalid integer: {}", e))),
    }
}

fn lower_type(pair: &Pair<'_, Rule>) -> Result<Type> {
    pair.as_str()
        .parse::<Type>()
        .map_err(|message| custom(pair, &message))
}

/// Name behind a `%name` or `@name` reference.
fn ref_name<'i>(pair: &Pair<'i, Rule>) -> &'i str {
    let text = pair.as_str();
    text.get(1..).unwrap_or(text)
}

fn next<'i>(pairs: &mut Pairs<'i, Rule>, what: &'static str) -> Result<Pair<'i, Rule>> {
    pairs.next().ok_or(ParseError::Malformed(what))
}

fn custom(pair: &Pair<'_, Rule>, message: &str) -> ParseError {
    ParseError::Syntax(Box::new(PestError::new_from_span(
        ErrorVariant::CustomError {
            message: message.to_string(),
        },
        pair.as_span(),
    )))
}
