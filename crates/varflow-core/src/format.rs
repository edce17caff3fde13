use crate::{
    block::{BasicBlock, Terminator},
    describe::ValueNames,
    instructions::{Callee, Instruction},
    module::Module,
    routine::Routine,
    values::ValueId,
};
use std::fmt::{self, Write};

pub fn format_module(module: &Module) -> String {
    module.to_string()
}

pub fn format_routine(module: &Module, routine: &Routine) -> String {
    let mut output = String::new();
    // Writing into a String cannot fail.
    let _ = write_routine(&mut output, module, routine);
    output
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for name in self.globals.keys() {
            writeln!(f, "global @{}", name)?;
        }
        if !self.globals.is_empty() {
            writeln!(f)?;
        }

        for (i, routine) in self.routines.values().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write_routine(f, self, routine)?;
        }
        Ok(())
    }
}

pub fn write_routine<W: Write>(out: &mut W, module: &Module, routine: &Routine) -> fmt::Result {
    let names = ValueNames::new(module, routine);

    let keyword = if routine.is_declaration() {
        "declare"
    } else {
        "routine"
    };
    write!(out, "{} @{}(", keyword, routine.name)?;
    for (i, param) in routine.params.iter().enumerate() {
        if i > 0 {
            write!(out, ", ")?;
        }
        if routine.is_declaration() {
            write!(out, "{}", param.param_type)?;
        } else {
            let value = routine.param_value(i).unwrap_or(ValueId::int(0));
            write!(out, "{}: {}", names.operand(value), param.param_type)?;
        }
    }
    write!(out, ")")?;
    if !routine.returns.is_void() {
        write!(out, " -> {}", routine.returns)?;
    }

    let Some(body) = &routine.body else {
        return writeln!(out);
    };

    writeln!(out, " {{")?;
    for block in body.blocks.values() {
        write_block(out, &names, routine, block)?;
    }
    writeln!(out, "}}")
}

fn write_block<W: Write>(
    out: &mut W,
    names: &ValueNames<'_>,
    routine: &Routine,
    block: &BasicBlock,
) -> fmt::Result {
    writeln!(out, "{}:", block.name())?;
    for inst in &block.instructions {
        write!(out, "    ")?;
        write_instruction(out, names, routine, inst)?;
        writeln!(out)?;
    }
    write!(out, "    ")?;
    write_terminator(out, names, routine, &block.terminator)?;
    writeln!(out)
}

pub fn write_instruction<W: Write>(
    out: &mut W,
    names: &ValueNames<'_>,
    routine: &Routine,
    inst: &Instruction,
) -> fmt::Result {
    let op = |v: &ValueId| names.operand(*v);

    if inst.has_result() {
        write!(out, "{} = ", names.operand(inst.value()))?;
    }

    match inst {
        Instruction::Alloca { ty, .. } => write!(out, "alloca {}", ty),
        Instruction::Load { address, ty, .. } => write!(out, "load {}, {}", ty, op(address)),
        Instruction::Store { address, value, .. } => {
            write!(out, "store {}, {}", op(value), op(address))
        }
        Instruction::Binary {
            op: bin, left, right, ..
        } => write!(out, "{} {}, {}", bin.mnemonic(), op(left), op(right)),
        Instruction::Call {
            callee, args, ty, ..
        } => {
            let target = match callee {
                Callee::Direct(name) => format!("@{}", name),
                Callee::Indirect(value) => op(value),
            };
            let args: Vec<_> = args.iter().map(op).collect();
            write!(out, "call {} {}({})", ty, target, args.join(", "))
        }
        Instruction::Compare {
            pred, left, right, ..
        } => write!(out, "icmp {} {}, {}", pred.mnemonic(), op(left), op(right)),
        Instruction::Cast {
            op: cast,
            value,
            ty,
            ..
        } => write!(out, "{} {} to {}", cast.mnemonic(), op(value), ty),
        Instruction::Phi { incoming, ty, .. } => {
            let arms: Vec<_> = incoming
                .iter()
                .map(|(value, block)| {
                    let label = routine
                        .block(*block)
                        .map(BasicBlock::name)
                        .unwrap_or_else(|| block.to_string());
                    format!("[{}, {}]", op(value), label)
                })
                .collect();
            write!(out, "phi {} {}", ty, arms.join(", "))
        }
    }
}

fn write_terminator<W: Write>(
    out: &mut W,
    names: &ValueNames<'_>,
    routine: &Routine,
    term: &Terminator,
) -> fmt::Result {
    let label = |id| {
        routine
            .block(id)
            .map(BasicBlock::name)
            .unwrap_or_else(|| id.to_string())
    };

    match term {
        Terminator::Jump(target) => write!(out, "jump {}", label(*target)),
        Terminator::Branch {
            condition,
            then_block,
            else_block,
        } => write!(
            out,
            "br {}, {}, {}",
            names.operand(*condition),
            label(*then_block),
            label(*else_block)
        ),
        Terminator::Switch {
            value,
            default,
            cases,
        } => {
            let cases: Vec<_> = cases
                .iter()
                .map(|(c, block)| format!("{}: {}", c, label(*block)))
                .collect();
            write!(
                out,
                "switch {}, {} [{}]",
                names.operand(*value),
                label(*default),
                cases.join(", ")
            )
        }
        Terminator::Return(Some(value)) => write!(out, "ret {}", names.operand(*value)),
        Terminator::Return(None) => write!(out, "ret"),
        Terminator::Unreachable => write!(out, "unreachable"),
        Terminator::Invalid => write!(out, "; missing terminator"),
    }
}
