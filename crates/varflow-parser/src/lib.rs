/*! Parse textual IR into a varflow module.
 *
 * Writing routines by hand as text is the quickest way to pose a question to the analyzer, and the
 * printer in varflow-core emits the same syntax, so modules can be dumped, edited and read back.
 * Parsing happens in two steps: pest checks the syntax, then lowering resolves names to values and
 * blocks.
 */

use pest::Parser;
use pest_derive::Parser;
use std::path::{Path, PathBuf};
use thiserror::Error;
use varflow_core::Module;

mod lower;

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct VarflowParser;

pub type ParseResult<T> = Result<T, Box<pest::error::Error<Rule>>>;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Syntax error: {0}")]
    Syntax(#[from] Box<pest::error::Error<Rule>>),
    #[error("Undefined value {name} in @{routine}")]
    UndefinedValue { routine: String, name: String },
    #[error("Undefined block `{label}` in @{routine}")]
    UndefinedBlock { routine: String, label: String },
    #[error("Duplicate name {name} in {scope}")]
    DuplicateName { scope: String, name: String },
    #[error("Duplicate routine @{0}")]
    DuplicateRoutine(String),
    #[error("Malformed parse tree: expected {0}")]
    Malformed(&'static str),
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Syntax check only; names are not resolved.
pub fn parse(input: &str) -> ParseResult<pest::iterators::Pairs<'_, Rule>> {
    VarflowParser::parse(Rule::module, input).map_err(Box::new)
}

pub fn check(input: &str) -> bool {
    parse(input).is_ok()
}

pub fn parse_module(input: &str) -> Result<Module, ParseError> {
    let mut pairs = parse(input)?;
    let module = pairs.next().ok_or(ParseError::Malformed("module"))?;
    lower::lower_module(module)
}

pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Module, ParseError> {
    let path = path.as_ref();
    let input = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_module(&input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_module() {
        assert!(check(""));
        assert!(check("; nothing here\n"));
    }

    #[test]
    fn test_simple_routine() {
        let input = r"
routine @f(%a: i32, %b: i32) -> i32 {
entry:
    %t = add %a, %b
    ret %t
}
";
        assert!(check(input));
    }

    #[test]
    fn test_globals_and_declarations() {
        let input = r"
global @counter
declare @sink(i32, ptr) -> i32
declare @tick()
";
        match parse(input) {
            Ok(_) => {}
            Err(e) => panic!("Parse error: {}", e),
        }
    }

    #[test]
    fn test_every_instruction_form() {
        let input = r"
routine @f(%a: i32, %fp: ptr) {
entry:
    %x = alloca i32
    store %a, %x
    %v = load i32, %x
    %s = shl %v, 2
    %c = icmp uge %s, -1
    %w = zext %c to i64
    %r = call i32 %fp(%a, true, null)
    call void @tick()
    br %c, loop, done
loop:
    %p = phi i32 [%a, entry], [%r, loop]
    switch %p, done [0: loop, 7: done]
done:
    unreachable
}
";
        match parse(input) {
            Ok(_) => {}
            Err(e) => panic!("Parse error: {}", e),
        }
    }

    #[test]
    fn test_missing_terminator_is_rejected() {
        let input = r"
routine @f() {
entry:
    %x = alloca i32
}
";
        assert!(!check(input));
    }

    #[test]
    fn test_unknown_opcode_is_rejected() {
        let input = r"
routine @f(%a: i32) {
entry:
    %x = frobnicate %a, %a
    ret
}
";
        assert!(!check(input));
    }
}
