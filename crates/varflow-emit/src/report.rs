use crate::config::EmitterConfig;
use crate::emitter::{EmitContext, EmitHelper, EmitResult, Emitter, Tone};
use crate::output::{JsonFormatter, OutputFormat};
use anyhow::Result;
use indexmap::IndexMap;
use serde::Serialize;
use std::io::Write;
use varflow_core::{BasicBlock, BranchTag, Describe, Module, RoutineDataflow, ValueId, ValueNames};

/// Spells values and blocks of one routine the way the textual IR does.
///
/// Falls back to raw ids when the routine is not in the module, e.g. for a
/// dataflow loaded from disk against a different module.
struct Spelling<'a> {
    names: Option<ValueNames<'a>>,
    module: &'a Module,
    routine: &'a str,
}

impl<'a> Spelling<'a> {
    fn new(module: &'a Module, routine: &'a str) -> Self {
        let names = module
            .routine(routine)
            .map(|r| ValueNames::new(module, r));
        Self {
            names,
            module,
            routine,
        }
    }

    fn value(&self, value: ValueId) -> String {
        match &self.names {
            Some(names) => names.operand(value),
            None => value.to_string(),
        }
    }

    fn described(&self, value: ValueId) -> String {
        match &self.names {
            Some(names) => format!("{} [{}]", names.operand(value), names.describe(value)),
            None => value.to_string(),
        }
    }

    fn block(&self, block: varflow_core::BlockId) -> String {
        self.module
            .routine(self.routine)
            .and_then(|r| r.block(block))
            .map(BasicBlock::name)
            .unwrap_or_else(|| block.to_string())
    }
}

/// The line-oriented dump: one `# var #` line per record, one `# edge #`
/// line per edge and one `# block #` line per unclaimed branch tag, framed by
/// begin/end banners.
pub struct TextReportEmitter<'m> {
    module: &'m Module,
    config: EmitterConfig,
}

impl<'m> TextReportEmitter<'m> {
    pub fn new(module: &'m Module, config: EmitterConfig) -> Self {
        Self { module, config }
    }
}

impl Emitter for TextReportEmitter<'_> {
    type Item = RoutineDataflow;

    fn emit<W: Write>(
        &self,
        dataflow: &RoutineDataflow,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        let spell = Spelling::new(self.module, &dataflow.routine);
        let verbosity = self.config.verbosity;
        let value = |v: ValueId| {
            if verbosity.should_describe_values() {
                spell.described(v)
            } else {
                spell.value(v)
            }
        };

        EmitHelper::write_colored_line(
            writer,
            context,
            &format!("$$$ begin routine {} $$$", dataflow.routine),
            Tone::Banner,
        )?;

        if verbosity.should_print_tables() {
            for record in dataflow.variables.records() {
                let synonyms: Vec<_> = record
                    .synonyms()
                    .iter()
                    .map(|s| format!("{} {}", value(s.value), s.version))
                    .collect();
                EmitHelper::write_tagged(
                    writer,
                    context,
                    "var",
                    &format!("{}: {}", record.name(), synonyms.join(" | ")),
                    Tone::Variable,
                )?;
            }

            for edge in dataflow.graph.edges() {
                EmitHelper::write_tagged(
                    writer,
                    context,
                    "edge",
                    &format!(
                        "{} -> {} ({}<{}>)",
                        value(edge.from),
                        value(edge.to),
                        edge.label.variable,
                        edge.label.tag
                    ),
                    Tone::Edge,
                )?;
            }

            if self.config.include_unconsumed {
                for entry in &dataflow.unconsumed {
                    EmitHelper::write_tagged(
                        writer,
                        context,
                        "block",
                        &format!("{}: {}", entry.tag, spell.block(entry.block)),
                        Tone::Block,
                    )?;
                }
            }
        }

        if verbosity.should_print_summary() {
            EmitHelper::write_colored_line(
                writer,
                context,
                &format!(
                    "{} variables, {} edges, {} unconsumed",
                    dataflow.variables.len(),
                    dataflow.graph.len(),
                    dataflow.unconsumed.len()
                ),
                Tone::Summary,
            )?;
        }

        EmitHelper::write_colored_line(writer, context, "$$$ end of routine $$$", Tone::Banner)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynonymEntry {
    pub value: String,
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableEntry {
    pub name: String,
    pub synonyms: Vec<SynonymEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeEntry {
    pub from: String,
    pub to: String,
    pub variable: String,
    pub tag: BranchTag,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockEntry {
    pub block: String,
    pub tag: BranchTag,
}

/// JSON shape of one analyzed routine, with values spelled as in the IR.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutineReport {
    pub routine: String,
    pub variables: Vec<VariableEntry>,
    pub edges: Vec<EdgeEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unconsumed: Option<Vec<BlockEntry>>,
}

impl RoutineReport {
    pub fn new(module: &Module, dataflow: &RoutineDataflow, config: &EmitterConfig) -> Self {
        let spell = Spelling::new(module, &dataflow.routine);

        let variables = dataflow
            .variables
            .records()
            .iter()
            .map(|record| VariableEntry {
                name: record.name().to_string(),
                synonyms: record
                    .synonyms()
                    .iter()
                    .map(|s| SynonymEntry {
                        value: spell.value(s.value),
                        version: s.version,
                    })
                    .collect(),
            })
            .collect();

        let edges = dataflow
            .graph
            .edges()
            .iter()
            .map(|edge| EdgeEntry {
                from: spell.value(edge.from),
                to: spell.value(edge.to),
                variable: edge.label.variable.clone(),
                tag: edge.label.tag,
            })
            .collect();

        let unconsumed = config.include_unconsumed.then(|| {
            dataflow
                .unconsumed
                .iter()
                .map(|entry| BlockEntry {
                    block: spell.block(entry.block),
                    tag: entry.tag,
                })
                .collect()
        });

        Self {
            routine: dataflow.routine.clone(),
            variables,
            edges,
            unconsumed,
        }
    }
}

#[derive(Debug, Serialize)]
struct ModuleReport {
    routines: Vec<RoutineReport>,
}

pub struct JsonReportEmitter<'m> {
    module: &'m Module,
    config: EmitterConfig,
}

impl<'m> JsonReportEmitter<'m> {
    pub fn new(module: &'m Module, config: EmitterConfig) -> Self {
        Self { module, config }
    }
}

impl Emitter for JsonReportEmitter<'_> {
    type Item = IndexMap<String, RoutineDataflow>;

    fn emit<W: Write>(
        &self,
        results: &IndexMap<String, RoutineDataflow>,
        writer: &mut W,
        _context: &mut EmitContext,
    ) -> EmitResult {
        let report = ModuleReport {
            routines: results
                .values()
                .map(|dataflow| RoutineReport::new(self.module, dataflow, &self.config))
                .collect(),
        };
        JsonFormatter::format_object(writer, &report)
    }
}

/// Writes every analyzed routine of `module` in `format`.
pub fn emit_report<W: Write>(
    module: &Module,
    results: &IndexMap<String, RoutineDataflow>,
    format: OutputFormat,
    config: &EmitterConfig,
    writer: &mut W,
) -> Result<()> {
    let mut context = EmitContext {
        use_colors: config.use_colors,
        ..EmitContext::new()
    };

    match format {
        OutputFormat::Text => {
            let emitter = TextReportEmitter::new(module, config.clone());
            for dataflow in results.values() {
                emitter.emit(dataflow, writer, &mut context)?;
            }
        }
        OutputFormat::Json => {
            JsonReportEmitter::new(module, config.clone()).emit(results, writer, &mut context)?;
        }
    }
    Ok(())
}

pub fn report_to_string(
    module: &Module,
    results: &IndexMap<String, RoutineDataflow>,
    format: OutputFormat,
    config: &EmitterConfig,
) -> Result<String> {
    let mut buffer = Vec::new();
    emit_report(module, results, format, config, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
