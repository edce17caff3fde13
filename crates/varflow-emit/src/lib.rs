/*! Report analysis results as text or JSON.
 *
 * The text report is meant for reading in a terminal next to the IR it describes: variable
 * histories, dataflow edges and leftover branch tags, one line each. The JSON report carries the
 * same content for tools that post-process it.
 */

pub mod config;
pub mod emitter;
pub mod output;
pub mod report;

pub use config::{EmitterConfig, VerbosityLevel};
pub use emitter::{EmitContext, EmitHelper, EmitResult, Emitter, Tone};
pub use output::{JsonFormatter, OutputFormat};
pub use report::{
    emit_report, report_to_string, JsonReportEmitter, RoutineReport, TextReportEmitter,
};
