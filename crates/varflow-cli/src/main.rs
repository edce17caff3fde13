use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use varflow_core::{AnalysisConfig, BindingStrategy, Module};
use varflow_emit::{EmitterConfig, OutputFormat, VerbosityLevel};

#[derive(Parser)]
#[command(name = "varflow")]
#[command(about = "varflow - variable alias and dataflow analysis over a small SSA IR")]
#[command(version = "0.1.0")]
#[command(author = "Gianluca Brigandi <gbrigand@gmail.com>")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze routines and report their variables, edges and unclaimed branch tags
    Analyze {
        input: PathBuf,

        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,

        #[arg(long, value_enum)]
        binding: Option<Binding>,

        /// Only analyze this routine; repeatable
        #[arg(long = "routine", value_name = "NAME")]
        routines: Vec<String>,

        /// JSON analysis config; flags override it
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        no_color: bool,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write each routine's dataflow as JSON into this directory
        #[arg(long, value_name = "DIR")]
        save_dataflow: Option<PathBuf>,

        #[arg(short, long)]
        verbose: bool,
    },

    /// Check that IR files parse and resolve
    Validate {
        input: PathBuf,

        #[arg(short, long)]
        verbose: bool,
    },

    /// Re-emit a module as textual IR
    Print {
        input: PathBuf,

        /// Emit the module as JSON instead
        #[arg(long)]
        json: bool,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Binding {
    Formal,
    CallSite,
}

impl From<Binding> for BindingStrategy {
    fn from(binding: Binding) -> Self {
        match binding {
            Binding::Formal => BindingStrategy::FormalParameters,
            Binding::CallSite => BindingStrategy::CallSiteOperands,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            format,
            binding,
            routines,
            config,
            no_color,
            output,
            save_dataflow,
            verbose,
        } => {
            init_tracing(verbose);
            cmd_analyze(AnalyzeArgs {
                input,
                format,
                binding,
                routines,
                config,
                no_color,
                output,
                save_dataflow,
                verbose,
            })
        }
        Commands::Validate { input, verbose } => {
            init_tracing(verbose);
            cmd_validate(input, verbose)
        }
        Commands::Print {
            input,
            json,
            output,
        } => {
            init_tracing(false);
            cmd_print(input, json, output)
        }
    }
}

/// Logs go to stderr so reports on stdout stay clean. `RUST_LOG` applies
/// unless `-v` asks for debug output.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_module(input: &Path) -> Result<Module> {
    let is_json = input
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        varflow_core::ir_persist::load_module(input)
            .with_context(|| format!("failed to load module from {}", input.display()))
    } else {
        varflow_parser::parse_file(input)
            .with_context(|| format!("failed to parse {}", input.display()))
    }
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}

struct AnalyzeArgs {
    input: PathBuf,
    format: Format,
    binding: Option<Binding>,
    routines: Vec<String>,
    config: Option<PathBuf>,
    no_color: bool,
    output: Option<PathBuf>,
    save_dataflow: Option<PathBuf>,
    verbose: bool,
}

fn cmd_analyze(args: AnalyzeArgs) -> Result<()> {
    let module = load_module(&args.input)?;

    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            AnalysisConfig::from_json(&json)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => AnalysisConfig::default(),
    };
    if let Some(binding) = args.binding {
        config.binding = binding.into();
    }
    if !args.routines.is_empty() {
        config.routines = args.routines;
    }

    let format: OutputFormat = args.format.into();
    tracing::debug!(?config, %format, input = %args.input.display(), "analysis config");
    let results = varflow_core::analyze_module(&module, &config)?;

    if let Some(dir) = &args.save_dataflow {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        for (name, dataflow) in &results {
            let path = dir.join(format!("{}.json", name));
            varflow_core::ir_persist::save_dataflow(dataflow, &path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::debug!(path = %path.display(), "saved dataflow");
        }
    }

    let use_colors = !args.no_color && args.output.is_none();
    if !use_colors {
        colored::control::set_override(false);
    }
    let emit_config = EmitterConfig {
        use_colors,
        verbosity: if args.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        },
        ..EmitterConfig::default()
    };

    let report =
        varflow_emit::report_to_string(&module, &results, format, &emit_config)?;
    write_output(args.output.as_deref(), &report)
}

fn cmd_validate(input: PathBuf, verbose: bool) -> Result<()> {
    use colored::*;
    use walkdir::WalkDir;

    let files: Vec<PathBuf> = if input.is_dir() {
        WalkDir::new(&input)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                path.extension()
                    .map(|ext| ext == "vf" || ext == "json")
                    .unwrap_or(false)
            })
            .collect()
    } else {
        vec![input]
    };

    if verbose {
        println!("{}", " Validating varflow IR".bright_cyan().bold());
        println!("{}", "=".repeat(50).bright_cyan());
    }

    let mut failures = 0;
    for file in &files {
        tracing::debug!(file = %file.display(), "validating");
        match load_module(file) {
            Ok(module) => {
                println!("{} {}", "VALID".bright_green().bold(), file.display());
                if verbose {
                    println!(
                        "   {} routines, {} with bodies, {} globals",
                        module.routines.len(),
                        module.defined_routines().count(),
                        module.globals.len()
                    );
                }
            }
            Err(e) => {
                failures += 1;
                println!("{} {}", "INVALID".bright_red().bold(), file.display());
                println!("{:#}", e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("Validation failed for {} of {} file(s)", failures, files.len());
    }
    Ok(())
}

fn cmd_print(input: PathBuf, json: bool, output: Option<PathBuf>) -> Result<()> {
    let module = load_module(&input)?;

    match (json, output) {
        (true, Some(path)) => varflow_core::ir_persist::save_module(&module, &path)
            .with_context(|| format!("failed to write {}", path.display())),
        (true, None) => {
            println!("{}", serde_json::to_string_pretty(&module)?);
            Ok(())
        }
        (false, output) => write_output(output.as_deref(), &varflow_core::format_module(&module)),
    }
}
