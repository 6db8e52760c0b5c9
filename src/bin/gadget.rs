//! Gadget CLI - generates agent wrappers from interface schemas
//!
//! Reads one or more JSON schema files, synthesizes the agent for the named
//! interface and writes Rust source (or the synthesized spec) to stdout or a
//! file. Logs go to stderr so generated code on stdout stays clean.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use gadget::config::{GeneratorConfig, OutputFormat};
use gadget::render::{render_agent, render_spec_json};
use gadget::schema::SchemaPool;
use gadget::synth::{AgentRequest, generate};

#[derive(Parser)]
#[command(name = "gadget")]
#[command(about = "Generate thread-safe agent wrappers for interfaces", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an agent wrapping an interface
    Agent {
        /// Interface to wrap
        interface: String,

        /// Schema file to read (repeatable)
        #[arg(short = 'i', long = "input", required = true)]
        inputs: Vec<PathBuf>,

        /// Constructor to emit a factory for (repeatable)
        #[arg(short = 'c', long = "constructor")]
        constructors: Vec<String>,

        /// Module path of the wrapped interface and constructors
        #[arg(short = 'p', long = "package")]
        package: Option<String>,

        /// Inline the lifecycle support module
        #[arg(short = 'I', long = "emit-lifecycle")]
        emit_lifecycle: bool,

        /// Write to this file instead of stdout
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,

        /// What to write
        #[arg(long, value_enum)]
        format: Option<Format>,

        /// Generator configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Rust,
    Spec,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Rust => OutputFormat::Rust,
            Format::Spec => OutputFormat::Spec,
        }
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Agent {
            interface,
            inputs,
            constructors,
            package,
            emit_lifecycle,
            output,
            format,
            config,
        } => {
            let mut config = match config {
                Some(path) => GeneratorConfig::load(&path)?,
                None => GeneratorConfig::default(),
            };
            if package.is_some() {
                config.package = package;
            }
            if emit_lifecycle {
                config.emit_lifecycle = true;
            }
            if let Some(format) = format {
                config.format = format.into();
            }
            config.constructors.extend(constructors);

            let pool = load_schemas(&inputs)?;
            let request = AgentRequest {
                interface,
                constructors: config.constructors.clone(),
            };
            let spec = generate(&pool, &request).map_err(|err| anyhow!("{}: {}", err.kind(), err))?;

            let text = match config.format {
                OutputFormat::Rust => render_agent(&spec, &config.render_options()),
                OutputFormat::Spec => {
                    render_spec_json(&spec).context("Failed to serialize agent spec")?
                }
            };

            match output {
                Some(path) => {
                    fs::write(&path, &text)
                        .with_context(|| format!("Failed to write output file: {:?}", path))?;
                    tracing::info!(agent = %spec.layout.agent, path = ?path, "agent written");
                }
                None => {
                    io::stdout()
                        .write_all(text.as_bytes())
                        .context("Failed to write to stdout")?;
                }
            }
        }
    }

    Ok(())
}

/// Read and merge every schema file, first definition wins.
fn load_schemas(paths: &[PathBuf]) -> Result<SchemaPool> {
    let mut pool = SchemaPool::new();
    for path in paths {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema file: {:?}", path))?;
        let parsed = SchemaPool::from_json(&data)
            .with_context(|| format!("Failed to parse schema file: {:?}", path))?;
        pool.merge(parsed);
    }
    Ok(pool)
}
