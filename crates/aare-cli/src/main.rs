//! CLI entry point for aare.
//!
//! This module is intentionally thin: it handles argument parsing, I/O, and exit codes.
//! All business logic lives in the `aare-app` crate.

use aare_app::{
    ExplainOutput, OntologyStore, VerifyInput, format_validation, parse_report_json,
    render_markdown, render_text, run_explain, run_validate, run_verify, serialize_report,
    to_renderable, verdict_exit_code,
};
use aare_settings::{Overrides, ResolvedConfig};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Read;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(
    name = "aare",
    version,
    about = "Verify generated text against ontology-defined compliance constraints"
)]
struct Cli {
    /// Path to aare config TOML.
    #[arg(long, global = true, default_value = "aare.toml")]
    config: Utf8PathBuf,

    /// Directory holding `<name>.json` ontology documents.
    #[arg(long, global = true, env = "AARE_ONTOLOGY_DIR")]
    ontology_dir: Option<Utf8PathBuf>,

    /// Override what happens when a named ontology is missing.
    #[arg(long, global = true, value_enum)]
    fallback: Option<FallbackArg>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Verify text and write the JSON report.
    Verify {
        /// Ontology to verify against (defaults to the configured one).
        #[arg(long)]
        ontology: Option<String>,

        /// Text to verify.
        #[arg(long, conflicts_with = "input")]
        text: Option<String>,

        /// Read the text from a file instead of stdin.
        #[arg(long)]
        input: Option<Utf8PathBuf>,

        /// Where to write the JSON report (stdout when omitted).
        #[arg(long)]
        report_out: Option<Utf8PathBuf>,

        /// Write a Markdown report alongside the JSON.
        #[arg(long)]
        write_markdown: bool,

        /// Where to write the Markdown report (if enabled).
        #[arg(long, default_value = "aare-report.md")]
        markdown_out: Utf8PathBuf,
    },

    /// Explain one constraint: formula, variables and their sources, message, citation.
    Explain {
        /// The constraint id (e.g., "ATR_QM_DTI").
        constraint_id: String,

        /// Ontology containing the constraint (defaults to the configured one).
        #[arg(long)]
        ontology: Option<String>,
    },

    /// Validate an ontology document.
    Validate {
        /// Path to the ontology JSON document.
        file: Utf8PathBuf,
    },

    /// List available ontologies.
    List,

    /// Print the JSON Schema of the ontology document.
    Schema {
        /// Print the schema of `aare.toml` instead.
        #[arg(long = "config-schema")]
        config_schema: bool,
    },

    /// Render markdown from an existing JSON report.
    Md {
        /// Path to the JSON report file.
        #[arg(long)]
        report: Utf8PathBuf,

        /// Where to write the Markdown output (if not specified, prints to stdout).
        #[arg(long, short)]
        output: Option<Utf8PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FallbackArg {
    /// Use the configured default ontology.
    Default,
    /// Fail the command.
    Error,
}

impl FallbackArg {
    fn as_config_value(self) -> &'static str {
        match self {
            FallbackArg::Default => "default",
            FallbackArg::Error => "error",
        }
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("aare error: {err:#}");
            std::process::exit(1);
        }
    }
}

/// Logs go to stderr so JSON on stdout stays clean.
fn init_tracing() {
    let filter = std::env::var("AARE_LOG").unwrap_or_else(|_| "warn".into());
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Commands::Verify {
            ref ontology,
            ref text,
            ref input,
            ref report_out,
            write_markdown,
            ref markdown_out,
        } => {
            let config = load_config(&cli)?;
            let store = OntologyStore::from_config(&config);
            let text = read_text(text.as_deref(), input.as_deref())?;
            let report = run_verify(
                &store,
                &config,
                VerifyInput {
                    text: &text,
                    ontology: ontology.as_deref(),
                },
            )?;

            let data = serialize_report(&report)?;
            match report_out {
                Some(path) => {
                    write_file(path, &data).context("write report json")?;
                    print!("{}", render_text(&to_renderable(&report)));
                }
                None => println!("{}", String::from_utf8_lossy(&data)),
            }
            if write_markdown {
                let md = render_markdown(&to_renderable(&report));
                write_file(markdown_out, md.as_bytes()).context("write markdown")?;
            }
            Ok(verdict_exit_code(&report))
        }
        Commands::Explain {
            ref constraint_id,
            ref ontology,
        } => {
            let config = load_config(&cli)?;
            let store = OntologyStore::from_config(&config);
            let name = ontology.as_deref().unwrap_or(&config.default_ontology);
            match run_explain(&store, name, constraint_id)? {
                ExplainOutput::Found(exp) => {
                    print!("{}", aare_app::format_explanation(&exp));
                    Ok(0)
                }
                ExplainOutput::NotFound {
                    identifier,
                    available,
                } => {
                    eprint!("{}", aare_app::format_not_found(&identifier, &available));
                    Ok(1)
                }
            }
        }
        Commands::Validate { ref file } => {
            let text =
                std::fs::read_to_string(file).with_context(|| format!("read ontology: {file}"))?;
            let summary = run_validate(&text).with_context(|| format!("validate {file}"))?;
            print!("{}", format_validation(&summary));
            Ok(0)
        }
        Commands::List => {
            let config = load_config(&cli)?;
            let store = OntologyStore::from_config(&config);
            for name in store.list_available()? {
                println!("{name}");
            }
            Ok(0)
        }
        Commands::Schema { config_schema } => {
            let schema = if config_schema {
                serde_json::to_value(aare_settings::config_json_schema())
                    .context("serialize config schema")?
            } else {
                aare_ontology::ontology_json_schema()
            };
            let text = serde_json::to_string_pretty(&schema).context("serialize schema")?;
            println!("{text}");
            Ok(0)
        }
        Commands::Md { report, output } => {
            let report_text = std::fs::read_to_string(&report)
                .with_context(|| format!("read report: {report}"))?;
            let parsed = parse_report_json(&report_text)?;
            let md = render_markdown(&to_renderable(&parsed));
            match output {
                Some(path) => write_file(&path, md.as_bytes()).context("write markdown output")?,
                None => print!("{md}"),
            }
            Ok(0)
        }
    }
}

/// Load config if present; a missing file means defaults.
fn load_config(cli: &Cli) -> anyhow::Result<ResolvedConfig> {
    let cfg_text = match std::fs::read_to_string(&cli.config) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(err) => {
            return Err(err).with_context(|| format!("read config: {}", cli.config));
        }
    };
    let cfg = if cfg_text.trim().is_empty() {
        aare_settings::AareConfigV1::default()
    } else {
        aare_settings::parse_config_toml(&cfg_text)
            .with_context(|| format!("parse config: {}", cli.config))?
    };

    let overrides = Overrides {
        ontology_dir: cli.ontology_dir.as_ref().map(|d| d.to_string()),
        fallback: cli.fallback.map(|f| f.as_config_value().to_string()),
        ..Overrides::default()
    };
    let resolved = aare_settings::resolve_config(cfg, overrides).context("resolve config")?;
    tracing::debug!(
        config = %cli.config,
        ontology_dir = resolved.ontology_dir.as_deref().unwrap_or("-"),
        default_ontology = %resolved.default_ontology,
        "resolved config"
    );
    Ok(resolved)
}

fn read_text(text: Option<&str>, input: Option<&Utf8Path>) -> anyhow::Result<String> {
    if let Some(text) = text {
        return Ok(text.to_string());
    }
    if let Some(path) = input {
        return std::fs::read_to_string(path).with_context(|| format!("read input: {path}"));
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("read stdin")?;
    Ok(buf)
}

fn write_file(path: &Utf8Path, data: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {parent}"))?;
    }
    std::fs::write(path, data).with_context(|| format!("write file: {path}"))?;
    Ok(())
}
