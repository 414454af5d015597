//! labelr CLI — driving adapter for the labelr rule engine.
//!
//! Subcommands:
//! - `classify <pr-data> [--rules <path>]` — label a PR, print the JSON result
//! - `check <rules> [--normalized]` — compile a rules file and report what survived
//! - `info` — print registered condition kinds
//!
//! `--debug` (any subcommand) logs dropped rule fragments and per-file details
//! to stderr. `RUST_LOG` overrides it.

mod summary;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use labelr::{registry, Classification, Compiler, PrContext, RuleSet, RulesConfig};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::summary::{FileChangeSummary, FileRecord};

/// Classify pull requests into labels from declarative rules.
#[derive(Debug, Parser)]
#[command(name = "labelr", version, about)]
struct Cli {
    /// Log dropped rule fragments and evaluation details to stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Label a PR described by a JSON file
    Classify {
        /// PR data JSON file (title, body, branch, changed_files, files)
        pr_data: PathBuf,

        /// Rules file (YAML, or JSON when the extension is .json)
        #[arg(long, default_value = ".github/labeler.yml")]
        rules: PathBuf,

        /// Pretty-print the JSON result
        #[arg(long)]
        pretty: bool,
    },

    /// Compile a rules file and report which labels survived
    Check {
        /// Rules file (YAML, or JSON when the extension is .json)
        rules: PathBuf,

        /// Print the compiled rules, without dropped fragments, as JSON
        #[arg(long)]
        normalized: bool,
    },

    /// Print registered condition kinds
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);
    build_registry()?;

    match cli.command {
        Command::Classify {
            pr_data,
            rules,
            pretty,
        } => cmd_classify(&pr_data, &rules, pretty),
        Command::Check { rules, normalized } => cmd_check(&rules, normalized),
        Command::Info => {
            cmd_info();
            Ok(())
        }
    }
}

fn init_tracing(debug: bool) {
    let default_filter = if debug { "labelr=debug" } else { "labelr=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_classify(pr_data: &Path, rules: &Path, pretty: bool) -> Result<()> {
    let data = load_pr_data(pr_data)?;
    let rule_set = load_rule_set(rules)?;

    let output = ClassifyOutput::new(&rule_set.classify(&data.context), &data.files)?;
    tracing::info!(labels = ?output.labels, "classified pull request");

    let json = if pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }
    .context("failed to serialize result")?;
    println!("{json}");
    Ok(())
}

fn cmd_check(rules_path: &Path, normalized: bool) -> Result<()> {
    let rules = load_rules(rules_path)?;
    let rule_set = Compiler::global().compile(&rules);

    if normalized {
        let json = serde_json::to_string_pretty(&rule_set.to_value())
            .context("failed to serialize rules")?;
        println!("{json}");
        return Ok(());
    }

    for (label, _) in rules.iter() {
        match rule_set.get(label) {
            Some(compiled) => println!("  {label}: {} rule group(s)", compiled.groups().len()),
            None => println!("  {label}: dropped (no rule group compiled)"),
        }
    }
    println!("{} of {} label(s) compiled", rule_set.len(), rules.len());
    Ok(())
}

fn cmd_info() {
    println!("Registered condition kinds:");
    for kind in registry::global().kinds() {
        println!("  {kind}");
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry assembly (composition root)
// ═══════════════════════════════════════════════════════════════════════════════

fn build_registry() -> Result<()> {
    let registry = labelr::register_core_rules(labelr::RegistryBuilder::new()).build();
    registry::initialize(registry).context("failed to install rule registry")
}

// ═══════════════════════════════════════════════════════════════════════════════
// Input loading
// ═══════════════════════════════════════════════════════════════════════════════

/// The PR data document: context fields plus the optional per-file records.
#[derive(Debug, Deserialize)]
struct PrData {
    #[serde(flatten)]
    context: PrContext,
    #[serde(default)]
    files: Vec<FileRecord>,
}

fn load_pr_data(path: &Path) -> Result<PrData> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read PR data \"{}\"", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse PR data \"{}\"", path.display()))
}

fn load_rules(path: &Path) -> Result<RulesConfig> {
    RulesConfig::from_path(path)
        .with_context(|| format!("failed to load rules \"{}\"", path.display()))
}

fn load_rule_set(path: &Path) -> Result<RuleSet> {
    let rules = load_rules(path)?;
    let rule_set = Compiler::global().compile(&rules);
    tracing::debug!(
        declared = rules.len(),
        compiled = rule_set.len(),
        "compiled rules"
    );
    Ok(rule_set)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Output
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct ClassifyOutput {
    labels: Vec<String>,
    debug_info: Map<String, Value>,
    file_analysis: FileChangeSummary,
}

impl ClassifyOutput {
    fn new(classification: &Classification, files: &[FileRecord]) -> Result<Self> {
        let mut debug_info = Map::new();
        for result in &classification.matches {
            let value = serde_json::to_value(result).context("failed to serialize match")?;
            debug_info.insert(result.label.clone(), value);
        }
        Ok(Self {
            labels: classification.labels().into_iter().map(str::to_owned).collect(),
            debug_info,
            file_analysis: FileChangeSummary::from_records(files),
        })
    }
}
