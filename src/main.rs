use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use font_linker::config::{
    load_from_path, ApplyMode, PatchResult, StepResults, FONT_WEIGHT_RANGE,
};
use font_linker::font::{fallback_weight, FontDescriptorDocument, FontFileRecord, XmlFormat};
use font_linker::link::Linker;
use font_linker::source::Dialect;
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "font-linker")]
#[command(about = "Link custom fonts into React Native Android projects", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write font-family XML and register fonts in MainApplication
    Link {
        /// Android project root (the directory holding app/)
        #[arg(short, long, default_value = ".")]
        project: PathBuf,

        /// Link plan (TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Show what would change without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Remove font registrations from MainApplication
    Unlink {
        /// Android project root (the directory holding app/)
        #[arg(short, long, default_value = ".")]
        project: PathBuf,

        /// Font family name as registered with addCustomFont
        #[arg(short, long = "family", required = true)]
        families: Vec<String>,

        /// Dialect of the native layer (detected if not specified)
        #[arg(long)]
        dialect: Option<Dialect>,

        /// Show what would change without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Report which steps of a link plan are already applied
    Status {
        /// Android project root (the directory holding app/)
        #[arg(short, long, default_value = ".")]
        project: PathBuf,

        /// Link plan (TOML)
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Print the font-family XML for a list of font files
    Descriptor {
        /// Font files as `name:weight` or `name:weight:italic`
        #[arg(required = true, value_parser = parse_font_arg)]
        fonts: Vec<FontFileRecord>,

        /// Print entries as JSON instead of XML
        #[arg(long)]
        json: bool,
    },

    /// Print the standard weight a font weight falls back to
    Weight {
        #[arg(allow_negative_numbers = true)]
        weight: i64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("FONT_LINKER_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Link {
            project,
            config,
            dry_run,
            diff,
        } => cmd_link(&project, &config, dry_run, diff),

        Commands::Unlink {
            project,
            families,
            dialect,
            dry_run,
        } => cmd_unlink(&project, &families, dialect, dry_run),

        Commands::Status { project, config } => cmd_status(&project, &config),

        Commands::Descriptor { fonts, json } => cmd_descriptor(&fonts, json),

        Commands::Weight { weight } => {
            println!("{}", fallback_weight(weight));
            Ok(())
        }
    }
}

/// Parse `name:weight[:italic]` into a font file record.
fn parse_font_arg(arg: &str) -> Result<FontFileRecord, String> {
    let mut parts = arg.split(':');
    let name = parts.next().filter(|name| !name.is_empty());
    let weight = parts.next();
    let style = parts.next();

    let (Some(name), Some(weight)) = (name, weight) else {
        return Err(format!("expected name:weight[:italic], got '{arg}'"));
    };
    if parts.next().is_some() {
        return Err(format!("too many ':' separated fields in '{arg}'"));
    }

    let weight: u16 = weight
        .parse()
        .map_err(|_| format!("invalid weight '{weight}'"))?;
    if !FONT_WEIGHT_RANGE.contains(&weight) {
        return Err(format!("weight {weight} out of range, expected 1..=1000"));
    }
    let is_italic = match style {
        None | Some("normal") => false,
        Some("italic") => true,
        Some(other) => return Err(format!("invalid style '{other}', expected 'italic'")),
    };

    Ok(FontFileRecord::new(name, weight, is_italic))
}

fn open_project(project: &Path, dialect: Option<Dialect>) -> Result<Linker> {
    let linker = Linker::new(project, dialect)
        .with_context(|| format!("cannot open project {}", project.display()))?;
    println!("Project: {}", linker.project_root().display());
    println!("Dialect: {}", linker.dialect());
    println!();
    Ok(linker)
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (linked)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

/// Print one line per step and a summary; returns the number of failures.
fn report(results: StepResults, dry_run: bool) -> usize {
    let mut total_applied = 0;
    let mut total_already_applied = 0;
    let mut total_skipped = 0;
    let mut total_failed = 0;

    for (step_id, result) in results {
        match result {
            Ok(PatchResult::Applied { file }) => {
                let verb = if dry_run { "Would apply to" } else { "Applied to" };
                println!("{} {}: {} {}", "✓".green(), step_id, verb, file.display());
                total_applied += 1;
            }
            Ok(PatchResult::AlreadyApplied { file }) => {
                println!(
                    "{} {}: Already applied to {}",
                    "⊙".yellow(),
                    step_id,
                    file.display()
                );
                total_already_applied += 1;
            }
            Ok(PatchResult::Skipped { reason, .. }) => {
                println!("{} {}: Skipped ({})", "⊘".cyan(), step_id, reason);
                total_skipped += 1;
            }
            Ok(PatchResult::Failed { file, reason }) => {
                eprintln!("{} {}: Failed - {}", "✗".red(), step_id, reason);
                eprintln!("  File: {}", file.display());
                total_failed += 1;
            }
            Err(e) => {
                eprintln!("{} {}: Error - {}", "✗".red(), step_id, e);
                total_failed += 1;
            }
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} applied", format!("{}", total_applied).green());
    println!(
        "  {} already applied",
        format!("{}", total_already_applied).yellow()
    );
    println!("  {} skipped", format!("{}", total_skipped).cyan());
    println!("  {} failed", format!("{}", total_failed).red());

    total_failed
}

fn cmd_link(project: &Path, config_path: &Path, dry_run: bool, show_diff: bool) -> Result<()> {
    let config = load_from_path(config_path)?;
    let linker = open_project(project, config.meta.dialect)?;

    // Diff is computed before anything is written
    if show_diff {
        for edit in linker.preview(&config)? {
            display_diff(
                &edit.file,
                edit.expected_before.as_deref().unwrap_or(""),
                &edit.new_text,
            );
        }
        println!();
    }

    let mode = if dry_run {
        println!("{}", "[DRY RUN - no files will be modified]".cyan());
        ApplyMode::Check
    } else {
        ApplyMode::Write
    };

    let results = linker.link(&config, mode)?;
    if report(results, dry_run) > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_unlink(
    project: &Path,
    families: &[String],
    dialect: Option<Dialect>,
    dry_run: bool,
) -> Result<()> {
    let linker = open_project(project, dialect)?;
    let mode = if dry_run {
        println!("{}", "[DRY RUN - no files will be modified]".cyan());
        ApplyMode::Check
    } else {
        ApplyMode::Write
    };

    let results = linker.unlink(families, mode)?;
    if report(results, dry_run) > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_status(project: &Path, config_path: &Path) -> Result<()> {
    let config = load_from_path(config_path)?;
    let linker = open_project(project, config.meta.dialect)?;

    println!("{}", "Link Status Report".bold());
    if !config.meta.name.is_empty() {
        println!("Plan: {}", config.meta.name);
    }
    println!();

    let mut applied = Vec::new();
    let mut not_applied = Vec::new();
    let mut skipped = Vec::new();

    // Read-only: Check mode never writes
    for (step_id, result) in linker.link(&config, ApplyMode::Check)? {
        match result {
            Ok(PatchResult::Applied { .. }) => {
                not_applied.push((step_id, "pending".to_string()));
            }
            Ok(PatchResult::AlreadyApplied { .. }) => applied.push(step_id),
            Ok(PatchResult::Skipped { reason, .. }) => skipped.push((step_id, reason)),
            Ok(PatchResult::Failed { reason, .. }) => not_applied.push((step_id, reason)),
            Err(e) => not_applied.push((step_id, e.to_string())),
        }
    }

    if !applied.is_empty() {
        println!(
            "{} {} ({} steps)",
            "✓".green(),
            "APPLIED".green().bold(),
            applied.len()
        );
        for id in &applied {
            println!("  - {}", id);
        }
        println!();
    }

    if !not_applied.is_empty() {
        println!(
            "{} {} ({} steps)",
            "⊙".yellow(),
            "NOT APPLIED".yellow().bold(),
            not_applied.len()
        );
        for (id, reason) in &not_applied {
            println!("  - {} ({})", id, reason.dimmed());
        }
        println!();
    }

    if !skipped.is_empty() {
        println!(
            "{} {} ({} steps)",
            "⊘".cyan(),
            "SKIPPED".cyan().bold(),
            skipped.len()
        );
        for (id, reason) in &skipped {
            println!("  - {} ({})", id, reason.dimmed());
        }
        println!();
    }

    Ok(())
}

fn cmd_descriptor(fonts: &[FontFileRecord], json: bool) -> Result<()> {
    let doc = FontDescriptorDocument::build(fonts);
    if json {
        println!("{}", serde_json::to_string_pretty(&doc.entries)?);
    } else {
        print!("{}", XmlFormat::default().write(&doc));
    }
    Ok(())
}
