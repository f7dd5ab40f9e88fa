//! Command-line interface for specmap.
//!
//! Provides commands for mapping annotations onto a specification,
//! checking stored offsets against a new revision, fixing moved
//! annotations, and rendering combined version history.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use crate::adapters::{LocatorFetcher, SpecSource};
use crate::config::{self, ResolvedConfig};
use crate::domain::{CombinedHistoryEntry, Fields, HistoryRow, WorkItemKind};
use crate::history::HistoryReconciler;
use crate::mapping::{apply_fixups, build_mapping_view, reconcile_offsets, MappingView, OffsetReport};
use crate::store::AnnotationFile;

/// specmap - Specification mapping and history reconciliation
#[derive(Parser, Debug)]
#[command(name = "specmap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split a specification into sections covered by annotations
    Map {
        /// Specification locator (URL or file path)
        spec: String,

        /// Annotation file (JSON array)
        #[arg(short, long)]
        annotations: PathBuf,

        /// Kinds to place, in order (comma-separated, defaults to config)
        #[arg(short, long, value_delimiter = ',')]
        kinds: Vec<WorkItemKind>,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Check stored annotation offsets against a specification
    Check {
        /// Specification locator (URL or file path)
        spec: String,

        /// Annotation file (JSON array)
        #[arg(short, long)]
        annotations: PathBuf,

        /// Check against another revision instead of `spec`
        #[arg(long)]
        against: Option<String>,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Move annotations whose section moved to its new offset
    Fix {
        /// Specification locator (URL or file path)
        spec: String,

        /// Annotation file (JSON array), updated in place
        #[arg(short, long)]
        annotations: PathBuf,
    },

    /// Show the combined history of an association
    History {
        /// Object audit rows (JSON array)
        #[arg(short, long)]
        object: PathBuf,

        /// Mapping audit rows (JSON array)
        #[arg(short, long)]
        mapping: Option<PathBuf>,

        /// Extra fields to leave out of snapshots
        #[arg(long = "ignore-field")]
        ignore_fields: Vec<String>,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let config = config::config()?;

        match self.command {
            Commands::Map {
                spec,
                annotations,
                kinds,
                json,
            } => map_specification(config, &spec, &annotations, kinds, json).await,
            Commands::Check {
                spec,
                annotations,
                against,
                json,
            } => check_offsets(config, &spec, &annotations, against.as_deref(), json).await,
            Commands::Fix { spec, annotations } => fix_offsets(config, &spec, &annotations).await,
            Commands::History {
                object,
                mapping,
                ignore_fields,
                json,
            } => show_history(config, &object, mapping.as_deref(), ignore_fields, json).await,
            Commands::Config => show_config(config),
        }
    }
}

async fn map_specification(
    config: &ResolvedConfig,
    locator: &str,
    annotations_path: &Path,
    kinds: Vec<WorkItemKind>,
    json: bool,
) -> Result<()> {
    let store = AnnotationFile::open(annotations_path)
        .await
        .with_context(|| format!("Failed to load annotations: {}", annotations_path.display()))?;
    let fetcher = LocatorFetcher::new(&config.fetch);
    let specification = fetcher.fetch(locator).await;

    let kinds = if kinds.is_empty() {
        config.mapping.kinds.clone()
    } else {
        kinds
    };

    let view = build_mapping_view(
        locator,
        specification.as_ref(),
        store.annotations(),
        &kinds,
        &config.mapping.placeholder,
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_mapping_view(&view);
    }
    Ok(())
}

fn print_mapping_view(view: &MappingView) {
    println!("Specification: {}", view.locator);

    let Some(coverage) = view.coverage else {
        if let Some(ref placeholder) = view.placeholder {
            println!();
            println!("{}", placeholder);
        }
        return;
    };

    println!("Coverage: {}%", coverage);
    println!();

    for section in &view.mapped {
        let refs: Vec<String> = section
            .attached
            .iter()
            .map(|a| format!("{}#{}", a.kind, a.relation_id))
            .collect();
        println!(
            "  [{:>6}] {:>3}%  {:<42} {}",
            section.offset,
            section.coverage,
            preview(&section.text, 40),
            refs.join(", ")
        );
    }

    if !view.unmapped.is_empty() {
        println!();
        println!("Unmapped ({}):", view.unmapped.len());
        for annotation in &view.unmapped {
            println!(
                "  {}#{} @ {}  {}",
                annotation.kind,
                annotation.relation_id,
                annotation.offset,
                preview(&annotation.section, 40)
            );
        }
    }
}

/// Quote `text` on one line, truncated to `max` characters
fn preview(text: &str, max: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    if flat.chars().count() > max {
        let cut: String = flat.chars().take(max.saturating_sub(3)).collect();
        format!("\"{}...\"", cut)
    } else {
        format!("\"{}\"", flat)
    }
}

/// Reconcile stored offsets against the text behind `locator`.
///
/// An unreadable specification is not an error: the placeholder is printed
/// and `None` returned.
async fn reconcile_against(
    config: &ResolvedConfig,
    locator: &str,
    store: &AnnotationFile,
    json: bool,
) -> Result<Option<OffsetReport>> {
    let fetcher = LocatorFetcher::new(&config.fetch);
    let Some(specification) = fetcher.fetch(locator).await else {
        if json {
            let placeholder = serde_json::json!({
                "locator": locator,
                "placeholder": config.mapping.placeholder,
            });
            println!("{}", serde_json::to_string_pretty(&placeholder)?);
        } else {
            println!("Specification: {}", locator);
            println!();
            println!("{}", config.mapping.placeholder);
        }
        return Ok(None);
    };

    Ok(Some(reconcile_offsets(&specification.text, store.annotations())))
}

async fn check_offsets(
    config: &ResolvedConfig,
    locator: &str,
    annotations_path: &Path,
    against: Option<&str>,
    json: bool,
) -> Result<()> {
    let store = AnnotationFile::open(annotations_path)
        .await
        .with_context(|| format!("Failed to load annotations: {}", annotations_path.display()))?;
    let Some(report) = reconcile_against(config, against.unwrap_or(locator), &store, json).await? else {
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "OK: {}  WARNING: {}  KO: {}",
        report.ok.len(),
        report.warning.len(),
        report.ko.len()
    );
    for warning in &report.warning {
        println!(
            "  WARNING {}#{}: offset {} -> {}",
            warning.kind, warning.id, warning.old_offset, warning.new_offset
        );
    }
    for entry in &report.ko {
        println!("  KO      {}#{}", entry.kind, entry.id);
    }
    Ok(())
}

async fn fix_offsets(config: &ResolvedConfig, locator: &str, annotations_path: &Path) -> Result<()> {
    let mut store = AnnotationFile::open(annotations_path)
        .await
        .with_context(|| format!("Failed to load annotations: {}", annotations_path.display()))?;
    let Some(report) = reconcile_against(config, locator, &store, false).await? else {
        return Ok(());
    };

    let applied = apply_fixups(&report, &mut store)?;
    if store.is_dirty() {
        store
            .save()
            .await
            .with_context(|| format!("Failed to save annotations: {}", store.path().display()))?;
    }

    println!("Fixed {} annotation(s)", applied);
    if !report.ko.is_empty() {
        println!("{} annotation(s) no longer found in the specification", report.ko.len());
    }
    Ok(())
}

async fn load_rows(path: &Path) -> Result<Vec<HistoryRow>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read history rows: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse history rows: {}", path.display()))
}

async fn show_history(
    config: &ResolvedConfig,
    object_path: &Path,
    mapping_path: Option<&Path>,
    ignore_fields: Vec<String>,
    json: bool,
) -> Result<()> {
    let object_rows = load_rows(object_path).await?;
    let mapping_rows = match mapping_path {
        Some(path) => load_rows(path).await?,
        None => Vec::new(),
    };

    let reconciler = HistoryReconciler::new()
        .ignore_fields(config.history.ignored_fields.iter().cloned())
        .ignore_fields(ignore_fields);
    let entries = reconciler.reconcile(&object_rows, &mapping_rows);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.is_empty() {
        println!("No history found.");
    } else {
        for entry in &entries {
            print_history_entry(entry, &config.history.date_format);
        }
    }
    Ok(())
}

fn print_history_entry(entry: &CombinedHistoryEntry, date_format: &str) {
    println!("v{}  {}", entry.version, format_timestamp(entry.created_at, date_format));
    print_fields("object", &entry.object);
    print_fields("mapping", &entry.mapping);
}

/// Format with `date_format`, falling back to RFC 3339 for an invalid format
fn format_timestamp(timestamp: DateTime<Utc>, date_format: &str) -> String {
    if StrftimeItems::new(date_format).any(|item| matches!(item, Item::Error)) {
        timestamp.to_rfc3339()
    } else {
        timestamp.format(date_format).to_string()
    }
}

fn print_fields(family: &str, fields: &Fields) {
    for (name, value) in fields {
        println!("  {}.{}: {}", family, name, value);
    }
}

fn show_config(config: &ResolvedConfig) -> Result<()> {
    println!("specmap configuration");
    println!("=====================");
    println!();
    match config.config_file {
        Some(ref path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none, using defaults)"),
    }
    println!();
    println!("Fetch timeout:   {}s", config.fetch.timeout_seconds);
    println!("User agent:      {}", config.fetch.user_agent);
    let kinds: Vec<&str> = config.mapping.kinds.iter().map(|k| k.as_str()).collect();
    println!("Kinds:           {}", kinds.join(", "));
    println!("Ignored fields:  {}", config.history.ignored_fields.join(", "));
    println!("Date format:     {}", config.history.date_format);
    Ok(())
}
