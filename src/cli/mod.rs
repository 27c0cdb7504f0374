//! Command-line interface for rulebook.
//!
//! Loads the configured content sources into a registry and exposes its
//! queries: lookup by slug, filtering by tag, section listing, search and
//! validation. `watch` keeps the registry live while the files change.

use std::borrow::Cow;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::{self, ResolvedConfig};
use crate::domain::ContentRecord;
use crate::registry::{Registry, SearchHit, SharedRegistry};
use crate::source::{ContentSource, ReloadEvent, SourceWatcher};

/// rulebook - Query tagged, sectioned rule documents
#[derive(Parser, Debug)]
#[command(name = "rulebook")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Content source file, directory or glob (repeatable; overrides config)
    #[arg(short, long = "source", global = true)]
    pub sources: Vec<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a single record
    Show {
        /// Record slug
        slug: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List records carrying a tag
    Tag {
        /// Tag (exact, case-sensitive)
        tag: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List all tags with record counts
    Tags,

    /// List sections in definition order
    Sections {
        /// Include each section's records
        #[arg(short, long)]
        expand: bool,
    },

    /// Search titles and tags
    Search {
        /// Search query (case-insensitive)
        query: String,

        /// Maximum number of results to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check content for empty or placeholder bodies
    Validate {
        /// Exit non-zero when any warning is found
        #[arg(long)]
        strict: bool,
    },

    /// Reload the registry whenever source files change
    Watch,

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let config = effective_config(config::config(), !self.sources.is_empty())?;
        let config = config.as_ref();
        let source = if self.sources.is_empty() {
            config.content_source()
        } else {
            ContentSource::new(self.sources)
        };

        match self.command {
            Commands::Show { slug, json } => {
                show_record(&load_registry(&source).await?, &slug, json)
            }
            Commands::Tag { tag, json } => {
                list_tag(&load_registry(&source).await?, &tag, json)
            }
            Commands::Tags => {
                list_tags(&load_registry(&source).await?)
            }
            Commands::Sections { expand } => {
                list_sections(&load_registry(&source).await?, expand)
            }
            Commands::Search { query, limit, json } => {
                let limit = search_limit(limit, config);
                search(&load_registry(&source).await?, &query, limit, json)
            }
            Commands::Validate { strict } => {
                validate(&load_registry(&source).await?, config, strict)
            }
            Commands::Watch => {
                watch(config, source).await
            }
            Commands::Config => {
                show_config(config, &source)
            }
        }
    }
}

/// The loaded configuration, or defaults when it is unreadable but
/// explicit `--source` flags make the config file unnecessary
fn effective_config(
    loaded: Result<&'static ResolvedConfig>,
    has_sources: bool,
) -> Result<Cow<'static, ResolvedConfig>> {
    match loaded {
        Ok(config) => Ok(Cow::Borrowed(config)),
        Err(e) if has_sources => {
            tracing::warn!("Ignoring config ({:#}), using --source", e);
            Ok(Cow::Owned(config::defaults()?))
        }
        Err(e) => Err(e),
    }
}

/// `--limit` wins over the configured default
fn search_limit(flag: Option<usize>, config: &ResolvedConfig) -> Option<usize> {
    flag.or(config.search_limit)
}

/// Build the registry from a source
async fn load_registry(source: &ContentSource) -> Result<Registry> {
    source
        .load_registry()
        .await
        .with_context(|| format!("Failed to load content from {}", source.patterns().join(", ")))
}

/// Show a single record
fn show_record(registry: &Registry, slug: &str, json: bool) -> Result<()> {
    let record = registry.require(slug)?;
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
    } else {
        print_record(registry, record);
    }
    Ok(())
}

/// List records carrying a tag
fn list_tag(registry: &Registry, tag: &str, json: bool) -> Result<()> {
    let records = registry.list_by_tag(tag);
    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else if records.is_empty() {
        println!("No records tagged '{}'", tag);
    } else {
        print_record_table(&records);
    }
    Ok(())
}

/// List all tags with counts
fn list_tags(registry: &Registry) -> Result<()> {
    let tags = registry.tags();
    if tags.is_empty() {
        println!("No tags found");
        return Ok(());
    }

    println!("{:<30} {:>6}", "TAG", "COUNT");
    println!("{}", "-".repeat(37));
    for tag in tags {
        println!("{:<30} {:>6}", tag.tag, tag.count);
    }
    Ok(())
}

/// List sections, optionally with their records
fn list_sections(registry: &Registry, expand: bool) -> Result<()> {
    let sections = registry.list_sections();
    if sections.is_empty() {
        println!("No sections defined");
        return Ok(());
    }

    for section in sections {
        println!("{} ({} records)", section.tag(), section.len());
        if expand {
            for record in registry.section_records(section) {
                println!("  {:<28} {}", record.slug(), record.title());
            }
        }
    }
    Ok(())
}

/// Search titles and tags
fn search(registry: &Registry, query: &str, limit: Option<usize>, json: bool) -> Result<()> {
    let hits = limited_hits(registry, query, limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    if hits.is_empty() {
        println!("No results for '{}'", query);
        return Ok(());
    }

    println!("{:<28} {:<10} {}", "SLUG", "MATCH", "TITLE");
    println!("{}", "-".repeat(70));
    for hit in hits {
        println!(
            "{:<28} {:<10} {}",
            hit.record.slug(),
            hit.rank,
            hit.record.title()
        );
    }
    Ok(())
}

fn limited_hits<'a>(
    registry: &'a Registry,
    query: &str,
    limit: Option<usize>,
) -> Vec<SearchHit<'a>> {
    let mut hits = registry.search_ranked(query);
    if let Some(limit) = limit {
        hits.truncate(limit);
    }
    hits
}

/// Run the validation pass and print its warnings
fn validate(registry: &Registry, config: &ResolvedConfig, strict: bool) -> Result<()> {
    let report = registry.validate(&config.validation);
    let stats = registry.stats();
    println!(
        "Checked {} records in {} sections",
        stats.records, stats.sections
    );

    if report.is_clean() {
        println!("No warnings");
        return Ok(());
    }

    for warning in report.warnings() {
        println!("  warning: {}", warning);
    }
    println!("{} warning(s)", report.len());

    if strict || config.validation.strict {
        anyhow::bail!("Validation failed with {} warning(s)", report.len());
    }
    Ok(())
}

/// Print a record table
fn print_record_table(records: &[&ContentRecord]) {
    println!("{:<28} {:<30} {}", "SLUG", "TITLE", "TAGS");
    println!("{}", "-".repeat(80));
    for record in records {
        println!(
            "{:<28} {:<30} {}",
            record.slug(),
            truncate(record.title(), 30),
            record.tags().join(", ")
        );
    }
}

/// Print one record in full
fn print_record(registry: &Registry, record: &ContentRecord) {
    println!("Slug: {}", record.slug());
    println!("Title: {}", record.title());
    if !record.tags().is_empty() {
        println!("Tags: {}", record.tags().join(", "));
    }
    if !record.libs().is_empty() {
        println!("Libs: {}", record.libs().join(", "));
    }
    if let Some(author) = record.author() {
        match author.url() {
            Some(url) => println!("Author: {} <{}>", author.name(), url),
            None => println!("Author: {}", author.name()),
        }
    }

    let sections: Vec<_> = registry
        .sections_for(record.slug().as_str())
        .iter()
        .map(|s| s.tag())
        .collect();
    if !sections.is_empty() {
        println!("Sections: {}", sections.join(", "));
    }

    println!();
    println!("{}", record.content());
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// Show resolved configuration
fn show_config(config: &ResolvedConfig, source: &ContentSource) -> Result<()> {
    match &config.config_file {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none, using defaults)"),
    }

    println!("Sources:");
    for pattern in source.patterns() {
        println!("  {}", pattern);
    }
    match source.resolve() {
        Ok(files) => println!("Matched files: {}", files.len()),
        Err(e) => println!("Matched files: 0 ({})", e),
    }

    println!(
        "Placeholder markers: {}",
        config.validation.placeholder_markers.join(", ")
    );
    println!("Strict validation: {}", config.validation.strict);
    match config.search_limit {
        Some(limit) => println!("Search limit: {}", limit),
        None => println!("Search limit: (none)"),
    }
    println!("Watch debounce: {}ms", config.watch_debounce.as_millis());

    Ok(())
}

/// Load once, then reload on every relevant file change until ctrl-c
async fn watch(config: &ResolvedConfig, source: ContentSource) -> Result<()> {
    let registry = load_registry(&source).await?;
    let stats = registry.stats();
    println!(
        "Loaded {} records, {} sections, {} tags",
        stats.records, stats.sections, stats.tags
    );

    let shared = SharedRegistry::new(registry);
    let watcher = SourceWatcher::new(source, shared.clone()).with_debounce(config.watch_debounce);
    let (mut events, handle) = watcher.watch().await?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                break;
            }
            event = events.recv() => {
                match event {
                    Some(ReloadEvent::Reloaded { stats }) => println!(
                        "Reloaded: {} records, {} sections, {} tags",
                        stats.records, stats.sections, stats.tags
                    ),
                    Some(ReloadEvent::Failed { error }) => {
                        eprintln!("Reload failed (keeping previous content): {}", error)
                    }
                    None => break,
                }
            }
        }
    }

    handle.stop().await
}
