//! Skuforge CLI
//!
//! Command-line interface for:
//! - Generating a synthetic catalog (`data/items.csv` + `data/variations.csv`)
//! - Restyling, renaming and image-localizing passes over an existing catalog
//! - Integrity checks and substring search

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use skuforge_core::search::brands;
use skuforge_core::{
    search, CatalogConfig, CatalogError, CatalogStore, ImageResolver, ImageSubject,
    IntegrityReport, PassOutcome, SearchQuery, Style,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "skuforge")]
#[command(author, version, about = "Skuforge: deterministic synthetic product catalogs")]
struct Cli {
    /// Catalog root (overrides `root` from the config file).
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// JSON configuration file; every field is optional.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level for stderr diagnostics (`RUST_LOG` takes precedence).
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discard and regenerate both tables.
    Generate {
        /// Number of parent items.
        #[arg(long, default_value_t = 5000)]
        count: usize,

        /// Catalog seed salting attribute draws (names ignore it).
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Restyle names, descriptions, urls and images of every item.
    Refresh {
        /// Naming style [default: brand, or `generator.style` from --config]
        #[arg(long, value_enum)]
        style: Option<StyleArg>,
    },

    /// Rename items with the trail lexicon and rebuild variation names.
    ImproveNames,

    /// Replace external placeholder images on variations with local renders.
    LocalizeImages,

    /// Check referential and uniqueness integrity of both tables.
    Validate {
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Case-insensitive substring search over items.
    Search {
        query: String,

        /// Only items of this exact brand.
        #[arg(long)]
        brand: Option<String>,

        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Also resolve each match's display image.
        #[arg(long)]
        images: bool,
    },

    /// List the distinct brands in the item table.
    Brands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StyleArg {
    Brand,
    Adjective,
    Casual,
    Premium,
}

impl From<StyleArg> for Style {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Brand => Style::Brand,
            StyleArg::Adjective => Style::Adjective,
            StyleArg::Casual => Style::Casual,
            StyleArg::Premium => Style::Premium,
        }
    }
}

/// Logs go to stderr; stdout carries the human summaries.
fn initialize_tracing(log_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<CatalogConfig> {
    let mut config = CatalogConfig::load(cli.config.as_deref())?;
    if let Some(root) = &cli.root {
        config.root = root.clone();
    }
    tracing::debug!(root = %config.root.display(), "configuration loaded");
    Ok(config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    initialize_tracing(cli.log_level);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            if let Some(CatalogError::MissingTable { .. }) = err.downcast_ref::<CatalogError>() {
                eprintln!("{} {err}", "✗".red().bold());
            } else {
                eprintln!("{} {err:#}", "error:".red().bold());
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = load_config(&cli)?;
    let store = CatalogStore::new(config.layout());

    match cli.command {
        Commands::Generate { count, seed } => {
            if let Some(seed) = seed {
                config.generator.catalog_seed = seed;
            }
            cmd_generate(&store, &config, count)?;
        }
        Commands::Refresh { style } => {
            let style = style.map(Style::from).unwrap_or(config.generator.style);
            cmd_refresh(&store, &config, style)?;
        }
        Commands::ImproveNames => cmd_improve_names(&store, &config)?,
        Commands::LocalizeImages => cmd_localize_images(&store, &config)?,
        Commands::Validate { json } => return cmd_validate(&store, json),
        Commands::Search {
            query,
            brand,
            limit,
            images,
        } => cmd_search(&store, &config, &query, brand, limit, images)?,
        Commands::Brands => cmd_brands(&store)?,
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_generate(store: &CatalogStore, config: &CatalogConfig, count: usize) -> Result<()> {
    println!(
        "{} {} items (seed {})",
        "Generating".green().bold(),
        count,
        config.generator.catalog_seed
    );
    let catalog = store.regenerate(config, count)?;
    println!(
        "  {} {} ({} items)",
        "→".cyan(),
        store.layout().items_csv().display(),
        catalog.items.len()
    );
    println!(
        "  {} {} ({} variations)",
        "→".cyan(),
        store.layout().variations_csv().display(),
        catalog.variations.len()
    );
    Ok(())
}

fn cmd_refresh(store: &CatalogStore, config: &CatalogConfig, style: Style) -> Result<()> {
    println!("{} catalog ({style} style)", "Refreshing".green().bold());
    let images = skuforge_render::image_store(config);
    let outcome = store.refresh(config, &images, style)?;
    print_outcome(store, &outcome);
    println!(
        "  {} {} images rendered, {} reused ({} renderer)",
        "→".yellow(),
        images.rendered(),
        images.reused(),
        images.rasterizer().renderer_name()
    );
    Ok(())
}

fn cmd_improve_names(store: &CatalogStore, config: &CatalogConfig) -> Result<()> {
    println!("{} item names", "Improving".green().bold());
    let outcome = store.improve_names(config)?;
    print_outcome(store, &outcome);
    Ok(())
}

fn cmd_localize_images(store: &CatalogStore, config: &CatalogConfig) -> Result<()> {
    println!("{} variation images", "Localizing".green().bold());
    let images = skuforge_render::image_store(config);
    let outcome = store.localize_images(config, &images)?;
    if outcome.rows_rewritten == 0 {
        println!("  {} no external placeholders found", "→".yellow());
        return Ok(());
    }
    print_outcome(store, &outcome);
    println!(
        "  {} {} rows rewritten, {} images rendered",
        "→".yellow(),
        outcome.rows_rewritten,
        images.rendered()
    );
    Ok(())
}

fn print_outcome(store: &CatalogStore, outcome: &PassOutcome) {
    let tables = [
        (outcome.items_changed, store.layout().items_csv()),
        (outcome.variations_changed, store.layout().variations_csv()),
    ];
    for (changed, path) in tables {
        let status = if changed {
            "updated".green()
        } else {
            "unchanged".dimmed()
        };
        println!("  {} {} ({status})", "→".cyan(), path.display());
    }
    if outcome.backups_written > 0 {
        println!("  {} {} backup(s) written", "→".yellow(), outcome.backups_written);
    }
    for check in outcome.regressions() {
        println!("  {} pass introduced {check}", "!".red().bold());
    }
}

fn cmd_validate(store: &CatalogStore, json: bool) -> Result<ExitCode> {
    let report = store.validate()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(if report.is_pass() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_report(report: &IntegrityReport) {
    println!(
        "{} {} items, {} variations",
        "Checked".green().bold(),
        report.item_count,
        report.variation_count
    );
    for (check, count) in report.checks() {
        let mark = if count == 0 { "✓".green() } else { "✗".red() };
        println!("  {mark} {check}: {count}");
    }
    if report.is_pass() {
        println!("{}", "ok".green().bold());
    } else {
        println!(
            "{} {} check(s) failed",
            "failed".red().bold(),
            report.failed_checks()
        );
    }
}

fn cmd_search(
    store: &CatalogStore,
    config: &CatalogConfig,
    query: &str,
    brand: Option<String>,
    limit: usize,
    images: bool,
) -> Result<()> {
    let items = store.load_items()?;
    let mut q = SearchQuery::new(query);
    if let Some(brand) = brand {
        q = q.with_brand(brand);
    }
    let matches = search(&items, &q);
    println!(
        "{} {} match(es) for {:?}",
        "Found".green().bold(),
        matches.len(),
        query
    );

    let cache = images.then(|| skuforge_render::image_store(config));
    let resolver = cache
        .as_ref()
        .map(|cache| ImageResolver::new(config, cache));
    for item in matches.into_iter().take(limit) {
        println!(
            "  {} {} {} {}",
            item.id.dimmed(),
            item.item_name.bold(),
            format!("${}", item.price).yellow(),
            item.brand.cyan()
        );
        if let Some(resolver) = &resolver {
            let image = resolver.resolve(&ImageSubject::from(item))?;
            println!("      {} {}", "→".cyan(), image.as_str());
        }
    }
    Ok(())
}

fn cmd_brands(store: &CatalogStore) -> Result<()> {
    let items = store.load_items()?;
    for brand in brands(&items) {
        println!("{brand}");
    }
    Ok(())
}
