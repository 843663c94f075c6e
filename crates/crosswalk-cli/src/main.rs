//! crosswalk - cross-references a repealed legal code against its replacement.

use std::path::PathBuf;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use crosswalk_core::CodeFamily;
use crosswalk_match::{DiffRatioScorer, MappingEngine, MatchConfig};
use crosswalk_source::{DocumentSource, FileSource, HttpSource};
use crosswalk_store::{RecordStore, SqliteStore};

mod display;
mod pipeline;

use pipeline::{PipelineOptions, run_pipeline};

/// Map sections of an old legal code onto its replacement.
#[derive(Parser, Debug)]
#[command(name = "crosswalk")]
#[command(version, about, long_about = None)]
struct Cli {
    /// SQLite database path
    #[arg(long, env = "CROSSWALK_DB", default_value = "crosswalk.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch both codes, extract sections, and compute mappings
    Run {
        /// Read the old code from a local file
        #[arg(long)]
        old_file: Option<PathBuf>,

        /// Read the new code from a local file
        #[arg(long)]
        new_file: Option<PathBuf>,

        /// Fetch the old code over HTTP
        #[arg(long)]
        old_url: Option<String>,

        /// Fetch the new code over HTTP
        #[arg(long)]
        new_url: Option<String>,

        /// Effective date stamped on old-code sections (YYYY-MM-DD)
        #[arg(long)]
        old_effective: Option<NaiveDate>,

        /// Effective date stamped on new-code sections (YYYY-MM-DD)
        #[arg(long)]
        new_effective: Option<NaiveDate>,

        /// Weight of title similarity in the combined score
        #[arg(long, default_value_t = MatchConfig::default().title_weight)]
        title_weight: f64,

        /// Weight of body similarity in the combined score
        #[arg(long, default_value_t = MatchConfig::default().body_weight)]
        body_weight: f64,

        /// Best matches scoring at or below this are dropped
        #[arg(long, default_value_t = MatchConfig::default().min_score)]
        min_score: f64,

        /// Mappings scoring above this count as direct carry-overs
        #[arg(long, default_value_t = MatchConfig::default().direct_threshold)]
        direct_threshold: f64,
    },

    /// List stored sections of one code family
    Sections {
        /// Which family to list
        family: FamilyArg,

        /// Emit JSON instead of cards
        #[arg(long)]
        json: bool,
    },

    /// Search section bodies for a substring
    Search {
        /// Text to look for (case-insensitive)
        query: String,

        /// Maximum number of results
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Emit JSON instead of cards
        #[arg(long)]
        json: bool,
    },

    /// Show mappings out of one old-code section
    Mappings {
        /// Old-code section number, e.g. 302
        section_number: String,

        /// Emit JSON instead of cards
        #[arg(long)]
        json: bool,
    },

    /// Row counts for the stored tables
    Stats,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FamilyArg {
    Old,
    New,
}

impl From<FamilyArg> for CodeFamily {
    fn from(value: FamilyArg) -> Self {
        match value {
            FamilyArg::Old => CodeFamily::Old,
            FamilyArg::New => CodeFamily::New,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut store = SqliteStore::open_persistent(&cli.db)?;

    match cli.command {
        Commands::Run {
            old_file,
            new_file,
            old_url,
            new_url,
            old_effective,
            new_effective,
            title_weight,
            body_weight,
            min_score,
            direct_threshold,
        } => {
            let source = document_source(old_file, new_file, old_url, new_url)?;
            let config = MatchConfig {
                title_weight,
                body_weight,
                min_score,
                direct_threshold,
            };
            let engine = MappingEngine::new(DiffRatioScorer, config);
            let options = PipelineOptions {
                old_effective,
                new_effective,
            };
            let report = run_pipeline(source.as_ref(), &mut store, &engine, &options).await?;
            display::print_report(&report);
        }

        Commands::Sections { family, json } => {
            let sections = store.list_sections(family.into())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sections)?);
            } else {
                for section in &sections {
                    display::print_section(section);
                }
                println!("{} section(s)", sections.len());
            }
        }

        Commands::Search { query, limit, json } => {
            let sections = store.search_sections(&query, limit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sections)?);
            } else {
                for section in &sections {
                    display::print_section(section);
                }
                println!("{} match(es)", sections.len());
            }
        }

        Commands::Mappings {
            section_number,
            json,
        } => {
            let Some(section) = store.find_section(CodeFamily::Old, &section_number)? else {
                bail!("no old-code section {section_number} in the store");
            };
            let mut rows = Vec::new();
            for mapping in store.mappings_for_source(section.id)? {
                let target = store.get_section(mapping.target_id)?;
                rows.push((mapping, target));
            }
            if json {
                let value: Vec<_> = rows
                    .iter()
                    .map(|(mapping, target)| {
                        serde_json::json!({ "mapping": mapping, "target": target })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                display::print_mappings(&section, &rows);
            }
        }

        Commands::Stats => {
            println!("  {:<14} {}", "old sections", store.section_count(CodeFamily::Old)?);
            println!("  {:<14} {}", "new sections", store.section_count(CodeFamily::New)?);
            println!("  {:<14} {}", "mappings", store.mapping_count()?);
        }
    }

    Ok(())
}

/// Build the document source from the flag pairs: both files or both URLs.
fn document_source(
    old_file: Option<PathBuf>,
    new_file: Option<PathBuf>,
    old_url: Option<String>,
    new_url: Option<String>,
) -> Result<Box<dyn DocumentSource>> {
    match (old_file, new_file, old_url, new_url) {
        (Some(old), Some(new), None, None) => Ok(Box::new(FileSource::new(old, new))),
        (None, None, Some(old), Some(new)) => Ok(Box::new(HttpSource::new(old, new)?)),
        _ => bail!("pass --old-file with --new-file, or --old-url with --new-url"),
    }
}
