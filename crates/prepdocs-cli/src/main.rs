//! prepdocs — split documents into overlapping sections and index them locally.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use prepdocs_core::IngestConfig;
use prepdocs_ingest::{Ingester, JsonDirSink};

#[derive(Debug, Parser)]
#[command(
    name = "prepdocs",
    version,
    about = "Prepare documents by extracting page text, splitting it into sections, and indexing them",
    after_help = "Example: prepdocs './data/*' --category manuals --index-dir ./index -v"
)]
struct Args {
    /// Files to process (glob patterns allowed)
    #[arg(value_name = "FILE/PATTERN", required_unless_present = "removeall")]
    files: Vec<String>,

    /// Value for the category field of every section indexed in this run
    #[arg(long, env = "PREPDOCS_CATEGORY")]
    category: Option<String>,

    /// Directory holding the local section index
    #[arg(long, env = "PREPDOCS_INDEX_DIR", default_value = "index")]
    index_dir: PathBuf,

    /// JSON configuration file; flags given on the command line take precedence
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum section length in characters
    #[arg(long, env = "PREPDOCS_MAX_SECTION_LENGTH")]
    max_section_length: Option<usize>,

    /// How far past the cut to look for a sentence ending
    #[arg(long, env = "PREPDOCS_SENTENCE_SEARCH_LIMIT")]
    sentence_search_limit: Option<usize>,

    /// Characters repeated between consecutive sections
    #[arg(long, env = "PREPDOCS_SECTION_OVERLAP")]
    section_overlap: Option<usize>,

    /// Sections handed to the index per batch
    #[arg(long)]
    batch_size: Option<usize>,

    /// Remove sections of the given files from the index instead of indexing them
    #[arg(long, conflicts_with = "removeall")]
    remove: bool,

    /// Remove every section from the index
    #[arg(long)]
    removeall: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Start from defaults or the config file, then apply command line overrides.
    fn ingest_config(&self) -> Result<IngestConfig> {
        let mut config = match &self.config {
            Some(path) => IngestConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => IngestConfig::default(),
        };
        if let Some(v) = self.max_section_length {
            config.split.max_section_length = v;
        }
        if let Some(v) = self.sentence_search_limit {
            config.split.sentence_search_limit = v;
        }
        if let Some(v) = self.section_overlap {
            config.split.section_overlap = v;
        }
        if let Some(v) = self.batch_size {
            config.batch_size = v;
        }
        if self.category.is_some() {
            config.category = self.category.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

/// Resolve file patterns to existing files, sorted and deduplicated.
///
/// A pattern that matches no regular file is skipped with a warning.
fn resolve_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let paths =
            glob::glob(pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))?;
        let before = files.len();
        for path in paths {
            let path = path.with_context(|| format!("Error resolving pattern: {}", pattern))?;
            if path.is_file() {
                files.push(path);
            }
        }
        if files.len() == before {
            warn!("No files matched pattern: {}", pattern);
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn process_file(ingester: &mut Ingester<'_, JsonDirSink>, path: &Path, remove: bool) -> Result<()> {
    info!("Processing '{}'", path.display());
    if remove {
        ingester.remove_file(path)?;
    } else {
        ingester.ingest_file(path)?;
    }
    Ok(())
}

fn run(args: &Args) -> Result<bool> {
    let config = args.ingest_config()?;
    let mut sink = JsonDirSink::open(&args.index_dir)
        .with_context(|| format!("Failed to open index {}", args.index_dir.display()))?;
    info!("Index directory: {}", sink.root().display());

    let mut ingester = Ingester::new(&mut sink, config)?;
    if args.removeall {
        ingester.remove_all()?;
        return Ok(true);
    }

    let files = resolve_patterns(&args.files)?;
    if files.is_empty() {
        anyhow::bail!("No files found matching the provided patterns");
    }

    info!("Processing {} file(s)...", files.len());
    let mut ok = true;
    for path in &files {
        if let Err(e) = process_file(&mut ingester, path, args.remove) {
            error!("Failed to process {}: {:#}", path.display(), e);
            ok = false;
        }
    }
    Ok(ok)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if !run(&args)? {
        std::process::exit(1);
    }
    Ok(())
}
