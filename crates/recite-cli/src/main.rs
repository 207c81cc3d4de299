use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use recite_core::abbrev::WosSource;
use recite_core::config_file::{self, ConfigFile};
use recite_core::{
    AbbreviationResolver, ArticleRecord, Citation, CitationExtractor, CitationGenerator, Corpus,
    MatchAnnotator, MatchConfig,
};

mod output;

use output::ColorMode;

const MAX_DISTANCE_ENV: &str = "RECITE_MAX_EDIT_DISTANCE";

/// Re-cite - Mark citations of retracted articles in text
#[derive(Parser, Debug)]
#[command(name = "recite", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mark citations of retracted articles in a text
    Annotate {
        /// Text file to annotate (`-` or omitted for stdin)
        input: Option<PathBuf>,

        /// JSON array of retracted article records
        #[arg(long)]
        articles: PathBuf,

        /// JSON array of additional citations ({"value", "article_id"})
        #[arg(long)]
        citations: Option<PathBuf>,

        /// Maximum edit distance for approximate matches
        #[arg(long, allow_negative_numbers = true)]
        max_distance: Option<i64>,

        /// Do not look up journal abbreviations
        #[arg(long)]
        no_abbreviations: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Print every citation generated for the article records
    Cite {
        /// JSON array of retracted article records
        #[arg(long)]
        articles: PathBuf,

        /// Do not look up journal abbreviations
        #[arg(long)]
        no_abbreviations: bool,
    },

    /// Dry run: print citation candidates found in a text without matching
    Extract {
        /// Text file to scan (`-` or omitted for stdin)
        input: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays clean for piping.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let file_config = config_file::load_config().context("failed to load config file")?;

    match cli.command {
        Command::Annotate {
            input,
            articles,
            citations,
            max_distance,
            no_abbreviations,
            no_color,
        } => {
            annotate(
                input,
                &articles,
                citations.as_deref(),
                max_distance,
                no_abbreviations,
                ColorMode(!no_color),
                &file_config,
            )
            .await
        }
        Command::Cite {
            articles,
            no_abbreviations,
        } => cite(&articles, no_abbreviations, &file_config).await,
        Command::Extract { input, no_color } => extract(input, ColorMode(!no_color)),
    }
}

async fn annotate(
    input: Option<PathBuf>,
    articles: &Path,
    citations: Option<&Path>,
    max_distance: Option<i64>,
    no_abbreviations: bool,
    color: ColorMode,
    file_config: &ConfigFile,
) -> anyhow::Result<()> {
    let config = resolve_match_config(max_distance, file_config)?;
    let text = read_input(input.as_deref())?;
    let records = load_records(articles)?;
    let extra = match citations {
        Some(path) => load_citations(path)?,
        None => Vec::new(),
    };

    let generator = citation_generator(no_abbreviations, file_config);
    let corpus = Corpus::from_records(&records, &generator)
        .await
        .with_citations(extra);

    let annotation = MatchAnnotator::new(config).annotate(&text, &corpus);

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(annotation.text_or(&text).as_bytes())?;
    stdout.flush()?;

    let mut stderr = std::io::stderr().lock();
    output::print_annotation_summary(&mut stderr, &annotation, color)?;
    Ok(())
}

async fn cite(
    articles: &Path,
    no_abbreviations: bool,
    file_config: &ConfigFile,
) -> anyhow::Result<()> {
    let records = load_records(articles)?;
    let generator = citation_generator(no_abbreviations, file_config);

    let mut stdout = std::io::stdout().lock();
    for record in &records {
        for citation in generator.generate(record).await {
            output::print_citation(&mut stdout, &citation)?;
        }
    }
    Ok(())
}

fn extract(input: Option<PathBuf>, color: ColorMode) -> anyhow::Result<()> {
    let text = read_input(input.as_deref())?;
    let candidates = CitationExtractor::default().extract(&text);

    let mut stdout = std::io::stdout().lock();
    output::print_candidates(&mut stdout, &candidates, color)?;
    Ok(())
}

/// CLI flag > environment > config file > default.
fn resolve_match_config(flag: Option<i64>, file_config: &ConfigFile) -> anyhow::Result<MatchConfig> {
    if let Some(distance) = flag {
        return MatchConfig::new(distance).context("invalid --max-distance");
    }
    if let Ok(value) = std::env::var(MAX_DISTANCE_ENV) {
        return MatchConfig::parse(&value).with_context(|| format!("invalid {MAX_DISTANCE_ENV}"));
    }
    Ok(file_config.match_config()?)
}

fn citation_generator(no_abbreviations: bool, file_config: &ConfigFile) -> CitationGenerator {
    if no_abbreviations || !file_config.abbreviations_enabled() {
        return CitationGenerator::new();
    }

    let settings = file_config.abbreviations.clone().unwrap_or_default();
    let mut resolver = match settings.url_template {
        Some(template) => {
            AbbreviationResolver::new(Arc::new(WosSource::new(reqwest::Client::new(), template)))
        }
        None => AbbreviationResolver::web_of_science(),
    };
    if let Some(secs) = settings.timeout_secs {
        resolver = resolver.with_timeout(Duration::from_secs(secs));
    }
    CitationGenerator::with_abbreviator(Arc::new(resolver))
}

/// Read a file, or stdin for `None` / `-`.
fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(p) if p != Path::new("-") => {
            if !p.exists() {
                anyhow::bail!("File not found: {}", p.display());
            }
            std::fs::read_to_string(p).with_context(|| format!("failed to read {}", p.display()))
        }
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

fn load_records(path: &Path) -> anyhow::Result<Vec<ArticleRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let records: Vec<ArticleRecord> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of article records", path.display()))?;
    tracing::info!(path = %path.display(), records = records.len(), "loaded article records");
    Ok(records)
}

fn load_citations(path: &Path) -> anyhow::Result<Vec<Citation>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of citations", path.display()))
}
