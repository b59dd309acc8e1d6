mod aggregate;
mod annotate;
mod gazetteer;
mod keywords;
mod report;
mod store;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use aggregate::LocationIndex;
use gazetteer::Gazetteer;
use keywords::KeywordIndex;
use report::CorpusStats;

const DATA_DIR: &str = "data";
const POEMS_FILE: &str = "poems.json";
const GAZETTEER_FILE: &str = "locations_base.json";
const ANALYZED_FILE: &str = "analyzed_locations.json";
const DEFAULT_TOP: usize = 15;

#[derive(Parser)]
#[command(
    name = "poem_places",
    about = "Place-name annotator for classical poetry"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Annotate the corpus → poems.json + analyzed_locations.json
    Annotate(AnnotateArgs),
    /// Validate the gazetteer and lint its aliases
    Check {
        #[arg(long, default_value_os_t = data_path(GAZETTEER_FILE))]
        gazetteer: PathBuf,
    },
    /// Summary counts from previously written output
    Stats {
        #[arg(long, default_value_os_t = data_path(POEMS_FILE))]
        poems: PathBuf,
        #[arg(long, default_value_os_t = data_path(ANALYZED_FILE))]
        locations: PathBuf,
        /// How many of the most-cited locations to list
        #[arg(long, default_value_t = DEFAULT_TOP)]
        top: usize,
    },
    /// Print the poems citing a place, by name or alias, e.g. "渭城"
    Show {
        name: String,
        #[arg(long, default_value_os_t = data_path(ANALYZED_FILE))]
        locations: PathBuf,
    },
}

#[derive(Args)]
struct AnnotateArgs {
    /// Poem source document
    #[arg(long, default_value_os_t = data_path(POEMS_FILE))]
    poems: PathBuf,
    /// Curated location catalog
    #[arg(long, default_value_os_t = data_path(GAZETTEER_FILE))]
    gazetteer: PathBuf,
    /// Where to write poems with `locations` filled in (default: in place)
    #[arg(long)]
    out_poems: Option<PathBuf>,
    /// Where to write the catalog augmented with `poems`
    #[arg(long, default_value_os_t = data_path(ANALYZED_FILE))]
    out_locations: PathBuf,
    /// Fold into the evidence already in `--out-locations` instead of starting empty
    #[arg(long)]
    merge_existing: bool,
}

impl Default for AnnotateArgs {
    fn default() -> Self {
        AnnotateArgs {
            poems: data_path(POEMS_FILE),
            gazetteer: data_path(GAZETTEER_FILE),
            out_poems: None,
            out_locations: data_path(ANALYZED_FILE),
            merge_existing: false,
        }
    }
}

fn data_path(name: &str) -> PathBuf {
    Path::new(DATA_DIR).join(name)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Command::Annotate(args)) => run_annotate(&args),
        Some(Command::Check { gazetteer }) => run_check(&gazetteer),
        Some(Command::Stats {
            poems,
            locations,
            top,
        }) => run_stats(&poems, &locations, top),
        Some(Command::Show { name, locations }) => run_show(&name, &locations),
        // Default: annotate with the bundled data layout
        None => run_annotate(&AnnotateArgs::default()),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  ANNOTATE
// ═══════════════════════════════════════════════════════════════════════

fn run_annotate(args: &AnnotateArgs) -> Result<ExitCode> {
    let gazetteer = store::read_gazetteer(&args.gazetteer)?;
    let mut poems = store::read_poems(&args.poems)?;

    let keywords = KeywordIndex::build(&gazetteer);
    info!(
        keywords = keywords.len(),
        collisions = keywords.collisions().len(),
        "keyword index built"
    );

    let index = if args.merge_existing && args.out_locations.exists() {
        let previous = store::read_annotated(&args.out_locations)?;
        let seed = LocationIndex::seeded(&previous, &gazetteer);
        aggregate::annotate_corpus_into(seed, &mut poems, &keywords)
    } else {
        aggregate::annotate_corpus(&mut poems, &keywords)
    };
    let annotated = index.into_annotated(&gazetteer);
    let stats = CorpusStats::compute(&poems, &annotated, DEFAULT_TOP);

    let out_poems = args.out_poems.as_deref().unwrap_or(&args.poems);
    store::write_json(out_poems, &poems)?;
    store::write_annotated(&args.out_locations, annotated)?;

    print!("{}", stats.render());
    Ok(ExitCode::SUCCESS)
}

// ═══════════════════════════════════════════════════════════════════════
//  CHECK
// ═══════════════════════════════════════════════════════════════════════

fn run_check(path: &Path) -> Result<ExitCode> {
    let gazetteer = store::read_gazetteer(path)?;
    let issues = gazetteer::lint(&gazetteer);

    let mut defects = 0;
    for issue in &issues {
        if issue.is_defect() {
            defects += 1;
            println!("defect:  {issue}");
        } else {
            println!("warning: {issue}");
        }
    }
    println!(
        "{} location(s), {} defect(s), {} warning(s)",
        gazetteer.len(),
        defects,
        issues.len() - defects
    );

    Ok(if defects > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

// ═══════════════════════════════════════════════════════════════════════
//  STATS
// ═══════════════════════════════════════════════════════════════════════

fn run_stats(poems_path: &Path, locations_path: &Path, top: usize) -> Result<ExitCode> {
    let poems = store::read_poems(poems_path)?;
    let locations = store::read_annotated(locations_path)
        .context("run `annotate` first to produce the analyzed catalog")?;
    print!("{}", CorpusStats::compute(&poems, &locations, top).render());
    Ok(ExitCode::SUCCESS)
}

// ═══════════════════════════════════════════════════════════════════════
//  SHOW
// ═══════════════════════════════════════════════════════════════════════

fn run_show(name: &str, locations_path: &Path) -> Result<ExitCode> {
    let locations = store::read_annotated(locations_path)
        .context("run `annotate` first to produce the analyzed catalog")?;

    let gazetteer = Gazetteer::new(locations.iter().map(|l| l.location.clone()).collect())
        .with_context(|| format!("invalid catalog {}", locations_path.display()))?;

    let Some(loc) = gazetteer.find_by_name(name) else {
        warn!(name, "no location with this name or alias");
        return Ok(ExitCode::FAILURE);
    };
    let Some(found) = locations.iter().find(|l| l.location.id == loc.id) else {
        return Ok(ExitCode::FAILURE);
    };

    println!(
        "── {} ({}) [{}] ── {}",
        loc.name,
        loc.id,
        loc.kind.as_str(),
        loc.modern_name
    );
    if !loc.description.is_empty() {
        println!("{}", loc.description);
    }
    println!("{} poem(s)", found.poems.len());

    for e in &found.poems {
        println!();
        println!("《{}》 {} (#{}, via {})", e.title, e.author, e.poem_id, e.keyword);
        if e.is_title_only() {
            println!("  (title only)");
        }
        for line in &e.relevant_lines {
            println!("  {line}");
        }
    }
    Ok(ExitCode::SUCCESS)
}
