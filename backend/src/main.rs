//! Strider CLI - load catalog exports into SQLite
//!
//! # Main Commands
//!
//! ```bash
//! strider init-db                                              # Create the tables
//! strider load --model movie --collector csv --source movies.csv
//! strider get --model movie "The Great Escape"                 # Print one entity
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! strider parse --collector csv movies.csv                     # Print raw records
//! strider validate --model author --collector json authors.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use strider::logging::{init_logging, log_error, log_success};
use strider::{
    check, load, Author, Book, Collector, CsvCollector, DatabaseUrl, Entity, EntityKind,
    JsonCollector, Movie, Repository, Review, Store, Stream, User,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "strider")]
#[command(about = "Load movie and book catalog exports into SQLite", long_about = None)]
struct Cli {
    /// Store connection string (default: $DATABASE_URL, then sqlite:///database.db)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Log debug events
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create every entity table
    InitDb,

    /// Collect, validate and upsert one source file
    Load {
        /// Entity kind held by the source
        #[arg(short, long, value_enum)]
        model: Model,

        /// Source format
        #[arg(short, long, value_enum)]
        collector: Format,

        /// Source file
        #[arg(short, long, visible_alias = "config")]
        source: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// Print one stored entity as JSON
    Get {
        /// Entity kind to look up
        #[arg(short, long, value_enum)]
        model: Model,

        /// Primary key (title, email, name or derived id)
        key: String,
    },

    /// Parse a source file and output its raw records as JSON
    Parse {
        /// Source format
        #[arg(short, long, value_enum)]
        collector: Format,

        /// Input file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate and build a source file without writing to the store
    Validate {
        /// Entity kind held by the source
        #[arg(short, long, value_enum)]
        model: Model,

        /// Source format
        #[arg(short, long, value_enum)]
        collector: Format,

        /// Input file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Model {
    #[value(alias = "movies")]
    Movie,
    #[value(alias = "streams")]
    Stream,
    #[value(alias = "users")]
    User,
    #[value(alias = "authors")]
    Author,
    #[value(alias = "books")]
    Book,
    #[value(alias = "reviews")]
    Review,
}

impl From<Model> for EntityKind {
    fn from(model: Model) -> Self {
        match model {
            Model::Movie => EntityKind::Movie,
            Model::Stream => EntityKind::Stream,
            Model::User => EntityKind::User,
            Model::Author => EntityKind::Author,
            Model::Book => EntityKind::Book,
            Model::Review => EntityKind::Review,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let database_url = cli.database_url.as_deref();

    let result = match cli.command {
        Commands::InitDb => cmd_init_db(database_url),

        Commands::Load {
            model,
            collector,
            source,
            delimiter,
        } => cmd_load(database_url, model.into(), collector, &source, delimiter),

        Commands::Get { model, key } => cmd_get(database_url, model.into(), &key),

        Commands::Parse {
            collector,
            input,
            delimiter,
            output,
        } => cmd_parse(collector, &input, delimiter, output.as_deref()),

        Commands::Validate {
            model,
            collector,
            input,
            delimiter,
        } => cmd_validate(model.into(), collector, &input, delimiter),
    };

    if let Err(e) = result {
        log_error(format!("Command failed: {}", e));
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn open_store(database_url: Option<&str>) -> CliResult<Store> {
    let url = DatabaseUrl::resolve(database_url)?;
    Ok(Store::open(&url)?)
}

fn build_collector(
    format: Format,
    path: &Path,
    delimiter: Option<char>,
) -> CliResult<Box<dyn Collector>> {
    let collector: Box<dyn Collector> = match format {
        Format::Csv => {
            let csv = CsvCollector::new(path);
            match delimiter {
                Some(c) => Box::new(csv.with_delimiter(u8::try_from(c)?)),
                None => Box::new(csv.detect_delimiter()),
            }
        }
        Format::Json => Box::new(JsonCollector::new(path)),
    };
    Ok(collector)
}

fn cmd_init_db(database_url: Option<&str>) -> CliResult<()> {
    let store = open_store(database_url)?;
    store.init_schema()?;
    log_success("Schema ready");
    Ok(())
}

fn cmd_load(
    database_url: Option<&str>,
    kind: EntityKind,
    format: Format,
    source: &Path,
    delimiter: Option<char>,
) -> CliResult<()> {
    let collector = build_collector(format, source, delimiter)?;
    let mut store = open_store(database_url)?;

    let report = load(kind, collector.as_ref(), &mut store)?;
    let total = store.count(kind)?;

    println!("Loaded {} from {}", report.kind, report.source.display());
    println!("   Collected: {}", report.collected);
    println!("   Skipped:   {}", report.skipped);
    println!("   Persisted: {}", report.persisted);
    println!("   In table:  {}", total);
    Ok(())
}

fn cmd_get(database_url: Option<&str>, kind: EntityKind, key: &str) -> CliResult<()> {
    let mut store = open_store(database_url)?;

    let found = match kind {
        EntityKind::Movie => find::<Movie>(&mut store, key)?,
        EntityKind::Stream => find::<Stream>(&mut store, key)?,
        EntityKind::User => find::<User>(&mut store, key)?,
        EntityKind::Author => find::<Author>(&mut store, key)?,
        EntityKind::Book => find::<Book>(&mut store, key)?,
        EntityKind::Review => find::<Review>(&mut store, key)?,
    };

    match found {
        Some(json) => {
            println!("{}", json);
            Ok(())
        }
        None => Err(format!("no {} with key '{}'", kind, key).into()),
    }
}

fn find<E: Entity + Serialize>(store: &mut Store, key: &str) -> CliResult<Option<String>> {
    match store.repository::<E>()?.get(key)? {
        Some(entity) => Ok(Some(serde_json::to_string_pretty(&entity)?)),
        None => Ok(None),
    }
}

fn cmd_parse(
    format: Format,
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
) -> CliResult<()> {
    let records = build_collector(format, input, delimiter)?.collect()?;
    eprintln!("Parsed {} records from {}", records.len(), input.display());

    let json = serde_json::to_string_pretty(&records)?;
    write_output(&json, output)?;
    Ok(())
}

fn cmd_validate(
    kind: EntityKind,
    format: Format,
    input: &Path,
    delimiter: Option<char>,
) -> CliResult<()> {
    let collector = build_collector(format, input, delimiter)?;
    let report = check(kind, collector.as_ref())?;

    println!(
        "{} of {} {} record(s) valid, {} skipped",
        report.collected - report.skipped,
        report.collected,
        report.kind,
        report.skipped
    );
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> CliResult<()> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
