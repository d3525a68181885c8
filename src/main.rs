use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use log::{debug, info};
use logstore::{DefaultFormatter, Filter, Formatter, Level, SqliteStore};

#[derive(Parser)]
#[command(name = "logstore")]
#[command(about = "Query records from a SQLite log store", long_about = None)]
struct Cli {
    #[arg(short = 'd', long = "database", env = "LOGSTORE_DATABASE")]
    database: String,

    /// Repeat to match any of several levels
    #[arg(short = 'l', long = "level")]
    levels: Vec<Level>,

    /// LIKE pattern, use % as wildcard
    #[arg(short = 'm', long = "message")]
    message: Option<String>,

    #[arg(long = "function")]
    function: Option<String>,

    #[arg(short = 'f', long = "file")]
    file: Option<String>,

    #[arg(short = 's', long = "system")]
    system: Option<String>,

    #[arg(long = "line")]
    line: Option<u32>,

    /// RFC 3339 timestamp, inclusive
    #[arg(long = "since")]
    since: Option<DateTime<Utc>>,

    /// RFC 3339 timestamp, inclusive
    #[arg(long = "until")]
    until: Option<DateTime<Utc>>,

    /// Print only the number of matching records
    #[arg(short = 'c', long = "count")]
    count: bool,

    #[arg(long = "log-level", default_value = "warn", env = "LOG_LEVEL")]
    log_level: String,
}

impl Cli {
    fn filters(&self) -> Vec<Filter> {
        let mut filters = Vec::new();

        if self.since.is_some() || self.until.is_some() {
            filters.push(Filter::DateRange {
                start: self.since,
                end: self.until,
            });
        }
        if let Some(levels) = Filter::any_of(self.levels.iter().copied().map(Filter::Level)) {
            filters.push(levels);
        }
        if let Some(pattern) = &self.message {
            filters.push(Filter::Message(pattern.clone()));
        }
        if let Some(pattern) = &self.function {
            filters.push(Filter::Function(pattern.clone()));
        }
        if let Some(pattern) = &self.file {
            filters.push(Filter::File(pattern.clone()));
        }
        if let Some(pattern) = &self.system {
            filters.push(Filter::System(pattern.clone()));
        }
        if let Some(line) = self.line {
            filters.push(Filter::Line(line));
        }

        filters
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let log_level = match args.log_level.to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Warn,
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp_secs()
        .init();

    let store = SqliteStore::open(&args.database)
        .with_context(|| format!("Failed to open log store: {}", args.database))?;

    let filters = args.filters();
    debug!("Querying with filters: {:?}", filters);

    let records = store
        .query(&filters)
        .context("Failed to query log store")?;
    info!("{} records matched", records.len());

    if args.count {
        println!("{}", records.len());
    } else {
        for record in &records {
            println!("{}", DefaultFormatter.format(record));
        }
    }

    Ok(())
}
