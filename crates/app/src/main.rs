mod terminal;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use services::{
    BankLoader, DEFAULT_GROUPS_TABLE, DEFAULT_QUESTIONS_TABLE, QuizSession, QuizSettings,
};
use sheets::{CsvDirectory, PublishedSheet, TableSource};

#[derive(Debug, PartialEq, Eq)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidPageSize { raw: String },
    NoSource,
    ConflictingSources,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidPageSize { raw } => write!(f, "invalid --page-size value: {raw}"),
            ArgsError::NoSource => write!(f, "one of --sheet-id or --csv-dir is required"),
            ArgsError::ConflictingSources => {
                write!(f, "--sheet-id and --csv-dir cannot be combined")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- play   (--sheet-id <id> | --csv-dir <dir>) [options]");
    eprintln!("  cargo run -p app -- groups (--sheet-id <id> | --csv-dir <dir>) [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --questions-table <name>  questions sheet/file (default: questions)");
    eprintln!("  --groups-table <name>     groups sheet/file (default: groups)");
    eprintln!("  --no-groups               do not load a groups table");
    eprintln!("  --page-size <n>           questions per page (default: 10)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_SHEET_ID, QUIZ_CSV_DIR, QUIZ_QUESTIONS_TABLE, QUIZ_GROUPS_TABLE, QUIZ_PAGE_SIZE");
    eprintln!("  RUST_LOG controls log output (e.g. RUST_LOG=debug)");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Groups,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "groups" => Some(Self::Groups),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Sheet(String),
    CsvDir(PathBuf),
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    source: Source,
    questions_table: String,
    groups_table: Option<String>,
    page_size: usize,
}

impl Args {
    /// Parse flags, falling back to `env` for anything not given on the command line.
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut sheet_id = env("QUIZ_SHEET_ID").filter(|v| !v.trim().is_empty());
        let mut csv_dir = env("QUIZ_CSV_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        let mut questions_table =
            env("QUIZ_QUESTIONS_TABLE").unwrap_or_else(|| DEFAULT_QUESTIONS_TABLE.into());
        let mut groups_table =
            Some(env("QUIZ_GROUPS_TABLE").unwrap_or_else(|| DEFAULT_GROUPS_TABLE.into()));
        let mut page_size = match env("QUIZ_PAGE_SIZE") {
            Some(raw) => parse_page_size(raw)?,
            None => QuizSettings::default().page_size(),
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--sheet-id" => {
                    sheet_id = Some(require_value(args, "--sheet-id")?);
                }
                "--csv-dir" => {
                    csv_dir = Some(PathBuf::from(require_value(args, "--csv-dir")?));
                }
                "--questions-table" => {
                    questions_table = require_value(args, "--questions-table")?;
                }
                "--groups-table" => {
                    groups_table = Some(require_value(args, "--groups-table")?);
                }
                "--no-groups" => groups_table = None,
                "--page-size" => {
                    page_size = parse_page_size(require_value(args, "--page-size")?)?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let source = match (sheet_id, csv_dir) {
            (Some(_), Some(_)) => return Err(ArgsError::ConflictingSources),
            (Some(id), None) => Source::Sheet(id),
            (None, Some(dir)) => Source::CsvDir(dir),
            (None, None) => return Err(ArgsError::NoSource),
        };

        Ok(Self {
            source,
            questions_table,
            groups_table,
            page_size,
        })
    }

    fn table_source(&self) -> Arc<dyn TableSource> {
        match &self.source {
            Source::Sheet(id) => Arc::new(PublishedSheet::new(id.clone())),
            Source::CsvDir(dir) => Arc::new(CsvDirectory::new(dir.clone())),
        }
    }
}

fn parse_page_size(raw: String) -> Result<usize, ArgsError> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .filter(|size| *size > 0)
        .ok_or(ArgsError::InvalidPageSize { raw })
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: play when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let parsed = Args::parse(&mut argv.into_iter(), |key| std::env::var(key).ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let loader = BankLoader::new(parsed.table_source())
        .with_questions_table(parsed.questions_table.clone())
        .with_groups_table(parsed.groups_table.clone());
    eprintln!("Loading…");
    let bank = Arc::new(loader.load().await?);
    log::info!(
        "loaded {} questions from {:?}, {} groups from {:?}",
        bank.questions().len(),
        loader.questions_table(),
        bank.groups().len(),
        loader.groups_table()
    );
    if bank.is_empty() {
        eprintln!("No questions found in {:?}.", loader.questions_table());
        return Ok(());
    }

    match cmd {
        Command::Groups => {
            let mut out = std::io::stdout().lock();
            terminal::print_groups(&bank, &mut out)?;
            Ok(())
        }
        Command::Play => {
            let settings = QuizSettings::new(parsed.page_size)?;
            let mut session = QuizSession::new(bank, settings);
            let stdin = std::io::stdin();
            let mut input = stdin.lock();
            let mut out = std::io::stdout().lock();
            terminal::play(&mut session, &mut input, &mut out)?;
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
