use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use namaste_bridge::config::{self, PipelineConfig};
use namaste_bridge::pipeline::bundle;
use namaste_bridge::pipeline::mapping::MappingEngine;
use namaste_bridge::pipeline::{
    MappingProcessor, ProcessingError, ProgressEvent, ReferenceIndex, RunHooks, SqliteMappingStore,
};

fn main() -> ExitCode {
    let command = match parse_args() {
        Ok(command) => command,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };

    namaste_bridge::init_tracing();
    tracing::info!("{} v{}", config::APP_NAME, config::APP_VERSION);

    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

enum Command {
    Process(ProcessArgs),
    Search {
        query: String,
        limit: usize,
        reference: Option<PathBuf>,
    },
}

struct ProcessArgs {
    input: PathBuf,
    email: String,
    user: String,
    db: PathBuf,
    out: Option<PathBuf>,
    reference: Option<PathBuf>,
    batch_size: Option<usize>,
}

fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Search {
            query,
            limit,
            reference,
        } => {
            let engine = MappingEngine::with_default_targets(load_index(reference)?);
            let hits = engine.search(&query, limit);
            if hits.is_empty() {
                eprintln!("no reference codes match '{query}'");
            }
            for hit in hits {
                println!(
                    "{}\t{}\t{}\t{}\t{:.2}",
                    hit.source_code,
                    hit.source_term,
                    hit.secondary_code.as_deref().unwrap_or("-"),
                    hit.tertiary_code.as_deref().unwrap_or("-"),
                    hit.confidence_score
                );
            }
            Ok(())
        }
        Command::Process(args) => process(args),
    }
}

fn process(args: ProcessArgs) -> Result<(), String> {
    let engine = MappingEngine::with_default_targets(load_index(args.reference)?);
    let config = PipelineConfig {
        batch_size: args.batch_size,
        ..PipelineConfig::default()
    };
    let processor = MappingProcessor::new(engine, config);
    let store = SqliteMappingStore::open(&args.db).map_err(|e| e.to_string())?;

    let report = |event: ProgressEvent| match event {
        ProgressEvent::Mapped { completed, total } => {
            tracing::debug!(completed, total, "progress");
        }
        ProgressEvent::Parsed {
            total_rows,
            delimiter,
            ..
        } => {
            tracing::info!(rows = total_rows, delimiter = %delimiter, "parsed input");
        }
        _ => {}
    };
    let hooks = RunHooks {
        progress: Some(&report),
        cancel: None,
    };

    let output = match processor.process_file(&store, &args.input, &args.user, &args.email, hooks) {
        Ok(output) => output,
        Err(ProcessingError::Persistence { source, results }) => {
            // Mapping succeeded; still hand the bundle to the caller.
            eprintln!("warning: results not saved: {source}");
            write_bundle(&bundle::generate(&results, &args.email), args.out.as_ref())?;
            return Err(format!("{} rows mapped but not persisted", results.len()));
        }
        Err(e) => return Err(e.to_string()),
    };

    write_bundle(&output.bundle, args.out.as_ref())?;
    eprintln!("{}", output.summary);
    eprintln!("file id: {}", output.file_id);
    Ok(())
}

fn load_index(reference: Option<PathBuf>) -> Result<Arc<ReferenceIndex>, String> {
    let index = match reference {
        Some(path) => ReferenceIndex::load(&path),
        None => ReferenceIndex::bundled(),
    }
    .map_err(|e| e.to_string())?;
    Ok(Arc::new(index))
}

fn write_bundle(bundle: &bundle::Bundle, out: Option<&PathBuf>) -> Result<(), String> {
    let json = bundle::to_json_pretty(bundle).map_err(|e| format!("failed to serialize bundle: {e}"))?;
    match out {
        Some(path) => std::fs::write(path, json)
            .map_err(|e| format!("failed to write {}: {e}", path.display())),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

fn parse_args() -> Result<Command, String> {
    let mut input: Option<PathBuf> = None;
    let mut email: Option<String> = None;
    let mut user = "local".to_string();
    let mut db: Option<PathBuf> = None;
    let mut out: Option<PathBuf> = None;
    let mut reference: Option<PathBuf> = None;
    let mut batch_size: Option<usize> = None;
    let mut search: Option<String> = None;
    let mut limit = config::DEFAULT_SEARCH_LIMIT;
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("{}", help_text());
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("{} {}", config::APP_NAME, config::APP_VERSION);
                std::process::exit(0);
            }
            "--email" => email = Some(value(&mut args, "--email")?),
            "--user" => user = value(&mut args, "--user")?,
            "--db" => db = Some(value(&mut args, "--db")?.into()),
            "--out" | "-o" => out = Some(value(&mut args, "--out")?.into()),
            "--reference" => reference = Some(value(&mut args, "--reference")?.into()),
            "--search" => search = Some(value(&mut args, "--search")?),
            "--batch-size" => batch_size = Some(number(&value(&mut args, "--batch-size")?, "--batch-size")?),
            "--limit" => limit = number(&value(&mut args, "--limit")?, "--limit")?,
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(arg.into());
            }
        }
    }

    if let Some(query) = search {
        return Ok(Command::Search {
            query,
            limit,
            reference,
        });
    }

    let input = input.ok_or_else(|| format!("error: no input file\n\n{}", help_text()))?;
    let email = email.ok_or_else(|| "error: --email is required when processing a file".to_string())?;

    Ok(Command::Process(ProcessArgs {
        input,
        email,
        user,
        db: db.unwrap_or_else(config::database_path),
        out,
        reference,
        batch_size,
    }))
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    args.next().ok_or_else(|| format!("error: {flag} expects a value"))
}

fn number(raw: &str, flag: &str) -> Result<usize, String> {
    raw.parse()
        .map_err(|_| format!("error: invalid {flag} '{raw}' (expected a positive integer)"))
}

fn help_text() -> String {
    format!(
        "{name} {version}

Map NAMASTE codes to ICD-11 TM2 / Biomedicine and emit a FHIR bundle.

USAGE:
    {name} <input.csv> --email <addr> [OPTIONS]
    {name} --search <query> [--limit N]

OPTIONS:
    --email <addr>       Submitter email placed in the bundle contact
    --user <id>          Owner of the upload record (default: local)
    --db <path>          Mapping database (default: {db})
    -o, --out <path>     Write the bundle here instead of stdout (e.g. {bundle})
    --reference <path>   NAMC dataset JSON to use instead of the bundled one
    --batch-size <N>     Rows mapped between progress events
    --search <query>     Search the reference codes instead of processing a file
    --limit <N>          Maximum search hits (default: {limit})
    -h, --help           Print help
    -V, --version        Print version

Logging is controlled by RUST_LOG (default: {filter}).",
        name = config::APP_NAME,
        version = config::APP_VERSION,
        db = config::database_path().display(),
        bundle = config::DEFAULT_BUNDLE_FILENAME,
        limit = config::DEFAULT_SEARCH_LIMIT,
        filter = config::default_log_filter(),
    )
}
