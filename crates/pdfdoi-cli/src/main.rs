use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use pdfdoi_core::citation::DEFAULT_TIMEOUT;
use pdfdoi_core::config_file;
use pdfdoi_core::{CitationSource, CrossRef, Scanner};
use pdfdoi_pdf_mupdf::MupdfBackend;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod output;

use output::ColorMode;

/// Extract the DOI or arXiv ID from PDF files.
///
/// Prints one `<identifier>\t<path>` line per file, or `?\t<path>` when
/// nothing is found.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// PDF files to scan
    files: Vec<PathBuf>,

    /// Number of leading pages to look for an identifier (default: 5)
    #[arg(long)]
    max_page: Option<usize>,

    /// Tolerable margin between fragmented text objects, in units of the
    /// preceding fragment's smaller dimension (default: 1)
    #[arg(long)]
    space_tol: Option<f32>,

    /// Fetch and print a BibTeX record for every identifier found
    #[arg(long)]
    bibtex: bool,

    /// Contact address sent to CrossRef with --bibtex
    #[arg(long)]
    mailto: Option<String>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let args = Args::parse();

    // Resolve configuration: CLI flags > env vars > config file > defaults
    let file_config = config_file::load_config();
    let mut builder = file_config.scan_builder();
    if let Some(n) = args.max_page.or_else(|| env_parse("PDFDOI_MAX_PAGE")) {
        builder = builder.max_pages(n);
    }
    if let Some(tol) = args.space_tol.or_else(|| env_parse("PDFDOI_SPACE_TOL")) {
        builder = builder.tolerance(tol);
    }
    let scanner = Scanner::new(builder.build()?);

    let crossref_config = file_config.crossref.unwrap_or_default();
    let mailto = args
        .mailto
        .or_else(|| std::env::var("CROSSREF_MAILTO").ok())
        .or(crossref_config.mailto);
    let timeout = env_parse("PDFDOI_TIMEOUT")
        .or(crossref_config.timeout_secs)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);

    let citation = if args.bibtex {
        Some((CrossRef::new(mailto), reqwest::Client::new()))
    } else {
        None
    };

    let color = ColorMode(!args.no_color && std::io::stdout().is_terminal());
    let backend = MupdfBackend::default();

    let cancel = CancellationToken::new();

    // First Ctrl+C stops after the current file, a second one exits at once
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if let Some(code) = watch_interrupts(cancel_clone, tokio::signal::ctrl_c).await {
            std::process::exit(code);
        }
    });

    let mut out = std::io::stdout().lock();

    for path in &args.files {
        if cancel.is_cancelled() {
            tracing::warn!("interrupted, skipping remaining files");
            break;
        }

        let found = match scanner.scan_path(&backend, path) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to scan");
                None
            }
        };

        if !still_open(output::print_result(&mut out, path, found.as_ref(), color))? {
            return Ok(());
        }

        if let (Some(id), Some((source, client))) = (&found, &citation) {
            let record = tokio::select! {
                record = source.fetch(id, client, timeout) => record,
                _ = cancel.cancelled() => break,
            };
            if let Err(e) = &record {
                tracing::warn!(%id, source = source.name(), error = %e, "citation lookup failed");
            }
            if !still_open(output::print_citation(&mut out, &record, color))? {
                return Ok(());
            }
        }
    }

    still_open(out.flush())?;
    Ok(())
}

/// Log to stderr so stdout stays a clean result stream.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Exit status of a process killed by SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Cancel `cancel` on the first interrupt and return an exit code on the
/// second. Returns `None` if the signal listener fails.
async fn watch_interrupts<F, Fut>(cancel: CancellationToken, mut interrupt: F) -> Option<i32>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    interrupt().await.ok()?;
    tracing::warn!("interrupted, finishing current file (press Ctrl+C again to quit)");
    cancel.cancel();
    interrupt().await.ok()?;
    Some(INTERRUPTED_EXIT_CODE)
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable environment variable");
            None
        }
    }
}

/// `Ok(false)` once the reader of stdout has gone away.
fn still_open(result: std::io::Result<()>) -> std::io::Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(false),
        Err(e) => Err(e),
    }
}
