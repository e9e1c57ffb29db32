//! Command implementations

pub mod browse;
pub mod clear;
pub mod completions;
pub mod favorites;
pub mod init;
pub mod list;
pub mod status;
pub mod update;

use console::style;
use miette::Result;

use crate::api::{OffClient, SampleSource};
use crate::cli::GlobalOpts;
use crate::core::{Config, IngestStats, Session};
use crate::storage::Storage;

/// Open the session over the configured database, loading in-memory state
/// when the database already has data.
pub(crate) fn open_session(global: &GlobalOpts) -> Result<Session> {
    let config = Config::load();
    let path = config.database_path(global.db.as_deref());
    log::debug!("opening database at {}", path.display());
    let storage = Storage::open(&path).map_err(|e| miette::miette!("{}", e))?;
    Session::open(storage, config.page_size()).map_err(|e| miette::miette!("{}", e))
}

/// Guard for commands that need ingested data.
pub(crate) fn require_data(session: &Session) -> Result<()> {
    if session.categories().is_empty() {
        return Err(miette::miette!(
            "The database is empty. Run `nutriswap init` first."
        ));
    }
    Ok(())
}

/// Run a full rebuild against the live API or the embedded sample data.
pub(crate) fn rebuild(
    session: &mut Session,
    sample: bool,
    global: &GlobalOpts,
) -> Result<IngestStats> {
    let quiet = global.quiet;
    let narrate = move |category: &crate::api::RawCategory| {
        if !quiet {
            println!("{} Downloading {}...", style("→").blue(), category.name);
        }
    };
    let stats = if sample {
        session.rebuild(&SampleSource::new(), narrate)
    } else {
        let config = Config::load();
        let mut client = OffClient::new().map_err(|e| miette::miette!("{}", e))?;
        if let Some(size) = config.api_page_size {
            client = client.with_page_size(size);
        }
        session.rebuild(&client, narrate)
    }
    .map_err(|e| miette::miette!("{}", e))?;
    Ok(stats)
}

pub(crate) fn print_ingest_summary(stats: &IngestStats) {
    println!(
        "{} Ingested {} product(s) across {} categorie(s), {} record(s) skipped",
        style("✓").green(),
        style(stats.products).cyan(),
        style(stats.categories).cyan(),
        stats.skipped
    );
}

/// Plain y/N confirmation on stdin.
pub(crate) fn confirm(prompt: &str) -> Result<bool> {
    use miette::IntoDiagnostic;

    print!("{} [y/N] ", prompt);
    std::io::Write::flush(&mut std::io::stdout()).into_diagnostic()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input).into_diagnostic()?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}
