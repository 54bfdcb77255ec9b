mod config;
mod logging;
mod search;
mod selection;
mod store;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info, warn};

use config::Config;
use selection::{FileSlot, MemorySlot, SelectionSlot};
use store::ContactStore;

#[derive(Parser, Debug)]
#[command(name = "cbook", about = "Terminal contact book")]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory holding contact.txt and current.txt
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print contacts whose name matches TERM, sorted by name
    Query(QueryArgs),
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// Case-insensitive name fragment; omit to list everything
    query: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref(), cli.data_dir.as_deref())?;

    let tui_mode = cli.command.is_none();
    let _log_guard = logging::init(&config.log_dir(), tui_mode);
    for warning in &config.warnings {
        warn!(path = %config.config_path.display(), "{}", warning);
    }

    let store = ContactStore::new(&config.contacts_path);

    match cli.command {
        Some(Command::Query(args)) => handle_query(args, &store),
        None => run_ui(&store, &config),
    }
}

fn run_ui(store: &ContactStore, config: &Config) -> Result<()> {
    info!(
        contacts = %config.contacts_path.display(),
        persist_selection = config.persist_selection,
        "starting contact book"
    );

    let mut slot: Box<dyn SelectionSlot> = if config.persist_selection {
        let slot = FileSlot::new(&config.selection_path);
        debug!(path = %slot.path().display(), "selection slot file");
        Box::new(slot)
    } else {
        Box::new(MemorySlot::default())
    };

    let mut app = ui::app::App::new(store, slot.as_mut(), config)?;
    app.run()?;

    info!("contact book closed");
    Ok(())
}

fn handle_query(args: QueryArgs, store: &ContactStore) -> Result<()> {
    let mut contacts = store
        .load_all()
        .with_context(|| format!("failed to load contacts from {}", store.path().display()))?;
    search::sort_for_display(&mut contacts);

    let term = args.query.as_deref().unwrap_or("");
    let results = search::filter(&contacts, term);

    // Header line, then one tab-separated row per contact
    match search::normalize_query(term) {
        Some(_) if results.is_empty() => println!("No matches for \"{}\"", term.trim()),
        Some(_) => println!(
            "Found {} contact(s) matching \"{}\"",
            results.len(),
            term.trim()
        ),
        None => println!("{} contact(s)", results.len()),
    }

    for contact in results {
        println!(
            "{}\t{}\t{}\t{}",
            contact.id, contact.name, contact.phone, contact.email
        );
    }

    Ok(())
}
