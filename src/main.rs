//! PDF Finder terminal client.
//!
//! Drives the page client against a running PDF Finder server:
//!
//! - `page`: load the page and print its HTML after the client has run
//! - `search`: submit a query (and optional image) in place
//! - `favorites` / `favorite`: list, add and remove favorites
//! - `theme`: show or change the stored light/dark preference
//! - `click`: send a click beacon for a result link
//! - `set-key`: hand the server a new API key

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use pdf_finder::{
    format_relative_now, Config, HttpBackend, LocalStorage, Page, StagedFile, SubmitOutcome,
    SyncOutcome, Theme,
};

#[derive(Parser)]
#[command(name = "pdf-finder", about = "Terminal client for the PDF Finder search page")]
struct Cli {
    /// Backend base URL (overrides PDF_FINDER_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the page and print it
    Page,
    /// Search for PDFs, optionally with an image to OCR
    Search {
        query: String,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// List saved favorites
    Favorites,
    /// Add or remove a favorite
    Favorite {
        #[arg(value_enum)]
        action: FavoriteCommand,
        url: String,
    },
    /// Show or change the theme
    Theme {
        #[arg(value_enum)]
        mode: Option<ThemeCommand>,
    },
    /// Record a click on a result link
    Click { url: String },
    /// Set the server's search API key
    SetKey { key: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum FavoriteCommand {
    Add,
    Remove,
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeCommand {
    Light,
    Dark,
    Toggle,
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pdf_finder=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> pdf_finder::Result<ExitCode> {
    let mut config = Config::from_env()?;
    if let Some(url) = cli.url.as_deref() {
        config = Config::new(url, config.prefs_path, config.request_timeout)?;
    }

    let storage = LocalStorage::open(&config.prefs_path)?;

    // Theme changes need no server.
    if let Command::Theme { mode } = &cli.command {
        let mut page = Page::new(Arc::new(HttpBackend::new(&config)?), storage, "");
        if let Some(mode) = mode {
            let theme = match mode {
                ThemeCommand::Light => Theme::Light,
                ThemeCommand::Dark => Theme::Dark,
                ThemeCommand::Toggle => page.theme().toggled(),
            };
            page.set_theme(theme)?;
        }
        println!("{}", page.theme().as_str());
        return Ok(ExitCode::SUCCESS);
    }

    let backend = Arc::new(HttpBackend::new(&config)?);
    let mut page = Page::load(Arc::clone(&backend), storage).await?;

    let code = match cli.command {
        Command::Page => {
            println!("{}", page.document().html());
            ExitCode::SUCCESS
        }
        Command::Search { query, image } => {
            page.set_query(&query)?;
            if let Some(path) = image {
                let bytes = fs::read(&path)?;
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "image".to_string());
                page.file_input_changed(vec![StagedFile::new(&name, bytes)])?;
            }
            match page.submit_search().await {
                SubmitOutcome::Spliced(_) => {
                    let links = page.result_links();
                    if links.is_empty() {
                        println!("No PDF links found. Try different keywords.");
                    }
                    for link in links {
                        let heart = if page.store().contains(&link) { "\u{2665}" } else { " " };
                        println!("{} {}", heart, link);
                    }
                    ExitCode::SUCCESS
                }
                SubmitOutcome::Failed(reason) => {
                    eprintln!("Search failed: {}", reason);
                    ExitCode::FAILURE
                }
            }
        }
        Command::Favorites => {
            if page.favorites().is_empty() {
                println!("No favorites yet.");
            }
            for entry in page.favorites().entries() {
                println!("{}  ({})", entry.link_url, format_relative_now(entry.saved_at));
            }
            ExitCode::SUCCESS
        }
        Command::Favorite { action, url } => {
            let outcome = match action {
                FavoriteCommand::Add => page.add_favorite(&url).await,
                FavoriteCommand::Remove => page.remove_favorite(&url).await,
            };
            report(outcome)
        }
        Command::Click { url } => {
            // The CLI exits right away, so wait for the beacon here.
            let beacon = pdf_finder::ClickTracker::new(backend).track(&url);
            if beacon.await.is_err() {
                eprintln!("Click beacon task panicked");
                return Ok(ExitCode::FAILURE);
            }
            ExitCode::SUCCESS
        }
        Command::SetKey { key } => report(page.set_key(&key).await),
        Command::Theme { .. } => ExitCode::SUCCESS,
    };

    Ok(code)
}

fn report(outcome: SyncOutcome) -> ExitCode {
    match outcome {
        SyncOutcome::Applied => {
            println!("ok");
            ExitCode::SUCCESS
        }
        SyncOutcome::Rejected(reason) => {
            eprintln!("Server refused: {}", reason);
            ExitCode::FAILURE
        }
        SyncOutcome::Failed(reason) => {
            eprintln!("Request failed: {}", reason);
            ExitCode::FAILURE
        }
    }
}
