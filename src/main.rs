//! # Health Buddy CLI (`buddy`)
//!
//! The `buddy` binary logs symptoms, prints canned health tips, replays
//! past entries, lists emergency numbers, ranks nearby clinics, and can
//! serve the same features over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! buddy --config ./config/buddy.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `buddy tips <symptoms>` | Get tips for a symptom description and log it |
//! | `buddy quick [names]` | List quick symptoms, or log a combination of them |
//! | `buddy history` | List past entries, newest first |
//! | `buddy show <id>` | Replay the tips of a past entry |
//! | `buddy share [id]` | Share the tips of an entry (latest by default) |
//! | `buddy clinics` | Nearby clinics ranked by distance |
//! | `buddy emergency` | Emergency phone numbers |
//! | `buddy serve` | Start the JSON HTTP API |
//!
//! Diagnostics go to stderr. Set `BUDDY_LOG` (e.g. `BUDDY_LOG=debug`) to
//! override the log filter.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use health_buddy::config::{self, Config};
use health_buddy::contacts::{
    add_quick_symptom, dial_link, directions_url, maps_search_url, EMERGENCY_CONTACTS,
    EMERGENCY_NOTICE, QUICK_SYMPTOMS,
};
use health_buddy::directory::create_directory;
use health_buddy::display::{entry_count_label, format_timestamp};
use health_buddy::location::resolve_provider;
use health_buddy::models::{Coordinate, SymptomRecord};
use health_buddy::server;
use health_buddy::session::Session;
use health_buddy::share::{format_for_sharing, share, FileSink, ShareSink, StdoutSink};
use health_buddy::storage::FileStorage;

/// Health Buddy: symptom log, health tips, and nearby clinics.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. When the file does not exist, built-in defaults are used.
#[derive(Parser)]
#[command(
    name = "buddy",
    about = "Health Buddy: symptom log, canned health tips, and nearby clinic ranking",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/buddy.toml")]
    config: PathBuf,

    /// Show debug diagnostics on stderr.
    #[arg(long, short, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show errors on stderr.
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get health tips for a symptom description and add it to history.
    Tips {
        /// Symptom description. Multiple words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        symptoms: Vec<String>,
    },

    /// List quick symptoms, or log a combination of them.
    ///
    /// `buddy quick Headache Fever` logs "Headache, Fever".
    Quick {
        /// Quick symptom names (case-insensitive).
        names: Vec<String>,
    },

    /// List past entries, newest first.
    History {
        /// Maximum number of entries to show.
        #[arg(long)]
        limit: Option<usize>,

        /// Print the entries as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Replay the tips of a past entry without recomputing them.
    Show {
        /// Entry id (see `buddy history`).
        id: String,
    },

    /// Share the tips of an entry.
    ///
    /// Writes to `--output` when given, otherwise prints the text. If the
    /// file cannot be written the text is printed instead.
    Share {
        /// Entry id. Defaults to the most recent entry.
        id: Option<String>,

        /// File to write the shared text to.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List nearby clinics ranked by distance.
    ///
    /// Uses `--lat/--lng` when given, otherwise `[location]` from config.
    Clinics {
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,

        /// Print the ranked list as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List emergency phone numbers.
    Emergency,

    /// Start the JSON HTTP API on `[server].bind`.
    Serve,
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("BUDDY_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let config_path = cli.config;
    let load = || config::load_or_default(&config_path);

    match cli.command {
        Commands::Emergency => {
            // No config or storage needed
            print_emergency();
        }
        Commands::Tips { symptoms } => {
            let cfg = load()?;
            run_tips(&cfg, &symptoms.join(" ")).await?;
        }
        Commands::Quick { names } => {
            let cfg = load()?;
            if names.is_empty() {
                println!("Quick symptoms:");
                for name in QUICK_SYMPTOMS {
                    println!("  + {}", name);
                }
            } else {
                let symptoms = combine_quick_symptoms(&names)?;
                run_tips(&cfg, &symptoms).await?;
            }
        }
        Commands::History { limit, json } => {
            let cfg = load()?;
            let session = open_session(&cfg);
            let records = session.history().records();
            let shown = &records[..limit.unwrap_or(records.len()).min(records.len())];
            if json {
                println!("{}", serde_json::to_string_pretty(shown)?);
            } else if records.is_empty() {
                println!("No symptom history yet. Log your symptoms to get personalized advice.");
            } else {
                println!("Symptom history ({})", entry_count_label(records.len()));
                println!();
                for record in shown {
                    println!("{}  {}", record.id, format_timestamp(&record.created_at));
                    println!("    {}", record.symptom_text);
                    println!("    {} tips available", record.tips.len());
                }
            }
        }
        Commands::Show { id } => {
            let cfg = load()?;
            let mut session = open_session(&cfg);
            let record = session.select(&id)?;
            println!("Tips for: {}", record.symptom_text);
            println!("{}", format_timestamp(&record.created_at));
            println!();
            print_tips(&record.tips);
        }
        Commands::Share { id, output } => {
            let cfg = load()?;
            let session = open_session(&cfg);
            let record: &SymptomRecord = match &id {
                Some(id) => session
                    .history()
                    .select_for_replay(id)
                    .ok_or_else(|| anyhow::anyhow!("history entry not found: {}", id))?,
                None => match session.history().latest() {
                    Some(r) => r,
                    None => bail!("no history to share; log your symptoms first"),
                },
            };

            let text = format_for_sharing(&record.tips);
            let file_sink = output.map(|path| FileSink { path });
            let primary = file_sink.as_ref().map(|s| s as &dyn ShareSink);
            let outcome = share(&text, primary, &StdoutSink);
            if !outcome.is_success() {
                bail!("{}", outcome.message());
            }
            eprintln!("{}", outcome.message());
        }
        Commands::Clinics { lat, lng, json } => {
            let cfg = load()?;
            let override_coord = lat.zip(lng).map(|(lat, lng)| Coordinate::new(lat, lng));
            let mut session = open_session(&cfg);
            let provider = resolve_provider(&cfg, override_coord);

            let Some(origin) = session.acquire_location(provider.as_ref()).await else {
                println!("Location access is required to show nearby clinics.");
                println!("Set [location] in the config file or pass --lat and --lng.");
                return Ok(());
            };

            let directory = create_directory(&cfg.directory)?;
            let ranked = session.nearby_facilities(directory.as_ref()).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&ranked)?);
            } else if ranked.is_empty() {
                println!("Unable to find nearby clinics. Please check your location settings.");
            } else {
                println!("Nearby clinics from ({}, {})", origin.lat, origin.lng);
                println!();
                for (i, r) in ranked.iter().enumerate() {
                    println!("{}. {} ({})", i + 1, r.facility.name, r.distance);
                    println!("   {}", r.facility.address);
                    println!("   {}  {}", r.facility.phone, dial_link(&r.facility.phone));
                    println!("   {}", directions_url(origin, r));
                }
                println!();
                println!("More facilities: {}", maps_search_url(origin));
            }
        }
        Commands::Serve => {
            server::run_server(&load()?).await?;
        }
    }

    Ok(())
}

fn open_session(cfg: &Config) -> Session<FileStorage> {
    Session::start(FileStorage::new(cfg.history.dir.clone()), cfg)
}

async fn run_tips(cfg: &Config, symptoms: &str) -> Result<()> {
    let mut session = open_session(cfg);
    let record = session.submit(symptoms).await?;

    println!("Health Tips");
    println!();
    print_tips(&record.tips);
    println!();
    println!(
        "Logged as {} ({})",
        record.id,
        entry_count_label(session.history().len())
    );
    Ok(())
}

fn print_tips(tips: &[String]) {
    for (i, tip) in tips.iter().enumerate() {
        println!("{:>3}. {}", i + 1, tip);
    }
}

fn combine_quick_symptoms(names: &[String]) -> Result<String> {
    let mut combined = String::new();
    for name in names {
        let Some(quick) = QUICK_SYMPTOMS
            .iter()
            .find(|q| q.eq_ignore_ascii_case(name))
        else {
            bail!(
                "unknown quick symptom '{}'. Run `buddy quick` to list them.",
                name
            );
        };
        combined = add_quick_symptom(&combined, quick);
    }
    Ok(combined)
}

fn print_emergency() {
    println!("Emergency Contacts");
    println!();
    for c in EMERGENCY_CONTACTS {
        println!("{:<30} {:<16} {}", c.name, c.number, dial_link(c.number));
        println!("    {}", c.description);
    }
    println!();
    println!("{}", EMERGENCY_NOTICE);
}
