use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use pmoconfig::Config;
use pmoradiogarden::{
    AddOutcome, PlaceChannelItem, RadioGardenClient, RadioGardenConfigExt, ResolveResult,
    ResolvedStation, SqliteStationStore, StationLibrary, StationRecord, StationResolver,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

type Library = StationLibrary<SqliteStationStore, Config>;

/// Resolve Radio Garden links and manage saved stations
#[derive(Parser, Debug)]
#[command(name = "pmogarden")]
#[command(about = "Radio Garden station resolver")]
#[command(version)]
struct Cli {
    /// Configuration directory (default: $PMOGARDEN_CONFIG, ./.pmogarden or ~/.pmogarden)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a URL and print the result without saving it
    Resolve { url: String },

    /// Resolve a URL and save the station
    Add {
        url: String,

        /// Channel to save when the place lists several (1-based)
        #[arg(short, long)]
        pick: Option<usize>,
    },

    /// List saved stations
    List,

    /// Remove a saved station
    Remove { channel_id: String },

    /// Show the default station, or set it when a channel id is given
    Default { channel_id: Option<String> },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Arc::new(
        Config::load_config(cli.config.as_deref().unwrap_or(""))
            .context("Failed to load configuration")?,
    );
    init_logging(&config);

    let client = RadioGardenClient::from_config(&config).await?;
    let db_path = config.get_radiogarden_database_path()?;
    let store = Arc::new(SqliteStationStore::open(Path::new(&db_path))?);
    let library = StationLibrary::new(StationResolver::new(client), store, config.clone());

    let seeded = library.seed_defaults().await?;
    if seeded > 0 {
        info!("📻 {} default station(s) added", seeded);
    }

    match cli.command {
        Command::Resolve { url } => resolve(&library, &url).await,
        Command::Add { url, pick } => add(&library, &url, pick).await,
        Command::List => list(&library).await,
        Command::Remove { channel_id } => remove(&library, &channel_id).await,
        Command::Default { channel_id } => default_station(&library, channel_id).await,
    }
}

/// RUST_LOG wins over the configured level
fn init_logging(config: &Config) {
    let level = match config.get_log_min_level() {
        Ok(l) => l.to_lowercase(),
        Err(_) => "info".to_string(),
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

async fn resolve(library: &Library, url: &str) -> anyhow::Result<()> {
    match library.resolver().resolve(url).await? {
        ResolveResult::SingleStation(station) => {
            println!("{}", station.name);
            println!("  channel:  {}", station.channel_id);
            println!("  location: {}", station.location());
            println!("  stream:   {}", station.stream_url);
            if !station.website.is_empty() {
                println!("  website:  {}", station.website);
            }
        }
        ResolveResult::MultipleStations { items, place_id } => {
            println!("Place {} lists {} channels:", place_id, items.len());
            print_choices(&items);
        }
        ResolveResult::DirectStream(stream_url) => {
            println!("Direct stream: {}", stream_url);
        }
    }
    Ok(())
}

async fn add(library: &Library, url: &str, pick: Option<usize>) -> anyhow::Result<()> {
    let record = match library.add_from_url(url).await? {
        AddOutcome::Added(record) => record,
        AddOutcome::ChooseChannel { items, place_id } => {
            let Some(n) = pick else {
                println!("Place {} lists {} channels:", place_id, items.len());
                print_choices(&items);
                println!("Run again with --pick <n> to save one of them.");
                return Ok(());
            };

            let item = n
                .checked_sub(1)
                .and_then(|index| items.get(index))
                .with_context(|| format!("--pick must be between 1 and {}", items.len()))?;
            library.add_from_place_item(item).await?
        }
    };

    println!("Saved {}", describe(&record));
    Ok(())
}

async fn list(library: &Library) -> anyhow::Result<()> {
    let stations = library.stations().await?;
    if stations.is_empty() {
        println!("No saved stations.");
        return Ok(());
    }

    let default_id = library.default_station().await?.map(|s| s.channel_id);
    for station in &stations {
        let marker = if default_id.as_deref() == Some(station.channel_id.as_str()) {
            '*'
        } else {
            ' '
        };
        println!("{} {:<20} {}", marker, station.channel_id, describe(station));
    }
    Ok(())
}

async fn remove(library: &Library, channel_id: &str) -> anyhow::Result<()> {
    let Some(record) = library.find(channel_id).await? else {
        bail!("No saved station with channel id {}", channel_id);
    };

    let was_default = library
        .default_station()
        .await?
        .is_some_and(|d| d.channel_id == record.channel_id);

    library.remove(&record).await?;
    if was_default {
        warn!("Removed the default station {}", record.channel_id);
    }
    println!("Removed {}", describe(&record));
    Ok(())
}

async fn default_station(library: &Library, channel_id: Option<String>) -> anyhow::Result<()> {
    match channel_id {
        Some(channel_id) => {
            let Some(record) = library.find(&channel_id).await? else {
                bail!("No saved station with channel id {}", channel_id);
            };
            library.set_default(&record.channel_id)?;
            println!("Default station: {}", describe(&record));
        }
        None => match library.default_station().await? {
            Some(record) => println!("Default station: {}", describe(&record)),
            None => println!("No default station."),
        },
    }
    Ok(())
}

fn print_choices(items: &[PlaceChannelItem]) {
    for (i, item) in items.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, item.display_title());
    }
}

fn describe(record: &StationRecord) -> String {
    let location = ResolvedStation::from(record).location();

    if location.is_empty() {
        format!("{} <{}>", record.name, record.stream_url)
    } else {
        format!("{} ({}) <{}>", record.name, location, record.stream_url)
    }
}
