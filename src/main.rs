//! # pokedex
//!
//! Fetches the creature catalog, then searches, sorts and favorites it from the command line.

use anyhow::{Context, Result};
use clap::Parser;
use pokedex_client::cache::CachePolicy;
use pokedex_client::catalog::{CatalogQuery, SortKey};
use pokedex_client::config::{DEFAULT_BASE_URL, DEFAULT_CONCURRENCY, DEFAULT_INDEX_PATH};
use pokedex_client::favorites::{self, FavoriteStore};
use pokedex_client::{ClientConfig, DexClient, Entity, FetchPhase, FetchProgress};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = "pokedex: list creatures from PokeAPI with search, type filter, sorting and favorites.\n\
                  Search terms: name fragments, 'exact', type:fire, id:25, hp:>=80, speed:<50."
)]
struct Args {
    /// Number of entries to request from the index
    #[arg(short, long, default_value_t = 151)]
    limit: usize,

    /// Search query (space-separated terms, all must match)
    #[arg(short, long, default_value = "")]
    search: String,

    /// Keep only entities whose primary type matches
    #[arg(short = 't', long = "type")]
    type_filter: Option<String>,

    /// Sort key (name, id, hp, attack, defense, speed)
    #[arg(long, default_value = "name")]
    sort: SortKey,

    /// Show favorites only
    #[arg(short, long)]
    favorites_only: bool,

    /// Print entities as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Mark an entity id as favorite (repeatable)
    #[arg(long = "fav", value_name = "ID")]
    add_favorites: Vec<u32>,

    /// Remove an entity id from favorites (repeatable)
    #[arg(long = "unfav", value_name = "ID")]
    remove_favorites: Vec<u32>,

    /// Clear all favorites
    #[arg(long)]
    reset_favorites: bool,

    /// Path of the favorites file
    #[arg(long)]
    favorites_file: Option<PathBuf>,

    /// Show all paths used by the application
    #[arg(long)]
    paths: bool,

    /// API root URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Index resource path under the API root
    #[arg(long, default_value = DEFAULT_INDEX_PATH)]
    index_path: String,

    /// Maximum concurrent detail requests
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Do not cap concurrent detail requests
    #[arg(long, conflicts_with = "concurrency")]
    unbounded: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Maximum number of cached detail payloads
    #[arg(long)]
    cache_capacity: Option<usize>,

    /// Seconds a cached detail payload stays fresh
    #[arg(long)]
    cache_ttl_secs: Option<u64>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn client_config(&self) -> ClientConfig {
        let cache = match (self.cache_capacity, self.cache_ttl_secs) {
            (Some(n), Some(ttl)) => CachePolicy::CapacityAndTtl(n, Duration::from_secs(ttl)),
            (Some(n), None) => CachePolicy::Capacity(n),
            (None, Some(ttl)) => CachePolicy::Ttl(Duration::from_secs(ttl)),
            (None, None) => CachePolicy::Unbounded,
        };
        ClientConfig {
            base_url: self.base_url.clone(),
            index_path: self.index_path.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            concurrency: if self.unbounded {
                None
            } else {
                Some(self.concurrency)
            },
            cache,
            ..ClientConfig::default()
        }
    }

    fn catalog_query(&self) -> CatalogQuery {
        CatalogQuery {
            search: self.search.clone(),
            type_filter: self.type_filter.clone(),
            sort: self.sort,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let favorites_path = match &args.favorites_file {
        Some(path) => path.clone(),
        None => favorites::default_favorites_path()?,
    };

    if args.paths {
        println!("App Paths:");
        println!("  Data:      {}", favorites::get_data_dir()?.display());
        println!("  Favorites: {}", favorites_path.display());
        return Ok(());
    }

    let mut store = load_favorites(&favorites_path);

    if args.reset_favorites {
        store.reset();
        store.save(&favorites_path)?;
        println!("Favorites cleared.");
        return Ok(());
    }

    let client = DexClient::new(args.client_config()).context("invalid client configuration")?;
    let mut entities = client
        .fetch_list_with_progress(args.limit, log_progress)
        .await
        .context("failed to fetch the catalog index")?;

    let refreshed = client.refresh_missing_images(&mut entities).await;
    if refreshed > 0 {
        info!(refreshed, "refetched entities with missing images");
    }

    if !args.add_favorites.is_empty() || !args.remove_favorites.is_empty() {
        update_favorites(&mut store, &entities, &args);
        store.save(&favorites_path)?;
    }

    let query = args.catalog_query();
    let selected: Vec<&Entity> = query
        .apply(&entities)
        .into_iter()
        .filter(|entity| !args.favorites_only || store.contains(entity.id()))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&selected)?);
    } else {
        for entity in &selected {
            println!("{}", format_row(entity, store.contains(entity.id())));
        }
        println!(
            "{} of {} shown, sorted by {}",
            selected.len(),
            entities.len(),
            query.sort
        );
    }

    Ok(())
}

fn log_progress(progress: FetchProgress) {
    match progress.phase {
        FetchPhase::FetchingDetails if progress.completed > 0 => debug!(
            completed = progress.completed,
            total = progress.total,
            "detail progress {:.0}%",
            progress.ratio() * 100.0
        ),
        FetchPhase::Complete if progress.failed > 0 => info!(
            failed = progress.failed,
            total = progress.total,
            "some entities could not be loaded"
        ),
        _ => {}
    }
}

/// Loads favorites, starting empty when the file cannot be read or parsed.
fn load_favorites(path: &Path) -> FavoriteStore {
    FavoriteStore::load(path).unwrap_or_else(|err| {
        warn!(path = %path.display(), error = %err, "ignoring unreadable favorites file");
        FavoriteStore::new()
    })
}

/// Applies `--fav` / `--unfav`. Unknown ids are reported and skipped.
fn update_favorites(store: &mut FavoriteStore, entities: &[Entity], args: &Args) {
    for id in &args.add_favorites {
        match entities.iter().find(|e| e.id() == *id) {
            Some(entity) => {
                store.add(entity);
                info!(id, name = %entity.display_name(), "added to favorites");
            }
            None => warn!(id, "no fetched entity with this id, not added to favorites"),
        }
    }
    for id in &args.remove_favorites {
        match store.remove(*id) {
            Some(record) => info!(id, name = %record.name, "removed from favorites"),
            None => warn!(id, "not a favorite, nothing removed"),
        }
    }
}

fn format_row(entity: &Entity, favorite: bool) -> String {
    format!(
        "{} #{:04} {:<14} {:<10} HP {:>3}  ATK {:>3}  DEF {:>3}  SPD {:>3}{}",
        if favorite { '*' } else { ' ' },
        entity.id(),
        entity.display_name(),
        entity.primary_type(),
        entity.hp(),
        entity.attack(),
        entity.defense(),
        entity.speed(),
        if entity.image_url().is_none() {
            "  (no image)"
        } else {
            ""
        }
    )
}
