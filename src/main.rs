use clap::{Parser, Subcommand};
use photomuseum_bridge::cache::{CacheBackend, CacheStats, CachedStore, FileCache};
use photomuseum_bridge::client::{ContentStore, HttpStore, Params, QueryError};
use photomuseum_bridge::config::{self, BridgeConfig};
use photomuseum_bridge::queries::SearchFilters;
use photomuseum_bridge::resolve::{PageKind, Request};
use photomuseum_bridge::router::{self, Bridge, Page};
use photomuseum_bridge::{output, schema};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Cheapest query that proves the dataset answers.
const PING_QUERY: &str = "count(*[_type == \"photo\"])";

fn version_string() -> &'static str {
    let hash = env!("GIT_HASH");
    if hash.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        // Leaked once at startup
        Box::leak(format!("{}@{hash}", env!("CARGO_PKG_VERSION")).into_boxed_str())
    }
}

#[derive(Parser)]
#[command(name = "photomuseum-bridge")]
#[command(about = "Bilingual photo-archive pages from a hosted content store")]
#[command(long_about = "\
Bilingual photo-archive pages from a hosted content store

Every page lives under a language prefix:

  /                                 English home
  /en/  /ka/                        Home: themes and recent photographs
  /{lang}/themes                    Top-level themes
  /{lang}/theme/{slug}              Theme with sub-themes and photographs
  /{lang}/collections               Top-level collections
  /{lang}/photographers             Photographer index
  /{lang}/photographer/{slug}       Photographer with photographs
  /{lang}/places                    Place index
  /{lang}/place/{slug}              Place with photographs
  /{lang}/collection/{slug}         Collection: sub-collections or photographs
  /{lang}/photo/{slug}              Single photograph
  /{lang}/search?q=&theme=&photographer=&place=

Listing pages take ?offset= and ?limit= (1-60). Store results are cached for
15 minutes; 'bust-cache' invalidates everything at once.

Run 'photomuseum-bridge gen-config' to generate a documented bridge.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

/// A request given field by field instead of as a URL.
#[derive(clap::Args, Clone)]
struct RequestArgs {
    /// Page kind: home, themes, theme, photographers, photographer, places,
    /// place, search, collections, collection, photo
    #[arg(long, default_value = "home")]
    page: String,
    #[arg(long, default_value = "en")]
    lang: String,
    #[arg(long, default_value = "")]
    slug: String,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    offset: i64,
    #[arg(long, allow_negative_numbers = true)]
    limit: Option<i64>,
    /// Search text
    #[arg(long, default_value = "")]
    q: String,
    /// Search: theme slug
    #[arg(long, default_value = "")]
    theme: String,
    /// Search: photographer slug
    #[arg(long, default_value = "")]
    photographer: String,
    /// Search: place slug
    #[arg(long, default_value = "")]
    place: String,
}

impl RequestArgs {
    fn to_request(&self) -> Option<Request> {
        let page = PageKind::parse(self.page.trim())?;
        Some(Request {
            lang: self.lang.clone(),
            page,
            slug: self.slug.clone(),
            offset: self.offset,
            limit: self.limit,
            search: SearchFilters {
                q: self.q.clone(),
                theme: self.theme.clone(),
                photographer: self.photographer.clone(),
                place: self.place.clone(),
            },
        })
    }
}

/// Output shape for rendering commands.
#[derive(clap::Args, Clone)]
struct RenderArgs {
    /// Wrap the fragment in a standalone HTML document
    #[arg(long)]
    document: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Render a page from a URL, e.g. "/ka/theme/portraits?offset=24", or
    /// from --page/--slug/--lang flags when no URL is given
    Render {
        target: Option<String>,
        #[command(flatten)]
        request: RequestArgs,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// Render an embedded shortcode, e.g. '[pmsb_collection slug="family"]'
    Shortcode {
        tag: String,
        /// URL of the page the shortcode sits on; its offset and search apply
        #[arg(long)]
        context: Option<String>,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// Show how a URL is routed without querying the store
    Route { target: String },
    /// Invalidate every cached result by advancing the cache generation
    BustCache,
    /// Show the cache generation and entry counts
    CacheStatus {
        /// Also delete expired entries
        #[arg(long)]
        purge: bool,
    },
    /// Validate configuration and send one trivial query to the store
    Check,
    /// Check exported CMS documents (JSON or NDJSON) against the field rules
    Validate { file: PathBuf },
    /// Print a stock bridge.toml with all options documented
    GenConfig,
}

/// The store the CLI talks to: direct, or behind the file cache.
enum Store {
    Direct(HttpStore),
    Cached(CachedStore<HttpStore, FileCache>),
}

impl Store {
    fn open(config: &BridgeConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let http = HttpStore::new(config.store.clone())?;
        if !config.cache.enabled {
            return Ok(Store::Direct(http));
        }
        // Without an identity every query fails before reaching the cache.
        let Ok(identity) = config.store.identity() else {
            return Ok(Store::Direct(http));
        };
        let backend = match FileCache::open(&config.cache.dir) {
            Ok(backend) => backend,
            Err(e) => {
                tracing::warn!(
                    dir = %config.cache.dir.display(),
                    error = %e,
                    "cache unavailable, querying the store directly"
                );
                return Ok(Store::Direct(http));
            }
        };
        let ttl = Duration::from_secs(config.cache.ttl_secs);
        Ok(Store::Cached(CachedStore::new(http, backend, identity, ttl)))
    }

    fn stats(&self) -> Option<CacheStats> {
        match self {
            Store::Direct(_) => None,
            Store::Cached(cached) => Some(cached.stats()),
        }
    }
}

impl ContentStore for Store {
    fn query(&self, query: &str, params: &Params) -> Result<Value, QueryError> {
        match self {
            Store::Direct(store) => store.query(query, params),
            Store::Cached(store) => store.query(query, params),
        }
    }
}

fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("photomuseum_bridge=info".parse()?))
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn load(path: &Path) -> Result<BridgeConfig, Box<dyn std::error::Error>> {
    let mut config = config::load_config(path)?;
    config::apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn emit(page: Page, args: &RenderArgs) {
    let html = if args.document {
        page.into_document().into_string()
    } else {
        page.body.into_string()
    };
    println!("{html}");
}

fn report_cache(store: &Store) {
    if let Some(stats) = store.stats() {
        eprintln!("Cache: {stats}");
    }
}

fn split_target(target: &str) -> (&str, &str) {
    target.split_once('?').unwrap_or((target, ""))
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing()?;

    match cli.command {
        Command::Render {
            target,
            request,
            render,
        } => {
            let config = load(&cli.config)?;
            let store = Store::open(&config)?;
            let bridge = Bridge::new(&store, &config.site);
            let page = match target {
                Some(target) => {
                    let (path, query) = split_target(&target);
                    bridge.render_path(path, query)
                }
                None => match request.to_request() {
                    Some(request) => bridge.render_request(&request),
                    None => return Err(format!("unknown page kind: {}", request.page).into()),
                },
            };
            emit(page, &render);
            report_cache(&store);
        }
        Command::Shortcode {
            tag,
            context,
            render,
        } => {
            let config = load(&cli.config)?;
            let store = Store::open(&config)?;
            let bridge = Bridge::new(&store, &config.site);
            let context = context.as_deref().and_then(router::route_target);
            emit(bridge.render_shortcode(&tag, context.as_ref())?, &render);
            report_cache(&store);
        }
        Command::Route { target } => {
            output::print_route(&target, router::route_target(&target).as_ref());
        }
        Command::BustCache => {
            let config = load(&cli.config)?;
            let cache = FileCache::open(&config.cache.dir)?;
            let previous = cache.generation();
            let next = cache.bump_generation()?;
            tracing::info!(%previous, %next, "cache generation advanced");
            println!("Cache generation: {previous} → {next}");
        }
        Command::CacheStatus { purge } => {
            let config = load(&cli.config)?;
            let cache = FileCache::open(&config.cache.dir)?;
            if purge {
                let removed = cache.purge_expired()?;
                println!("Removed {removed} expired entries");
            }
            output::print_cache_status(cache.dir(), config.cache.ttl_secs, &cache.status()?);
        }
        Command::Check => {
            println!("==> Checking {}", cli.config.display());
            let config = load(&cli.config)?;
            let identity = match config.store.identity() {
                Ok(id) => id,
                Err(e) => {
                    println!("Store: {e}");
                    return Ok(ExitCode::FAILURE);
                }
            };
            println!(
                "Store: {} / {} (API {})",
                identity.project_id, identity.dataset, identity.api_version
            );
            if config.cache.enabled {
                println!(
                    "Cache: {} ({}s)",
                    config.cache.dir.display(),
                    config.cache.ttl_secs
                );
            } else {
                println!("Cache: disabled");
            }
            let store = HttpStore::new(config.store.clone())?;
            match store.query(PING_QUERY, &Params::new()) {
                Ok(count) => println!("Store reachable: {count} photos"),
                Err(e) => {
                    println!("Store: {e}");
                    return Ok(ExitCode::FAILURE);
                }
            }
            println!("==> Config is valid");
        }
        Command::Validate { file } => {
            let text = std::fs::read_to_string(&file)?;
            let reports = schema::validate_export(&text)?;
            output::print_validation(&reports);
            if reports.iter().any(|r| !r.is_valid()) {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn config_with_cache_dir(dir: &Path) -> BridgeConfig {
        let mut config = BridgeConfig::default();
        config.store.project_id = "abc123".into();
        config.store.dataset = "production".into();
        config.cache.dir = dir.to_path_buf();
        config
    }

    #[test]
    fn unusable_cache_dir_falls_back_to_direct_store() {
        // A regular file where the cache directory should be.
        let blocker = NamedTempFile::new().unwrap();
        let store = Store::open(&config_with_cache_dir(blocker.path())).unwrap();
        assert!(matches!(store, Store::Direct(_)));
        assert!(store.stats().is_none());
    }

    #[test]
    fn usable_cache_dir_wraps_the_store() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = Store::open(&config_with_cache_dir(tmp.path())).unwrap();
        assert!(matches!(store, Store::Cached(_)));
    }
}
