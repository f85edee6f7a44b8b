use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use playlist_share_catalog::{build_catalog, TrackCatalogClient};
use playlist_share_controller::{PlaylistController, SearchStatus, SearchView};
use playlist_share_core::{AppConfig, CandidateTrack, PlaylistId, SortKind, Visibility};
use playlist_share_engine::Transition;
use playlist_share_store::{JsonFileRecordStore, PlaylistStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

mod audio;

use audio::DryRunAudio;

#[derive(Parser, Debug)]
#[command(
    name = "playlist-share",
    about = "Catalog search -> ordered playlists -> play-all"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Search the track catalog.
    Search { term: String },
    /// Create a playlist owned by the configured user.
    Create {
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        private: bool,
    },
    /// List your playlists, or everyone's public ones.
    List {
        #[arg(long)]
        public: bool,
    },
    Show {
        id: String,
        #[arg(long, default_value = "position")]
        sort: SortKind,
    },
    /// Search the catalog and add the Nth hit (1-based).
    Add {
        id: String,
        term: String,
        #[arg(long, default_value_t = 1)]
        pick: usize,
    },
    Rename {
        id: String,
        title: String,
    },
    Visibility {
        id: String,
        value: Visibility,
    },
    /// Walk the play-all sequence without producing sound.
    PlayAll {
        id: String,
        #[arg(long, default_value = "position")]
        sort: SortKind,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg_path = cli.config.unwrap_or_else(default_config_path);

    if let Commands::Config {
        action: ConfigAction::Init,
    } = cli.command
    {
        init_config(&cfg_path)?;
        println!("Initialized config at {}", cfg_path.display());
        return Ok(());
    }

    let cfg = load_or_default(&cfg_path)?;
    init_logging(&cfg.log_level);
    info!(path = %cfg_path.display(), "configuration loaded");

    let store = PlaylistStore::new(Arc::new(JsonFileRecordStore::new(data_file_path(
        &cfg, &cfg_path,
    ))));
    let catalog = build_catalog(&cfg.catalog).context("failed to build catalog client")?;
    debug!(catalog = catalog.name(), "collaborators ready");

    match cli.command {
        Commands::Config { .. } => Ok(()),
        Commands::Search { term } => search(catalog.as_ref(), &term).await,
        Commands::Create {
            title,
            description,
            private,
        } => {
            let visibility = if private {
                Visibility::Private
            } else {
                Visibility::Public
            };
            let meta = store
                .create(&cfg.owner_id, &title, description.as_deref(), visibility)
                .await?;
            println!("{}  {}", meta.id, meta.title);
            Ok(())
        }
        Commands::List { public } => {
            let playlists = if public {
                store.list_public().await?
            } else {
                store.list_owned(&cfg.owner_id).await?
            };
            if playlists.is_empty() {
                println!("No playlists yet.");
            }
            for p in playlists {
                println!("{}  {}  ({:?})", p.id, p.title, p.visibility);
            }
            Ok(())
        }
        Commands::Show { id, sort } => {
            let mut controller = open(&id, store, catalog, DryRunAudio::default()).await?;
            controller.apply_sort(sort);
            print_playlist(&controller);
            Ok(())
        }
        Commands::Add { id, term, pick } => {
            let mut controller = open(&id, store, catalog, DryRunAudio::default()).await?;
            controller.open_search();
            controller.search(&term).await;
            let candidate = picked(&controller, pick)?;
            let entry = controller
                .add_from_search(&candidate)
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            controller.close_search();
            println!(
                "Added #{}: {} - {}",
                entry.position, entry.artist, entry.title
            );
            Ok(())
        }
        Commands::Rename { id, title } => {
            let mut controller = open(&id, store, catalog, DryRunAudio::default()).await?;
            let meta = controller
                .rename(&title)
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("Renamed to {}", meta.title);
            Ok(())
        }
        Commands::Visibility { id, value } => {
            let mut controller = open(&id, store, catalog, DryRunAudio::default()).await?;
            controller
                .set_visibility(value)
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("Visibility set to {value:?}");
            Ok(())
        }
        Commands::PlayAll { id, sort } => {
            let audio = DryRunAudio::default();
            let mut controller = open(&id, store, catalog, audio.clone()).await?;
            controller.apply_sort(sort);
            play_all(&mut controller, &audio)
        }
    }
}

async fn open(
    id: &str,
    store: PlaylistStore,
    catalog: Arc<dyn TrackCatalogClient>,
    audio: DryRunAudio,
) -> Result<PlaylistController> {
    PlaylistController::open(&PlaylistId::new(id), store, catalog, Box::new(audio))
        .await
        .map_err(|e| anyhow!(e.user_message()))
}

async fn search(catalog: &dyn TrackCatalogClient, term: &str) -> Result<()> {
    let results = catalog
        .search(term)
        .await
        .context("search is unavailable right now")?;
    if results.is_empty() {
        println!("No results found.");
    }
    for (i, track) in results.iter().enumerate() {
        println!(
            "{:>2}. {} - {}{}",
            i + 1,
            track.artist,
            track.title,
            if track.is_playable() { "" } else { "  (no preview)" }
        );
    }
    Ok(())
}

fn picked(controller: &PlaylistController, pick: usize) -> Result<CandidateTrack> {
    match controller.view().search {
        SearchView::Open {
            status: SearchStatus::Results(results),
            ..
        } => {
            if results.is_empty() {
                bail!("No results found.");
            }
            pick.checked_sub(1)
                .and_then(|i| results.get(i).cloned())
                .ok_or_else(|| anyhow!("--pick must be between 1 and {}", results.len()))
        }
        SearchView::Open {
            status: SearchStatus::Failed(notice),
            ..
        } => Err(anyhow!(notice.message)),
        _ => bail!("enter a search term"),
    }
}

fn print_playlist(controller: &PlaylistController) {
    let view = controller.view();
    println!("{}  ({:?})", view.metadata.title, view.metadata.visibility);
    if let Some(desc) = &view.metadata.description {
        println!("{desc}");
    }
    if view.tracks.is_empty() {
        println!("No songs in this playlist yet.");
    }
    for (i, e) in view.tracks.iter().enumerate() {
        println!(
            "{:>3}  {} - {}  {}{}",
            i + 1,
            e.artist,
            e.title,
            e.duration_label(),
            if e.is_playable() { "" } else { "  No Preview" }
        );
    }
}

fn play_all(controller: &mut PlaylistController, audio: &DryRunAudio) -> Result<()> {
    let mut transition = controller
        .play_all()
        .map_err(|e| anyhow!(e.user_message()))?;

    loop {
        match transition {
            Transition::NothingToPlay => {
                println!("Nothing to play.");
                return Ok(());
            }
            Transition::Ended | Transition::Stopped | Transition::Unchanged => {
                println!("End of playlist.");
                return Ok(());
            }
            Transition::Started { .. } | Transition::Advanced { .. } => {}
        }

        if audio.active().is_none() {
            return Ok(());
        }
        let view = controller.view();
        let Some(index) = view.cursor.current_index else {
            return Ok(());
        };
        if let Some(now) = view.now_playing {
            println!("> {} - {}", now.artist, now.title);
        }
        transition = controller
            .on_preview_ended(index)
            .map_err(|e| anyhow!(e.user_message()))?;
    }
}

fn default_config_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("playlist-share").join("config.toml")
}

fn data_file_path(cfg: &AppConfig, cfg_path: &Path) -> PathBuf {
    let file = PathBuf::from(&cfg.store.data_file);
    if file.is_absolute() {
        return file;
    }
    cfg_path
        .parent()
        .map(|dir| dir.join(&file))
        .unwrap_or(file)
}

fn init_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    let cfg = AppConfig::default();
    let toml = toml::to_string_pretty(&cfg)?;
    std::fs::write(path, toml)
        .with_context(|| format!("failed to write config file {}", path.display()))?;
    Ok(())
}

fn load_or_default(path: &Path) -> Result<AppConfig> {
    let mut cfg = read_config(path)?;
    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok());
    Ok(cfg)
}

fn read_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&data).with_context(|| format!("failed to parse {}", path.display()))
}

fn init_logging(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_new(log_level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .try_init();
}

fn apply_env_overrides(cfg: &mut AppConfig, var: impl Fn(&str) -> Option<String>) {
    let non_blank = |key: &str| var(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = non_blank("PLAYLIST_SHARE_LOG_LEVEL") {
        cfg.log_level = v;
    }
    if let Some(v) = non_blank("PLAYLIST_SHARE_OWNER_ID") {
        cfg.owner_id = v;
    }
    if let Some(v) = non_blank("PLAYLIST_SHARE_CATALOG_URL") {
        cfg.catalog.base_url = v;
    }
    if let Some(v) = non_blank("PLAYLIST_SHARE_DATA_FILE") {
        cfg.store.data_file = v;
    }
}
