pub mod config;
pub mod error;
pub mod model;
pub mod sort;
pub mod urls;

pub use config::{AppConfig, CatalogConfig, StoreConfig};
pub use error::ValidationError;
pub use model::{
    CandidateTrack, OrderedPlaylist, PlaylistId, PlaylistMetadata, PreviewHandle, TrackEntry,
    Visibility,
};
pub use sort::{materialize, SortKind};
