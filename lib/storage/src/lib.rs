pub mod clients;
pub mod manager;
pub mod metadata;

pub use clients::{ClientStore, StoredClient};
pub use manager::{ArtifactManager, LoadedArtifacts, ThresholdSource};
pub use metadata::ModelMetadata;
