use thiserror::Error;

pub mod dataset;
pub mod levels;
pub mod params;
pub mod resolver;
pub mod selector;

pub use dataset::{GroupCatalog, ItemGroup};
pub use levels::{LevelCatalog, LevelDefinition};
pub use params::{ParameterSpace, PoolSimilarity, ResolvedParameters};
pub use resolver::{DifficultyResolver, ResolveMode};
pub use selector::{GroupQuery, GroupSelector};

#[derive(Debug, Error)]
pub enum MemoriaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("dataset parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("level catalog is empty; resolve by score instead")]
    ConfigurationMissing,
}

pub type Result<T> = std::result::Result<T, MemoriaError>;
