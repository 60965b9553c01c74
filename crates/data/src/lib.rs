pub mod loader;
pub mod output;
pub mod synthetic;

pub use loader::{
    load_care_log, load_catalog, load_interactions, DataPaths, Dataset, LoadError,
};
pub use output::{write_recommendations, OutputError, RecommendationRow};
pub use synthetic::{generate, GenerateError, GeneratedFiles, GeneratorSettings, SyntheticDataset};
