pub mod advisors;
pub mod config;
pub mod domain;
pub mod errors;
pub mod recommend;
pub mod similarity;
pub mod store;

pub use advisors::{
    AdvisorSettings, CareAdvisor, CareNotification, RandomUsage, ReplacementAdvisor,
    ReplacementSuggestion, UsageSource,
};
pub use domain::interaction::{CareLogEntry, DeviceMode, EventType, Interaction, UserId};
pub use domain::item::{CareRequirement, Item, ItemId};
pub use errors::{ApplicationError, DomainError};
pub use recommend::{top_n, Recommendation, RecommendationEngine, ScoreContributions, ScoreVector};
pub use similarity::{FeatureEncoder, RatingMatrix, SimilarityMatrix};
pub use store::{CareLog, Catalog, InteractionLog};
