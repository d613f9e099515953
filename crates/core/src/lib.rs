pub mod config;
pub mod domain;
pub mod errors;
pub mod recommend;

pub use domain::collection::Collection;
pub use domain::order::{OrderHeader, OrderId, OrderItem};
pub use domain::product::{Product, ProductId};
pub use domain::user::UserId;
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use recommend::{
    rotate_page, similarity, FeedbackAggregator, FeedbackWeights, PageRequest,
    RecommendService, RecommendSettings, Recommendation, RecommendationContext,
    RecommendationPath, RecommendationStore, ScoringEngine, UserPreference,
};
