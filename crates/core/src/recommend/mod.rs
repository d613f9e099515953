//! Product recommendation engine
//!
//! Item-based collaborative filtering over implicit feedback (purchases and
//! collections), with a sales-ranked popularity list for cold start and for
//! backfilling short personalised results. Every call rebuilds its working
//! matrices from the store; nothing is cached between requests.

mod cooccurrence;
mod feedback;
mod rotation;
mod scoring;
mod service;
mod store;
mod types;

pub use cooccurrence::{CoOccurrence, ItemFrequency, RecommendationContext};
pub use feedback::{FeedbackAggregator, FeedbackEvent, FeedbackKind, UserPreference};
pub use rotation::rotate_page;
pub use scoring::{similarity, ScoredItem, ScoringEngine};
pub use service::RecommendService;
pub use store::RecommendationStore;
pub use types::*;

use crate::errors::DomainError;

/// Result type for recommendation value constructors
pub type RecommendResult<T> = Result<T, DomainError>;

/// Preference added per purchased order line
pub const PURCHASE_WEIGHT: f64 = 1.0;

/// Preference added per collection record
pub const COLLECT_WEIGHT: f64 = 0.5;

/// Default feedback weights
pub const DEFAULT_WEIGHTS: FeedbackWeights =
    FeedbackWeights { purchase: PURCHASE_WEIGHT, collect: COLLECT_WEIGHT };

/// Result size used when the caller passes a non-positive limit
pub const DEFAULT_LIMIT: usize = 6;

/// Top sellers fetched per requested slot, so rotation has material to page through
pub const POPULAR_POOL_FACTOR: usize = 3;
