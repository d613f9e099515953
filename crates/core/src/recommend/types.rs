//! Types for the recommendation engine

use serde::{Deserialize, Serialize};

use super::{RecommendResult, DEFAULT_LIMIT, POPULAR_POOL_FACTOR};
use crate::domain::product::Product;
use crate::errors::DomainError;

/// Weights applied to each kind of implicit feedback
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedbackWeights {
    /// Added once per purchased order line (default: 1.0)
    pub purchase: f64,
    /// Added once per collection record (default: 0.5)
    pub collect: f64,
}

impl FeedbackWeights {
    /// Build weights, rejecting anything that could make a preference non-positive
    pub fn new(purchase: f64, collect: f64) -> RecommendResult<Self> {
        ensure_weight("purchase", purchase)?;
        ensure_weight("collect", collect)?;
        Ok(Self { purchase, collect })
    }
}

impl Default for FeedbackWeights {
    fn default() -> Self {
        super::DEFAULT_WEIGHTS
    }
}

fn ensure_weight(kind: &'static str, value: f64) -> RecommendResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DomainError::InvalidFeedbackWeight { kind, value })
    }
}

/// Tunables for the recommendation service
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendSettings {
    pub weights: FeedbackWeights,
    /// Used when the caller asks for zero or fewer items
    pub default_limit: usize,
    /// Multiplier on `limit` for the popularity working set
    pub popular_pool_factor: usize,
}

impl RecommendSettings {
    pub fn new(
        weights: FeedbackWeights,
        default_limit: usize,
        popular_pool_factor: usize,
    ) -> RecommendResult<Self> {
        if default_limit == 0 {
            return Err(DomainError::InvariantViolation(
                "default recommendation limit must be greater than zero".to_owned(),
            ));
        }
        if popular_pool_factor == 0 {
            return Err(DomainError::InvariantViolation(
                "popular pool factor must be greater than zero".to_owned(),
            ));
        }
        Ok(Self { weights, default_limit, popular_pool_factor })
    }
}

impl Default for RecommendSettings {
    fn default() -> Self {
        Self {
            weights: FeedbackWeights::default(),
            default_limit: DEFAULT_LIMIT,
            popular_pool_factor: POPULAR_POOL_FACTOR,
        }
    }
}

/// A normalised page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: usize,
    pub page: usize,
}

impl PageRequest {
    /// Normalise raw caller input: non-positive limits fall back to
    /// `default_limit`, negative pages clamp to zero.
    pub fn normalize(limit: i64, page: i64, default_limit: usize) -> Self {
        let limit = if limit > 0 {
            usize::try_from(limit).unwrap_or(usize::MAX)
        } else {
            default_limit.max(1)
        };
        let page = usize::try_from(page.max(0)).unwrap_or(0);
        Self { limit, page }
    }
}

/// Which path produced a recommendation list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationPath {
    /// Ranked from the user's co-occurrence neighbours
    Personalized,
    /// No user, or the user has no feedback yet
    ColdStart,
    /// The user has feedback but no neighbour scored above zero
    NoCandidates,
}

impl RecommendationPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationPath::Personalized => "personalized",
            RecommendationPath::ColdStart => "cold_start",
            RecommendationPath::NoCandidates => "no_candidates",
        }
    }
}

/// Products returned for one request, with how they were produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub products: Vec<Product>,
    pub path: RecommendationPath,
    /// Leading entries that came from personalised scoring; the rest are backfill
    pub personalized_count: usize,
}
