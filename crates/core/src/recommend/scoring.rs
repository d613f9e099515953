//! Similarity and candidate scoring

use std::cmp::Ordering;
use std::collections::HashMap;

use super::cooccurrence::RecommendationContext;
use crate::domain::product::ProductId;
use crate::domain::user::UserId;

/// Cosine-style association between two items.
///
/// `co / sqrt(freq_a * freq_b)`; zero when either item has no holders.
pub fn similarity(co_occurrence: u32, freq_a: u32, freq_b: u32) -> f64 {
    if freq_a == 0 || freq_b == 0 {
        return 0.0;
    }
    f64::from(co_occurrence) / (f64::from(freq_a) * f64::from(freq_b)).sqrt()
}

/// A candidate product and its accumulated score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredItem {
    pub product_id: ProductId,
    pub score: f64,
}

/// Scores products a user does not own yet from their co-occurrence neighbours.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn new() -> Self {
        Self
    }

    /// Accumulate `similarity(owned, candidate) * preference(owned)` over every
    /// owned item linking to a candidate. Owned items never appear as candidates.
    pub fn candidate_scores(
        &self,
        user_id: UserId,
        context: &RecommendationContext,
    ) -> HashMap<ProductId, f64> {
        let mut scores: HashMap<ProductId, f64> = HashMap::new();
        let Some(owned) = context.preference().for_user(user_id) else {
            return scores;
        };

        for (item, preference) in owned.iter().filter(|(_, preference)| **preference > 0.0) {
            let freq_a = context.frequency().get(*item);
            if freq_a == 0 {
                continue;
            }
            let Some(neighbours) = context.co_occurrence().neighbours(*item) else {
                continue;
            };

            for (candidate, co_occurrence) in neighbours {
                if owned.contains_key(candidate) {
                    continue;
                }
                let freq_b = context.frequency().get(*candidate);
                if freq_b == 0 {
                    continue;
                }
                let similarity = similarity(*co_occurrence, freq_a, freq_b);
                if similarity <= 0.0 {
                    continue;
                }
                *scores.entry(*candidate).or_insert(0.0) += similarity * preference;
            }
        }

        scores
    }

    /// All candidates, best first. Equal scores order by ascending product id.
    pub fn ranked(&self, user_id: UserId, context: &RecommendationContext) -> Vec<ScoredItem> {
        let mut ranked: Vec<ScoredItem> = self
            .candidate_scores(user_id, context)
            .into_iter()
            .map(|(product_id, score)| ScoredItem { product_id, score })
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.product_id.cmp(&b.product_id))
        });
        ranked
    }

    /// Top `limit` candidate ids, or empty when the user carries no signal.
    pub fn score(
        &self,
        user_id: Option<UserId>,
        limit: usize,
        context: &RecommendationContext,
    ) -> Vec<ProductId> {
        let Some(user_id) = user_id else {
            return Vec::new();
        };
        if context.preference().for_user(user_id).is_none() {
            return Vec::new();
        }

        self.ranked(user_id, context).into_iter().take(limit).map(|item| item.product_id).collect()
    }
}
