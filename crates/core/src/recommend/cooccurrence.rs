//! Item frequency and item-item co-occurrence

use std::collections::HashMap;

use super::feedback::UserPreference;
use crate::domain::product::ProductId;

/// Number of distinct users holding a positive preference for each product
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFrequency(HashMap<ProductId, u32>);

impl ItemFrequency {
    pub fn get(&self, product_id: ProductId) -> u32 {
        self.0.get(&product_id).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProductId, &u32)> {
        self.0.iter()
    }
}

/// `item -> item -> number of users holding both`. Symmetric; no diagonal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoOccurrence(HashMap<ProductId, HashMap<ProductId, u32>>);

impl CoOccurrence {
    pub fn get(&self, a: ProductId, b: ProductId) -> u32 {
        self.0.get(&a).and_then(|row| row.get(&b)).copied().unwrap_or(0)
    }

    pub fn neighbours(&self, product_id: ProductId) -> Option<&HashMap<ProductId, u32>> {
        self.0.get(&product_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProductId, &HashMap<ProductId, u32>)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Request-scoped snapshot the scorer reads from. Built once, never mutated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationContext {
    preference: UserPreference,
    frequency: ItemFrequency,
    co_occurrence: CoOccurrence,
}

impl RecommendationContext {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Derive frequency and co-occurrence from the preference matrix.
    ///
    /// Cost is `O(sum of k^2)` over users with `k` preferred items, so very
    /// large baskets are the scaling limit here.
    pub fn build(preference: UserPreference) -> Self {
        let mut frequency: HashMap<ProductId, u32> = HashMap::new();
        let mut co_occurrence: HashMap<ProductId, HashMap<ProductId, u32>> = HashMap::new();

        for (_, row) in preference.iter() {
            let items: Vec<ProductId> =
                row.iter().filter(|(_, score)| **score > 0.0).map(|(id, _)| *id).collect();

            for item in &items {
                *frequency.entry(*item).or_insert(0) += 1;
            }

            for a in &items {
                for b in &items {
                    if a == b {
                        continue;
                    }
                    *co_occurrence.entry(*a).or_default().entry(*b).or_insert(0) += 1;
                }
            }
        }

        Self {
            preference,
            frequency: ItemFrequency(frequency),
            co_occurrence: CoOccurrence(co_occurrence),
        }
    }

    pub fn preference(&self) -> &UserPreference {
        &self.preference
    }

    pub fn frequency(&self) -> &ItemFrequency {
        &self.frequency
    }

    pub fn co_occurrence(&self) -> &CoOccurrence {
        &self.co_occurrence
    }

    pub fn is_empty(&self) -> bool {
        self.preference.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserId;
    use crate::recommend::feedback::{FeedbackEvent, FeedbackKind};

    fn purchase(user: i64, product: i64) -> FeedbackEvent {
        FeedbackEvent {
            user_id: UserId(user),
            product_id: ProductId(product),
            kind: FeedbackKind::Purchase,
            weight: 1.0,
        }
    }

    fn sample_context() -> RecommendationContext {
        let preference: UserPreference = vec![
            purchase(1, 10),
            purchase(1, 10),
            purchase(1, 20),
            purchase(1, 30),
            purchase(2, 10),
            purchase(2, 30),
            purchase(3, 40),
        ]
        .into_iter()
        .collect();
        RecommendationContext::build(preference)
    }

    #[test]
    fn frequency_counts_distinct_users_not_weight() {
        let context = sample_context();

        assert_eq!(context.frequency().get(ProductId(10)), 2);
        assert_eq!(context.frequency().get(ProductId(20)), 1);
        assert_eq!(context.frequency().get(ProductId(30)), 2);
        assert_eq!(context.frequency().get(ProductId(40)), 1);
        assert_eq!(context.frequency().get(ProductId(99)), 0);
    }

    #[test]
    fn frequency_matches_positive_preference_rows() {
        let context = sample_context();

        for (product, count) in context.frequency().iter() {
            let holders = context
                .preference()
                .iter()
                .filter(|(_, row)| row.get(product).is_some_and(|score| *score > 0.0))
                .count();
            assert_eq!(*count as usize, holders);
        }
    }

    #[test]
    fn co_occurrence_is_symmetric_without_diagonal() {
        let context = sample_context();
        let matrix = context.co_occurrence();

        assert_eq!(matrix.get(ProductId(10), ProductId(30)), 2);
        assert_eq!(matrix.get(ProductId(10), ProductId(20)), 1);
        assert_eq!(matrix.get(ProductId(10), ProductId(10)), 0);
        assert!(matrix.neighbours(ProductId(40)).is_none());

        for (a, row) in matrix.iter() {
            for (b, count) in row {
                assert_ne!(a, b);
                assert_eq!(*count, matrix.get(*b, *a));
            }
        }
    }

    #[test]
    fn empty_preference_builds_empty_context() {
        let context = RecommendationContext::build(UserPreference::default());

        assert!(context.is_empty());
        assert!(context.frequency().is_empty());
        assert!(context.co_occurrence().is_empty());
        assert_eq!(context, RecommendationContext::empty());
    }
}
