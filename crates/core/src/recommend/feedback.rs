//! Implicit feedback aggregation

use std::collections::HashMap;

use super::types::FeedbackWeights;
use crate::domain::collection::Collection;
use crate::domain::order::{OrderHeader, OrderId, OrderItem};
use crate::domain::product::ProductId;
use crate::domain::user::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Purchase,
    Collect,
}

/// One observed signal, already resolved to its owning user
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackEvent {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub kind: FeedbackKind,
    pub weight: f64,
}

/// `user -> (product -> summed weight)`. Scores only ever grow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPreference {
    scores: HashMap<UserId, HashMap<ProductId, f64>>,
}

impl UserPreference {
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn user_count(&self) -> usize {
        self.scores.len()
    }

    /// The user's preference row, or `None` when the user has no signal
    pub fn for_user(&self, user_id: UserId) -> Option<&HashMap<ProductId, f64>> {
        self.scores.get(&user_id).filter(|row| !row.is_empty())
    }

    pub fn score(&self, user_id: UserId, product_id: ProductId) -> f64 {
        self.scores.get(&user_id).and_then(|row| row.get(&product_id)).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UserId, &HashMap<ProductId, f64>)> {
        self.scores.iter()
    }

    pub fn record(&mut self, event: FeedbackEvent) {
        if !(event.weight.is_finite() && event.weight > 0.0) {
            return;
        }
        *self.scores.entry(event.user_id).or_default().entry(event.product_id).or_insert(0.0) +=
            event.weight;
    }
}

impl FromIterator<FeedbackEvent> for UserPreference {
    fn from_iter<I: IntoIterator<Item = FeedbackEvent>>(events: I) -> Self {
        let mut preference = UserPreference::default();
        for event in events {
            preference.record(event);
        }
        preference
    }
}

/// Turns raw purchase lines and collection records into a [`UserPreference`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedbackAggregator {
    weights: FeedbackWeights,
}

impl FeedbackAggregator {
    pub fn new(weights: FeedbackWeights) -> Self {
        Self { weights }
    }

    /// Resolve every usable record into a feedback event. Lines whose order has
    /// no known owner, and records missing a user or product, are skipped.
    pub fn events(
        &self,
        orders: &[OrderHeader],
        items: &[OrderItem],
        collections: &[Collection],
    ) -> Vec<FeedbackEvent> {
        let owners: HashMap<OrderId, UserId> = orders
            .iter()
            .filter_map(|order| order.user_id.map(|user_id| (order.id, user_id)))
            .collect();

        let purchases = items.iter().filter_map(|item| {
            let user_id = owners.get(&item.order_id).copied()?;
            let product_id = item.product_id?;
            Some(FeedbackEvent {
                user_id,
                product_id,
                kind: FeedbackKind::Purchase,
                weight: self.weights.purchase,
            })
        });

        let collects = collections.iter().filter_map(|collection| {
            Some(FeedbackEvent {
                user_id: collection.user_id?,
                product_id: collection.product_id?,
                kind: FeedbackKind::Collect,
                weight: self.weights.collect,
            })
        });

        purchases.chain(collects).collect()
    }

    /// Sum all feedback into per-user preference rows
    pub fn aggregate(
        &self,
        orders: &[OrderHeader],
        items: &[OrderItem],
        collections: &[Collection],
    ) -> UserPreference {
        self.events(orders, items, collections).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: i64, user: Option<i64>) -> OrderHeader {
        OrderHeader { id: OrderId(id), user_id: user.map(UserId) }
    }

    fn item(order_id: i64, product: Option<i64>) -> OrderItem {
        OrderItem { order_id: OrderId(order_id), product_id: product.map(ProductId) }
    }

    fn collect(user: Option<i64>, product: Option<i64>) -> Collection {
        Collection { user_id: user.map(UserId), product_id: product.map(ProductId) }
    }

    #[test]
    fn repeated_purchases_accumulate() {
        let aggregator = FeedbackAggregator::default();
        let preference = aggregator.aggregate(
            &[order(1, Some(7)), order(2, Some(7))],
            &[item(1, Some(100)), item(2, Some(100))],
            &[],
        );

        assert_eq!(preference.score(UserId(7), ProductId(100)), 2.0);
    }

    #[test]
    fn purchases_and_collections_sum_with_their_weights() {
        let aggregator = FeedbackAggregator::default();
        let preference = aggregator.aggregate(
            &[order(1, Some(7))],
            &[item(1, Some(100))],
            &[collect(Some(7), Some(100)), collect(Some(7), Some(200))],
        );

        assert_eq!(preference.score(UserId(7), ProductId(100)), 1.5);
        assert_eq!(preference.score(UserId(7), ProductId(200)), 0.5);
    }

    #[test]
    fn unresolvable_records_are_skipped() {
        let aggregator = FeedbackAggregator::default();
        let preference = aggregator.aggregate(
            &[order(1, None), order(2, Some(9))],
            &[item(1, Some(100)), item(2, None), item(404, Some(100))],
            &[collect(None, Some(100)), collect(Some(9), None)],
        );

        assert!(preference.is_empty());
        assert!(preference.for_user(UserId(9)).is_none());
    }

    #[test]
    fn collections_score_for_users_without_purchases() {
        let aggregator = FeedbackAggregator::default();
        let preference = aggregator.aggregate(&[], &[], &[collect(Some(3), Some(10))]);

        assert_eq!(preference.user_count(), 1);
        assert_eq!(preference.score(UserId(3), ProductId(10)), 0.5);
    }

    #[test]
    fn custom_weights_flow_into_events() {
        let weights = FeedbackWeights::new(2.0, 0.25).expect("valid weights");
        let aggregator = FeedbackAggregator::new(weights);
        let events =
            aggregator.events(&[order(1, Some(1))], &[item(1, Some(5))], &[collect(Some(1), Some(6))]);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, FeedbackKind::Purchase);
        assert_eq!(events[0].weight, 2.0);
        assert_eq!(events[1].kind, FeedbackKind::Collect);
        assert_eq!(events[1].weight, 0.25);
    }

    #[test]
    fn empty_feeds_yield_empty_preference() {
        let preference = FeedbackAggregator::default().aggregate(&[], &[], &[]);
        assert!(preference.is_empty());
    }
}
