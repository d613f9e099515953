//! Recommendation service: context build, ranking, assembly and backfill

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use super::cooccurrence::RecommendationContext;
use super::feedback::FeedbackAggregator;
use super::rotation::rotate_page;
use super::scoring::ScoringEngine;
use super::store::RecommendationStore;
use super::types::{PageRequest, Recommendation, RecommendationPath, RecommendSettings};
use crate::domain::order::OrderId;
use crate::domain::product::{Product, ProductId};
use crate::domain::user::UserId;
use crate::errors::ApplicationError;

/// Entry point for the two storefront operations: personalised and popular lists.
#[derive(Debug, Clone)]
pub struct RecommendService<S> {
    store: S,
    settings: RecommendSettings,
    scorer: ScoringEngine,
}

impl<S: RecommendationStore> RecommendService<S> {
    pub fn new(store: S) -> Self {
        Self::with_settings(store, RecommendSettings::default())
    }

    pub fn with_settings(store: S, settings: RecommendSettings) -> Self {
        Self { store, settings, scorer: ScoringEngine::new() }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> RecommendSettings {
        self.settings
    }

    /// Personalised products for `user_id`, falling back to best sellers.
    pub async fn recommend_for_user(
        &self,
        user_id: Option<UserId>,
        limit: i64,
        page: i64,
    ) -> Result<Vec<Product>, ApplicationError> {
        Ok(self.recommend(user_id, limit, page).await?.products)
    }

    /// Best sellers for the requested page.
    pub async fn popular(&self, limit: i64, page: i64) -> Result<Vec<Product>, ApplicationError> {
        let request = PageRequest::normalize(limit, page, self.settings.default_limit);
        self.fetch_popular(request).await
    }

    /// Same as [`Self::recommend_for_user`], also reporting which path served it.
    pub async fn recommend(
        &self,
        user_id: Option<UserId>,
        limit: i64,
        page: i64,
    ) -> Result<Recommendation, ApplicationError> {
        let request = PageRequest::normalize(limit, page, self.settings.default_limit);

        let Some(user_id) = user_id else {
            return self.serve_popular(request, RecommendationPath::ColdStart, None).await;
        };

        let context = self.build_context().await?;
        if context.preference().for_user(user_id).is_none() {
            return self.serve_popular(request, RecommendationPath::ColdStart, Some(user_id)).await;
        }

        let ranked = self.scorer.score(Some(user_id), request.limit, &context);
        if ranked.is_empty() {
            return self
                .serve_popular(request, RecommendationPath::NoCandidates, Some(user_id))
                .await;
        }

        let window = rotate_page(&ranked, request.limit, request.page);
        let mut products = self.fetch_ordered(&window).await?;
        let personalized_count = products.len();

        if products.len() < request.limit {
            self.backfill(&mut products, request).await?;
        }

        info!(
            event_name = "recommend.served",
            path = RecommendationPath::Personalized.as_str(),
            user_id = user_id.0,
            limit = request.limit,
            page = request.page,
            personalized = personalized_count,
            backfilled = products.len() - personalized_count,
            "personalised recommendations assembled"
        );

        Ok(Recommendation { products, path: RecommendationPath::Personalized, personalized_count })
    }

    /// Rebuild the request-scoped matrices from the store.
    pub async fn build_context(&self) -> Result<RecommendationContext, ApplicationError> {
        let orders = self.store.list_all_orders().await?;
        if orders.is_empty() {
            debug!(
                event_name = "recommend.context_empty",
                "no orders on record; serving best sellers"
            );
            return Ok(RecommendationContext::empty());
        }

        let order_ids: Vec<OrderId> = orders.iter().map(|order| order.id).collect();
        let items = self.store.list_order_items_by_order_ids(&order_ids).await?;
        let collections = self.store.list_all_collections().await?;

        let preference = FeedbackAggregator::new(self.settings.weights).aggregate(
            &orders,
            &items,
            &collections,
        );
        let context = RecommendationContext::build(preference);

        debug!(
            event_name = "recommend.context_built",
            orders = orders.len(),
            order_items = items.len(),
            collections = collections.len(),
            users = context.preference().user_count(),
            items = context.frequency().len(),
            "recommendation context rebuilt"
        );

        Ok(context)
    }

    async fn serve_popular(
        &self,
        request: PageRequest,
        path: RecommendationPath,
        user_id: Option<UserId>,
    ) -> Result<Recommendation, ApplicationError> {
        let products = self.fetch_popular(request).await?;

        info!(
            event_name = "recommend.served",
            path = path.as_str(),
            user_id = user_id.map(|id| id.0),
            limit = request.limit,
            page = request.page,
            returned = products.len(),
            "served popularity fallback"
        );

        Ok(Recommendation { products, path, personalized_count: 0 })
    }

    async fn fetch_popular(&self, request: PageRequest) -> Result<Vec<Product>, ApplicationError> {
        let pool_size =
            request.limit.saturating_mul(self.settings.popular_pool_factor).max(request.limit);
        let pool = self.store.top_selling_products(pool_size).await?;
        Ok(rotate_page(&pool, request.limit, request.page))
    }

    /// Resolve ids to products, keeping the ranked order. Unknown ids drop out.
    async fn fetch_ordered(&self, ids: &[ProductId]) -> Result<Vec<Product>, ApplicationError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut seen = HashSet::with_capacity(ids.len());
        let unique: Vec<ProductId> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();

        let mut by_id: HashMap<ProductId, Product> = HashMap::with_capacity(unique.len());
        for product in self.store.find_products_by_ids(&unique).await? {
            by_id.entry(product.id).or_insert(product);
        }

        Ok(unique.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn backfill(
        &self,
        products: &mut Vec<Product>,
        request: PageRequest,
    ) -> Result<(), ApplicationError> {
        let mut present: HashSet<ProductId> = products.iter().map(|product| product.id).collect();

        for product in self.fetch_popular(request).await? {
            if products.len() >= request.limit {
                break;
            }
            if present.insert(product.id) {
                products.push(product);
            }
        }

        Ok(())
    }
}
