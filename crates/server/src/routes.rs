//! Storefront recommendation endpoints.
//!
//! - `GET /api/home/recommend/personal?size=&page=`: personalised list for the
//!   caller named by `x-user-id`; anonymous callers get the popular list
//! - `GET /api/home/recommend/popular?size=&page=`: best sellers
//!
//! Both answer with the storefront envelope `{ code, msg, data }`.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use agrimall_core::domain::product::Product;
use agrimall_core::domain::user::UserId;
use agrimall_core::errors::InterfaceError;
use agrimall_core::recommend::{RecommendService, RecommendationStore};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

pub struct RecommendState<S> {
    service: Arc<RecommendService<S>>,
}

impl<S> Clone for RecommendState<S> {
    fn clone(&self) -> Self {
        Self { service: Arc::clone(&self.service) }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub size: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self { code: 0, msg: "success".to_string(), data: Some(data), correlation_id: None }
    }
}

#[derive(Debug)]
pub struct ApiError(InterfaceError);

impl From<InterfaceError> for ApiError {
    fn from(error: InterfaceError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        warn!(
            event_name = "http.recommend.failed",
            correlation_id = %self.0.correlation_id(),
            status = status.as_u16(),
            error = %self.0,
            "recommendation request failed"
        );

        let body: ApiResponse<()> = ApiResponse {
            code: status.as_u16(),
            msg: self.0.user_message().to_string(),
            data: None,
            correlation_id: Some(self.0.correlation_id().to_string()),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router<S>(service: Arc<RecommendService<S>>) -> Router
where
    S: RecommendationStore + 'static,
{
    Router::new()
        .route("/api/home/recommend/personal", get(personal::<S>))
        .route("/api/home/recommend/popular", get(popular::<S>))
        .with_state(RecommendState { service })
}

async fn personal<S>(
    State(state): State<RecommendState<S>>,
    headers: HeaderMap,
    Query(params): Query<PageParams>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError>
where
    S: RecommendationStore + 'static,
{
    let correlation_id = correlation_id(&headers);
    let user_id = caller(&headers, &correlation_id)?;
    let (size, page) = page_params(&params, &correlation_id)?;

    let recommendation = state
        .service
        .recommend(user_id, size, page)
        .await
        .map_err(|error| error.into_interface(correlation_id.clone()))?;

    info!(
        event_name = "http.recommend.personal",
        correlation_id = %correlation_id,
        user_id = user_id.map(|id| id.0),
        size,
        page,
        path = recommendation.path.as_str(),
        returned = recommendation.products.len(),
        "served personalised recommendations"
    );

    Ok(Json(ApiResponse::success(recommendation.products)))
}

async fn popular<S>(
    State(state): State<RecommendState<S>>,
    headers: HeaderMap,
    Query(params): Query<PageParams>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError>
where
    S: RecommendationStore + 'static,
{
    let correlation_id = correlation_id(&headers);
    let (size, page) = page_params(&params, &correlation_id)?;

    let products = state
        .service
        .popular(size, page)
        .await
        .map_err(|error| error.into_interface(correlation_id.clone()))?;

    info!(
        event_name = "http.recommend.popular",
        correlation_id = %correlation_id,
        size,
        page,
        returned = products.len(),
        "served popular products"
    );

    Ok(Json(ApiResponse::success(products)))
}

fn correlation_id(headers: &HeaderMap) -> String {
    headers
        .get(CORRELATION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Missing header means an anonymous shopper; anything unparsable is rejected.
fn caller(headers: &HeaderMap, correlation_id: &str) -> Result<Option<UserId>, ApiError> {
    let Some(raw) = headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };

    raw.to_str()
        .ok()
        .and_then(|value| value.parse::<UserId>().ok())
        .map(Some)
        .ok_or_else(|| {
            InterfaceError::bad_request(format!("{USER_ID_HEADER} must be an integer"), correlation_id)
                .into()
        })
}

/// Absent `size` falls through to the engine's default limit; absent `page` is 0.
fn page_params(params: &PageParams, correlation_id: &str) -> Result<(i64, i64), ApiError> {
    let size = parse_param("size", params.size.as_deref(), correlation_id)?;
    let page = parse_param("page", params.page.as_deref(), correlation_id)?;
    Ok((size, page))
}

fn parse_param(name: &str, raw: Option<&str>, correlation_id: &str) -> Result<i64, ApiError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(0),
        Some(value) => value.parse::<i64>().map_err(|_| {
            InterfaceError::bad_request(format!("`{name}` must be an integer"), correlation_id)
                .into()
        }),
    }
}
