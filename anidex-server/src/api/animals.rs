//! Persisted animal record browsing
//!
//! GET /api/animals (filter, search, paginate) and GET /api/animals/:id

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    db,
    error::{ApiError, ApiResult},
    models::{Animal, AnimalFilter},
    pagination::{resolve_page, PAGE_SIZE},
    pipeline::RequestOrigin,
    storage::media_url_path,
    AppState,
};

/// Query parameters for record listing
#[derive(Debug, Deserialize)]
pub struct AnimalListQuery {
    /// Exact label filter
    pub predicted_label: Option<String>,

    /// Substring search over label and info
    pub search: Option<String>,

    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

impl AnimalListQuery {
    fn filter(&self) -> AnimalFilter {
        AnimalFilter {
            predicted_label: non_blank(&self.predicted_label),
            search: non_blank(&self.search),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// One record as returned by the API
#[derive(Debug, Serialize)]
pub struct AnimalView {
    pub id: i64,
    pub image: String,
    pub image_url: String,
    pub predicted_label: Option<String>,
    pub info: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Label, or "Unlabeled Animal"
    pub display_name: String,
}

impl AnimalView {
    fn new(animal: Animal, origin: &RequestOrigin) -> Self {
        Self {
            image_url: origin.absolute_url(&media_url_path(&animal.image)),
            display_name: animal.to_string(),
            id: animal.id,
            image: animal.image,
            predicted_label: animal.predicted_label,
            info: animal.info,
            created_at: animal.created_at,
        }
    }
}

/// Paginated listing response
#[derive(Debug, Serialize)]
pub struct AnimalListResponse {
    pub total_results: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub animals: Vec<AnimalView>,
}

/// GET /api/animals
pub async fn list_animals(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AnimalListQuery>,
) -> ApiResult<Json<AnimalListResponse>> {
    let filter = query.filter();

    let total_results = db::animals::count_animals(&state.db, &filter).await?;
    let page = resolve_page(total_results, query.page);
    let animals = db::animals::list_animals(&state.db, &filter, PAGE_SIZE, page.offset).await?;

    let origin = state.origin_for(&headers);

    Ok(Json(AnimalListResponse {
        total_results,
        page: page.number,
        page_size: PAGE_SIZE,
        total_pages: page.total_pages,
        animals: animals
            .into_iter()
            .map(|animal| AnimalView::new(animal, &origin))
            .collect(),
    }))
}

/// GET /api/animals/:id
pub async fn get_animal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<Json<AnimalView>> {
    let animal = db::animals::get_animal(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Animal {} not found", id)))?;

    let origin = state.origin_for(&headers);
    Ok(Json(AnimalView::new(animal, &origin)))
}

/// Build record browsing routes
pub fn animal_routes() -> Router<AppState> {
    Router::new()
        .route("/api/animals", get(list_animals))
        .route("/api/animals/:id", get(get_animal))
}
