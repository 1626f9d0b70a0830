//! Geocoding proxy handler

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    validation::non_blank,
};

/// Query parameters for address search
#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    pub q: Option<String>,
}

/// Forward an address search to the geocoding service
pub async fn search(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<GeocodeQuery>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let q = non_blank(query.q)
        .ok_or_else(|| ApiError::Validation("Query parameter required".to_string()))?;

    let results = state.geocoder.search(&q).await?;
    Ok(Json(results))
}
