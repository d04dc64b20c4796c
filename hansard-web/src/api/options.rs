//! Filter option lists

use axum::extract::State;
use axum::Json;

use super::RequestScope;
use crate::error::ApiResult;
use crate::queries::{filter_options, FilterOptions};
use crate::AppState;

/// GET /api/filters
pub async fn get_filter_options(State(state): State<AppState>) -> ApiResult<Json<FilterOptions>> {
    let scope = RequestScope::new(&state, Vec::new());
    Ok(Json(filter_options(&state.store, &scope.ctx).await?))
}
