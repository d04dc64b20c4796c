//! Speech endpoints

use axum::extract::{Path, Query, State};
use axum::Json;
use hansard_common::db::PartWithTalker;

use super::RequestScope;
use crate::error::ApiResult;
use crate::pagination::{PageRequest, PageResponse, SPEECH_PAGE_BOUNDS};
use crate::queries::{self, SpeechDetail};
use crate::AppState;

/// GET /api/speeches
pub async fn list_speeches(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Json<PageResponse<PartWithTalker>>> {
    let scope = RequestScope::new(&state, pairs);
    let page = PageRequest::from_params(&scope.params, SPEECH_PAGE_BOUNDS);
    let rows = queries::speeches(&state.store, &scope.ctx, &scope.filters(), page).await?;
    Ok(Json(PageResponse::new(rows, page)))
}

/// GET /api/speeches/:id
pub async fn get_speech(
    State(state): State<AppState>,
    Path(speech_id): Path<String>,
) -> ApiResult<Json<SpeechDetail>> {
    let scope = RequestScope::new(&state, Vec::new());
    Ok(Json(
        queries::speech_detail(&state.store, &scope.ctx, &speech_id).await?,
    ))
}
