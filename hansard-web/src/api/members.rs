//! Member and talker endpoints

use axum::extract::{Path, Query, State};
use axum::Json;
use hansard_common::db::{SpeechPart, Talker};
use serde::Serialize;

use super::RequestScope;
use crate::error::{ApiError, ApiResult};
use crate::pagination::{PageRequest, PageResponse, MEMBER_PAGE_BOUNDS};
use crate::params::ParamMap;
use crate::queries::{self, MemberDetail, MemberRow};
use crate::AppState;

/// List wrapper used by the talker lookup endpoints
#[derive(Debug, Serialize)]
pub struct ValueList<T> {
    pub value: Vec<T>,
}

/// `limit` must be a positive integer when given
fn parse_limit(params: &ParamMap) -> ApiResult<Option<u32>> {
    let raw = params.str("limit");
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<u32>()
        .ok()
        .filter(|limit| *limit > 0)
        .map(Some)
        .ok_or_else(|| ApiError::BadRequest(format!("limit must be a positive integer, got '{raw}'")))
}

/// GET /api/members
pub async fn list_members(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Json<PageResponse<MemberRow>>> {
    let scope = RequestScope::new(&state, pairs);
    let page = PageRequest::from_params(&scope.params, MEMBER_PAGE_BOUNDS);
    let rows = queries::members(&state.store, &scope.ctx, &scope.filters(), page).await?;
    Ok(Json(PageResponse::new(rows, page)))
}

/// GET /api/members/:id
pub async fn get_member(
    State(state): State<AppState>,
    Path(talker_id): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Json<MemberDetail>> {
    let scope = RequestScope::new(&state, pairs);
    Ok(Json(
        queries::member_detail(&state.store, &scope.ctx, &talker_id, &scope.filters()).await?,
    ))
}

/// GET /api/talkers?q=&limit=
pub async fn search_talkers(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Json<ValueList<Talker>>> {
    let scope = RequestScope::new(&state, pairs);
    let limit = parse_limit(&scope.params)?;
    let q = scope.params.str("q");
    let value = queries::talker_search(&state.store, &scope.ctx, &q, limit).await?;
    Ok(Json(ValueList { value }))
}

/// GET /api/talkers/:id/speeches?limit=
pub async fn talker_speeches(
    State(state): State<AppState>,
    Path(talker_id): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Json<ValueList<SpeechPart>>> {
    let scope = RequestScope::new(&state, pairs);
    let limit = parse_limit(&scope.params)?;
    let value = queries::talker_speeches(&state.store, &scope.ctx, &talker_id, limit).await?;
    Ok(Json(ValueList { value }))
}
