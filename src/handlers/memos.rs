use axum::extract::State;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::format::{memo_views, MemoView};
use crate::middleware::{ApiResponse, ApiResult, CurrentActor};
use crate::state::AppState;

use super::{AppJson, AppPath};

#[derive(Debug, Deserialize)]
pub struct CreateMemo {
    pub content: String,
    #[serde(default)]
    pub video_timestamp: Option<i32>,
}

/// Edit body. Only the content is read; a `video_timestamp` field is ignored.
#[derive(Debug, Deserialize)]
pub struct UpdateMemo {
    pub content: String,
}

/// GET /api/memos/classes/:id - caller's memos on a course, newest first
pub async fn list_for_course(
    State(state): State<AppState>,
    actor: CurrentActor,
    AppPath(course_id): AppPath<Uuid>,
) -> ApiResult<Vec<MemoView>> {
    let actor = actor.require()?;
    let memos = state.memos.list_for_course(actor, course_id).await?;
    Ok(ApiResponse::success(memo_views(memos)))
}

/// GET /api/memos/classes/:id/timeline - caller's memos in video order
pub async fn timeline(
    State(state): State<AppState>,
    actor: CurrentActor,
    AppPath(course_id): AppPath<Uuid>,
) -> ApiResult<Vec<MemoView>> {
    let actor = actor.require()?;
    let memos = state.memos.timeline_for_course(actor, course_id).await?;
    Ok(ApiResponse::success(memo_views(memos)))
}

/// GET /api/memos/classes/:id/count
pub async fn count(
    State(state): State<AppState>,
    actor: CurrentActor,
    AppPath(course_id): AppPath<Uuid>,
) -> ApiResult<i64> {
    let actor = actor.require()?;
    Ok(ApiResponse::success(state.memos.count_for_course(actor, course_id).await?))
}

/// POST /api/memos/classes/:id
pub async fn create(
    State(state): State<AppState>,
    actor: CurrentActor,
    AppPath(course_id): AppPath<Uuid>,
    AppJson(body): AppJson<CreateMemo>,
) -> ApiResult<MemoView> {
    let actor = actor.require()?;
    let memo = state
        .memos
        .create(actor, course_id, &body.content, body.video_timestamp)
        .await?;
    Ok(ApiResponse::created(memo.into()))
}

/// GET /api/memos/mine
pub async fn mine(State(state): State<AppState>, actor: CurrentActor) -> ApiResult<Vec<MemoView>> {
    let actor = actor.require()?;
    Ok(ApiResponse::success(memo_views(state.memos.list_mine(actor).await?)))
}

/// PUT /api/memos/:id
pub async fn update(
    State(state): State<AppState>,
    actor: CurrentActor,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<UpdateMemo>,
) -> ApiResult<MemoView> {
    let actor = actor.require()?;
    let memo = state.memos.update(actor, id, &body.content).await?;
    Ok(ApiResponse::success(memo.into()))
}

/// DELETE /api/memos/:id
pub async fn delete(
    State(state): State<AppState>,
    actor: CurrentActor,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<()> {
    let actor = actor.require()?;
    state.memos.delete(actor, id).await?;
    Ok(ApiResponse::<()>::no_content())
}
