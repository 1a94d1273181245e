use axum::extract::State;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::format::CourseDetail;
use crate::database::models::{Course, CourseForm};
use crate::filter::CourseSearch;
use crate::middleware::{ApiResponse, ApiResult, CurrentActor};
use crate::state::AppState;
use crate::types::Page;

use super::{AppJson, AppPath, AppQuery};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search_type: Option<String>,
    pub kw: Option<String>,
    pub level_id: Option<i32>,
    pub page: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RandomQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InstructorQuery {
    pub page: Option<i64>,
    pub level_id: Option<i32>,
    pub kw: Option<String>,
}

/// GET /api/classes - filtered, paged course listing
pub async fn list(
    State(state): State<AppState>,
    actor: CurrentActor,
    AppQuery(query): AppQuery<ListQuery>,
) -> ApiResult<Page<Course>> {
    let search = CourseSearch {
        search_type: query.search_type,
        kw: query.kw,
        level_id: query.level_id,
    };
    let page = state.classes.list(actor.get(), &search, query.page).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/classes/visible - everything the caller's level allows
pub async fn visible(State(state): State<AppState>, actor: CurrentActor) -> ApiResult<Vec<Course>> {
    Ok(ApiResponse::success(state.classes.visible_to(actor.get()).await?))
}

/// GET /api/classes/random - random sample
pub async fn random(
    State(state): State<AppState>,
    actor: CurrentActor,
    AppQuery(query): AppQuery<RandomQuery>,
) -> ApiResult<Vec<Course>> {
    Ok(ApiResponse::success(state.classes.random(actor.get(), query.limit).await?))
}

/// GET /api/classes/instructor/:id - one instructor's courses, most enrolled first
pub async fn by_instructor(
    State(state): State<AppState>,
    AppPath(instructor_id): AppPath<Uuid>,
    AppQuery(query): AppQuery<InstructorQuery>,
) -> ApiResult<Page<Course>> {
    let page = state
        .classes
        .instructor_page(instructor_id, query.page, query.level_id, query.kw.as_deref())
        .await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/classes/instructor/:id/all - every course of one instructor, unpaged
pub async fn all_by_instructor(
    State(state): State<AppState>,
    AppPath(instructor_id): AppPath<Uuid>,
) -> ApiResult<Vec<Course>> {
    Ok(ApiResponse::success(state.classes.by_instructor(instructor_id).await?))
}

/// GET /api/classes/:id - course with its rating figures
pub async fn detail(State(state): State<AppState>, AppPath(id): AppPath<Uuid>) -> ApiResult<CourseDetail> {
    let course = state.classes.get(id).await?;
    let average_rating = state.reviews.average_rating(id).await?;
    let review_count = state.reviews.count_for_course(id).await?;

    Ok(ApiResponse::success(CourseDetail {
        course,
        average_rating,
        review_count,
    }))
}

/// POST /api/classes
pub async fn create(
    State(state): State<AppState>,
    actor: CurrentActor,
    AppJson(form): AppJson<CourseForm>,
) -> ApiResult<Course> {
    let actor = actor.require()?;
    Ok(ApiResponse::created(state.classes.create(actor, form).await?))
}

/// PUT /api/classes/:id
pub async fn update(
    State(state): State<AppState>,
    actor: CurrentActor,
    AppPath(id): AppPath<Uuid>,
    AppJson(form): AppJson<CourseForm>,
) -> ApiResult<Course> {
    let actor = actor.require()?;
    Ok(ApiResponse::success(state.classes.update(actor, id, form).await?))
}

/// DELETE /api/classes/:id
pub async fn delete(
    State(state): State<AppState>,
    actor: CurrentActor,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<()> {
    let actor = actor.require()?;
    state.classes.delete(actor, id).await?;
    Ok(ApiResponse::<()>::no_content())
}
