use axum::extract::State;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::format::ReviewSummary;
use crate::database::models::Review;
use crate::middleware::{ApiResponse, ApiResult, CurrentActor};
use crate::state::AppState;
use crate::types::Page;

use super::{AppJson, AppPath, AppQuery};

#[derive(Debug, Deserialize)]
pub struct ReviewBody {
    pub rating: i32,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
}

/// GET /api/reviews/classes/:id - reviews of a course, newest first
pub async fn page_for_course(
    State(state): State<AppState>,
    AppPath(course_id): AppPath<Uuid>,
    AppQuery(query): AppQuery<PageQuery>,
) -> ApiResult<Page<Review>> {
    Ok(ApiResponse::success(state.reviews.page_for_course(course_id, query.page).await?))
}

/// GET /api/reviews/classes/:id/all - every review of a course, newest first
pub async fn all_for_course(
    State(state): State<AppState>,
    AppPath(course_id): AppPath<Uuid>,
) -> ApiResult<Vec<Review>> {
    Ok(ApiResponse::success(state.reviews.list_for_course(course_id).await?))
}

/// GET /api/reviews/classes/:id/summary
pub async fn summary(
    State(state): State<AppState>,
    actor: CurrentActor,
    AppPath(course_id): AppPath<Uuid>,
) -> ApiResult<ReviewSummary> {
    // 404 for unknown courses rather than an empty summary
    state.classes.get(course_id).await?;

    let mine = match actor.get() {
        Some(a) => state.reviews.find_mine(a, course_id).await?,
        None => None,
    };

    Ok(ApiResponse::success(ReviewSummary {
        course_id,
        average_rating: state.reviews.average_rating(course_id).await?,
        review_count: state.reviews.count_for_course(course_id).await?,
        can_write: state.reviews.can_write(actor.get(), course_id).await?,
        mine,
    }))
}

/// POST /api/reviews/classes/:id
pub async fn create(
    State(state): State<AppState>,
    actor: CurrentActor,
    AppPath(course_id): AppPath<Uuid>,
    AppJson(body): AppJson<ReviewBody>,
) -> ApiResult<Review> {
    let actor = actor.require()?;
    let review = state
        .reviews
        .create(actor, course_id, body.rating, body.content)
        .await?;
    Ok(ApiResponse::created(review))
}

/// GET /api/reviews/mine
pub async fn mine(State(state): State<AppState>, actor: CurrentActor) -> ApiResult<Vec<Review>> {
    let actor = actor.require()?;
    Ok(ApiResponse::success(state.reviews.list_mine(actor).await?))
}

/// GET /api/reviews/:id
pub async fn get(State(state): State<AppState>, AppPath(id): AppPath<Uuid>) -> ApiResult<Review> {
    Ok(ApiResponse::success(state.reviews.get(id).await?))
}

/// PUT /api/reviews/:id
pub async fn update(
    State(state): State<AppState>,
    actor: CurrentActor,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<ReviewBody>,
) -> ApiResult<Review> {
    let actor = actor.require()?;
    let review = state.reviews.update(actor, id, body.rating, body.content).await?;
    Ok(ApiResponse::success(review))
}

/// DELETE /api/reviews/:id - author or admin
pub async fn delete(
    State(state): State<AppState>,
    actor: CurrentActor,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<()> {
    let actor = actor.require()?;
    state.reviews.delete(actor, id).await?;
    Ok(ApiResponse::<()>::no_content())
}
