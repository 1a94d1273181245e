use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::auth::guard;
use crate::auth::Actor;
use crate::config::ListingConfig;
use crate::database::manager::DatabaseError;
use crate::database::models::{Enrollment, NewReview, Review, MAX_RATING, MIN_RATING};
use crate::database::{CourseStore, EnrollmentStore, RecordStore, ReviewStore};
use crate::filter;
use crate::services::error::{ServiceError, ServiceResult};
use crate::types::{Operation, Page};

/// Why an actor may not review a course
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligible {
    NotEnrolled,
    NotCompleted,
    AlreadyReviewed,
}

impl Ineligible {
    pub fn message(&self) -> &'static str {
        match self {
            Ineligible::NotEnrolled => "You must be enrolled in this course to review it",
            Ineligible::NotCompleted => "You can review a course only after completing it",
            Ineligible::AlreadyReviewed => "You have already reviewed this course",
        }
    }
}

/// Review eligibility for one (course, actor) pair.
///
/// Completion is checked before the existing review.
pub fn review_eligibility(enrollment: Option<&Enrollment>, existing: Option<&Review>) -> Result<(), Ineligible> {
    match enrollment {
        None => Err(Ineligible::NotEnrolled),
        Some(e) if !e.completed => Err(Ineligible::NotCompleted),
        Some(_) if existing.is_some() => Err(Ineligible::AlreadyReviewed),
        Some(_) => Ok(()),
    }
}

fn validate_rating(rating: i32) -> ServiceResult<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(ServiceError::validation(
            "rating",
            format!("Rating must be between {} and {}", MIN_RATING, MAX_RATING),
        ));
    }
    Ok(())
}

fn normalize_content(content: Option<String>) -> Option<String> {
    content.filter(|c| !c.trim().is_empty())
}

/// Rounded to one decimal; no reviews reads as 0.0
fn round_rating(average: Option<f64>) -> f64 {
    average.map(|avg| (avg * 10.0).round() / 10.0).unwrap_or(0.0)
}

#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn RecordStore>,
    listing: ListingConfig,
}

impl ReviewService {
    pub fn new(store: Arc<dyn RecordStore>, listing: ListingConfig) -> Self {
        Self { store, listing }
    }

    pub async fn create(
        &self,
        actor: &Actor,
        course_id: Uuid,
        rating: i32,
        content: Option<String>,
    ) -> ServiceResult<Review> {
        guard::resolve(self.store.find_course(course_id).await?)?;
        validate_rating(rating)?;

        let enrollment = self.store.find_enrollment(course_id, actor.id).await?;
        let existing = self.store.find_user_review(course_id, actor.id).await?;
        if let Err(reason) = review_eligibility(enrollment.as_ref(), existing.as_ref()) {
            return Err(ServiceError::conflict(reason.message()));
        }

        let new_review = NewReview {
            course_id,
            user_id: actor.id,
            rating,
            content: normalize_content(content),
        };
        match self.store.insert_review(new_review).await {
            Ok(review) => {
                info!(review = %review.id, course = %course_id, actor = %actor.id, rating, "created review");
                Ok(review)
            }
            // lost a race with a concurrent insert for the same pair
            Err(DatabaseError::UniqueViolation(_)) => {
                Err(ServiceError::conflict(Ineligible::AlreadyReviewed.message()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Review> {
        guard::resolve(self.store.find_review(id).await?)
    }

    /// Newest first
    pub async fn list_for_course(&self, course_id: Uuid) -> ServiceResult<Vec<Review>> {
        guard::resolve(self.store.find_course(course_id).await?)?;
        Ok(self.store.reviews_for_course(course_id).await?)
    }

    pub async fn page_for_course(&self, course_id: Uuid, page: Option<i64>) -> ServiceResult<Page<Review>> {
        let request = filter::page_request(page, self.listing.page_size)?;
        guard::resolve(self.store.find_course(course_id).await?)?;
        Ok(self.store.page_reviews(course_id, request).await?)
    }

    pub async fn find_mine(&self, actor: &Actor, course_id: Uuid) -> ServiceResult<Option<Review>> {
        Ok(self.store.find_user_review(course_id, actor.id).await?)
    }

    pub async fn list_mine(&self, actor: &Actor) -> ServiceResult<Vec<Review>> {
        Ok(self.store.reviews_for_user(actor.id).await?)
    }

    pub async fn count_for_course(&self, course_id: Uuid) -> ServiceResult<i64> {
        Ok(self.store.count_reviews(course_id).await?)
    }

    /// Same rule as `create`, answered as a flag
    pub async fn can_write(&self, actor: Option<&Actor>, course_id: Uuid) -> ServiceResult<bool> {
        let Some(actor) = actor else {
            return Ok(false);
        };
        let enrollment = self.store.find_enrollment(course_id, actor.id).await?;
        let existing = self.store.find_user_review(course_id, actor.id).await?;
        Ok(review_eligibility(enrollment.as_ref(), existing.as_ref()).is_ok())
    }

    pub async fn average_rating(&self, course_id: Uuid) -> ServiceResult<f64> {
        Ok(round_rating(self.store.average_rating(course_id).await?))
    }

    pub async fn update(&self, actor: &Actor, id: Uuid, rating: i32, content: Option<String>) -> ServiceResult<Review> {
        let found = self.store.find_review(id).await?;
        guard::authorize(actor, found, Operation::Edit)?;
        validate_rating(rating)?;

        let content = normalize_content(content);
        let review = self.store.update_review(id, rating, content.as_deref()).await?;
        info!(review = %id, actor = %actor.id, rating, "updated review");
        Ok(review)
    }

    /// Authors delete their own reviews; admins may delete any
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> ServiceResult<()> {
        let found = self.store.find_review(id).await?;
        let review = guard::authorize(actor, found, Operation::Delete)?;

        self.store.delete_review(id).await?;
        info!(review = %id, author = %review.user_id, actor = %actor.id, "deleted review");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::testing::{Race, RacingStore, TestContext};
    use chrono::Utc;

    fn enrollment(completed: bool) -> Enrollment {
        Enrollment {
            id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            completed,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn eligibility_checks_completion_before_duplicates() {
        let now = Utc::now();
        let existing = Review {
            id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            rating: 5,
            content: None,
            created_at: now,
            updated_at: now,
        };

        assert_eq!(review_eligibility(None, None), Err(Ineligible::NotEnrolled));
        assert_eq!(
            review_eligibility(Some(&enrollment(false)), Some(&existing)),
            Err(Ineligible::NotCompleted)
        );
        assert_eq!(
            review_eligibility(Some(&enrollment(true)), Some(&existing)),
            Err(Ineligible::AlreadyReviewed)
        );
        assert_eq!(review_eligibility(Some(&enrollment(true)), None), Ok(()));
    }

    #[test]
    fn rounds_to_one_decimal() {
        assert_eq!(round_rating(None), 0.0);
        assert_eq!(round_rating(Some(4.0)), 4.0);
        assert_eq!(round_rating(Some(11.0 / 3.0)), 3.7);
    }

    #[tokio::test]
    async fn review_needs_a_completed_enrollment() {
        let ctx = TestContext::new().await;
        let course = ctx.course("Rust", 1).await;
        let svc = ctx.reviews();
        let learner = TestContext::actor(&ctx.learner);

        let err = svc.create(&learner, course.id, 5, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::StateConflict(_)));

        ctx.enroll(course.id, learner.id, false).await;
        let err = svc.create(&learner, course.id, 5, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::StateConflict(ref m) if m == Ineligible::NotCompleted.message()));
        assert_eq!(svc.count_for_course(course.id).await.unwrap(), 0);

        ctx.store.set_completed(course.id, learner.id, true).await.unwrap();
        svc.create(&learner, course.id, 5, Some("great".to_string())).await.unwrap();

        let err = svc.create(&learner, course.id, 4, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::StateConflict(ref m) if m == Ineligible::AlreadyReviewed.message()));
        assert_eq!(svc.count_for_course(course.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn rating_bounds_on_create_and_update() {
        let ctx = TestContext::new().await;
        let course = ctx.course("Rust", 1).await;
        let svc = ctx.reviews();
        let learner = TestContext::actor(&ctx.learner);

        for rating in [0, 6] {
            let err = svc.create(&learner, course.id, rating, None).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "rating"));
        }

        ctx.enroll(course.id, learner.id, true).await;
        let review = svc.create(&learner, course.id, 1, None).await.unwrap();
        assert_eq!(review.rating, 1);

        for rating in [0, 6] {
            let err = svc.update(&learner, review.id, rating, None).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation { .. }));
        }
        let updated = svc.update(&learner, review.id, 5, Some("better".to_string())).await.unwrap();
        assert_eq!(updated.rating, 5);
        assert_eq!(updated.content.as_deref(), Some("better"));
    }

    #[tokio::test]
    async fn missing_course_wins_over_bad_rating() {
        let ctx = TestContext::new().await;
        let learner = TestContext::actor(&ctx.learner);
        let err = ctx.reviews().create(&learner, Uuid::new_v4(), 9, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn admin_may_delete_but_not_edit() {
        let ctx = TestContext::new().await;
        let course = ctx.course("Rust", 1).await;
        let svc = ctx.reviews();
        let author = TestContext::actor(&ctx.learner);
        let admin = TestContext::actor(&ctx.admin);
        let stranger = TestContext::actor(&ctx.user("stranger", Role::Learner, None).await);
        ctx.enroll(course.id, author.id, true).await;
        let review = svc.create(&author, course.id, 4, None).await.unwrap();

        let err = svc.update(&admin, review.id, 1, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        let err = svc.delete(&stranger, review.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        let err = svc.update(&stranger, Uuid::new_v4(), 3, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        svc.delete(&admin, review.id).await.unwrap();
        assert!(matches!(svc.get(review.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn average_of_four_five_three_is_four() {
        let ctx = TestContext::new().await;
        let course = ctx.course("Rust", 1).await;
        let empty = ctx.course("Empty", 1).await;
        let svc = ctx.reviews();

        for (login, rating) in [("a", 4), ("b", 5), ("c", 3)] {
            let actor = TestContext::actor(&ctx.user(login, Role::Learner, None).await);
            ctx.enroll(course.id, actor.id, true).await;
            svc.create(&actor, course.id, rating, None).await.unwrap();
        }

        assert_eq!(svc.average_rating(course.id).await.unwrap(), 4.0);
        assert_eq!(svc.average_rating(empty.id).await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn can_write_follows_eligibility() {
        let ctx = TestContext::new().await;
        let course = ctx.course("Rust", 1).await;
        let svc = ctx.reviews();
        let learner = TestContext::actor(&ctx.learner);

        assert!(!svc.can_write(None, course.id).await.unwrap());
        assert!(!svc.can_write(Some(&learner), course.id).await.unwrap());

        ctx.enroll(course.id, learner.id, true).await;
        assert!(svc.can_write(Some(&learner), course.id).await.unwrap());

        svc.create(&learner, course.id, 3, None).await.unwrap();
        assert!(!svc.can_write(Some(&learner), course.id).await.unwrap());
        assert!(svc.find_mine(&learner, course.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn losing_an_insert_race_is_a_conflict() {
        let ctx = TestContext::new().await;
        let course = ctx.course("Rust", 1).await;
        ctx.enroll(course.id, ctx.learner.id, true).await;
        let store = RacingStore::new(ctx.store.clone(), Race::DuplicateReview);
        let svc = ReviewService::new(store, ListingConfig::default());
        let learner = TestContext::actor(&ctx.learner);

        let err = svc.create(&learner, course.id, 4, None).await.unwrap_err();
        match err {
            ServiceError::StateConflict(msg) => assert_eq!(msg, Ineligible::AlreadyReviewed.message()),
            other => panic!("expected conflict, got {:?}", other),
        }
        assert_eq!(svc.count_for_course(course.id).await.unwrap(), 1);
    }
}
