//! Store traits the services talk to.
//!
//! Each mutation is atomic at the store: either the whole write lands or
//! nothing changes. Uniqueness of reviews per (course, user) and the
//! course/enrollment foreign key are enforced by the store itself and
//! reported as `DatabaseError::UniqueViolation` / `ForeignKeyViolation`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Course, CourseForm, Enrollment, Level, Memo, NewMemo, NewReview, Review, User};
use crate::filter::{CourseFilter, CourseOrder};
use crate::types::{Page, PageRequest};

#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn find_course(&self, id: Uuid) -> Result<Option<Course>, DatabaseError>;

    /// Distinct courses matching `filter`, in `order`
    async fn find_courses(
        &self,
        filter: &CourseFilter,
        order: CourseOrder,
        limit: Option<i64>,
    ) -> Result<Vec<Course>, DatabaseError>;

    async fn page_courses(
        &self,
        filter: &CourseFilter,
        order: CourseOrder,
        page: PageRequest,
    ) -> Result<Page<Course>, DatabaseError>;

    async fn find_level(&self, id: i32) -> Result<Option<Level>, DatabaseError>;

    async fn insert_course(&self, instructor_id: Uuid, form: &CourseForm) -> Result<Course, DatabaseError>;

    async fn update_course(&self, id: Uuid, form: &CourseForm) -> Result<Course, DatabaseError>;

    async fn delete_course(&self, id: Uuid) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    async fn find_enrollment(&self, course_id: Uuid, user_id: Uuid) -> Result<Option<Enrollment>, DatabaseError>;

    async fn count_enrollments(&self, course_id: Uuid) -> Result<i64, DatabaseError>;
}

#[async_trait]
pub trait MemoStore: Send + Sync {
    async fn find_memo(&self, id: Uuid) -> Result<Option<Memo>, DatabaseError>;

    /// Newest first
    async fn memos_for_course(&self, course_id: Uuid, user_id: Uuid) -> Result<Vec<Memo>, DatabaseError>;

    /// Video timestamp ascending, memos without a timestamp last
    async fn memos_by_timestamp(&self, course_id: Uuid, user_id: Uuid) -> Result<Vec<Memo>, DatabaseError>;

    /// Newest first, across all courses
    async fn memos_for_user(&self, user_id: Uuid) -> Result<Vec<Memo>, DatabaseError>;

    async fn count_memos(&self, course_id: Uuid, user_id: Uuid) -> Result<i64, DatabaseError>;

    async fn insert_memo(&self, memo: NewMemo) -> Result<Memo, DatabaseError>;

    /// Replace the content only
    async fn update_memo_content(&self, id: Uuid, content: &str) -> Result<Memo, DatabaseError>;

    async fn delete_memo(&self, id: Uuid) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn find_review(&self, id: Uuid) -> Result<Option<Review>, DatabaseError>;

    async fn find_user_review(&self, course_id: Uuid, user_id: Uuid) -> Result<Option<Review>, DatabaseError>;

    /// Newest first
    async fn reviews_for_course(&self, course_id: Uuid) -> Result<Vec<Review>, DatabaseError>;

    /// Newest first
    async fn page_reviews(&self, course_id: Uuid, page: PageRequest) -> Result<Page<Review>, DatabaseError>;

    /// Newest first
    async fn reviews_for_user(&self, user_id: Uuid) -> Result<Vec<Review>, DatabaseError>;

    async fn count_reviews(&self, course_id: Uuid) -> Result<i64, DatabaseError>;

    /// Mean rating computed by the store, `None` when there are no reviews
    async fn average_rating(&self, course_id: Uuid) -> Result<Option<f64>, DatabaseError>;

    async fn insert_review(&self, review: NewReview) -> Result<Review, DatabaseError>;

    async fn update_review(&self, id: Uuid, rating: i32, content: Option<&str>) -> Result<Review, DatabaseError>;

    async fn delete_review(&self, id: Uuid) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, DatabaseError>;
}

/// Everything a backend provides to the application
#[async_trait]
pub trait RecordStore: CourseStore + EnrollmentStore + MemoStore + ReviewStore + UserStore {
    async fn ping(&self) -> Result<(), DatabaseError>;

    fn backend_name(&self) -> &'static str;
}
