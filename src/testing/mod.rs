use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::{Actor, Role};
use crate::config::ListingConfig;
use crate::database::models::{Course, CourseForm, Enrollment, Level, Memo, NewMemo, NewReview, Review, User};
use crate::database::{
    CourseStore, DatabaseError, EnrollmentStore, MemoStore, MemoryStore, RecordStore, ReviewStore, UserStore,
};
use crate::filter::{CourseFilter, CourseOrder};
use crate::services::{ClassesService, MemoService, ReviewService};
use crate::types::{Page, PageRequest};

/// Test utilities: a memory store with levels and a few users seeded
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub instructor: User,
    pub learner: User,
    pub admin: User,
}

impl TestContext {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::with_default_levels().await);
        let instructor = store.add_user("kim", "Kim Instructor", Role::Instructor, None).await;
        let learner = store.add_user("lee", "Lee Learner", Role::Learner, Some(1)).await;
        let admin = store.add_user("root", "Admin", Role::Admin, None).await;

        Self {
            store,
            instructor,
            learner,
            admin,
        }
    }

    pub fn actor(user: &User) -> Actor {
        user.to_actor().expect("seeded users have known roles")
    }

    pub async fn user(&self, login: &str, role: Role, level_id: Option<i32>) -> User {
        self.store.add_user(login, login, role, level_id).await
    }

    /// A course owned by the seeded instructor
    pub async fn course(&self, title: &str, level_id: i32) -> Course {
        self.course_by(self.instructor.id, title, level_id).await
    }

    pub async fn course_by(&self, instructor_id: Uuid, title: &str, level_id: i32) -> Course {
        let form = CourseForm {
            title: title.to_string(),
            content: format!("{} content", title),
            level_id,
            ..Default::default()
        };
        self.store
            .insert_course(instructor_id, &form)
            .await
            .expect("failed to seed course")
    }

    pub async fn enroll(&self, course_id: Uuid, user_id: Uuid, completed: bool) {
        self.store
            .add_enrollment(course_id, user_id, completed)
            .await
            .expect("failed to seed enrollment");
    }

    pub fn classes(&self) -> ClassesService {
        ClassesService::new(self.store.clone(), ListingConfig::default())
    }

    pub fn memos(&self) -> MemoService {
        MemoService::new(self.store.clone())
    }

    pub fn reviews(&self) -> ReviewService {
        ReviewService::new(self.store.clone(), ListingConfig::default())
    }
}

/// A concurrent write that lands between a service's checks and its own write
#[derive(Debug, Clone, Copy)]
pub enum Race {
    /// The same user's review is inserted first
    DuplicateReview,
    /// This user enrolls just before the course is deleted
    EnrollBeforeDelete(Uuid),
}

/// Memory store that loses one race on the matching write
pub struct RacingStore {
    pub inner: Arc<MemoryStore>,
    race: Race,
}

impl RacingStore {
    pub fn new(inner: Arc<MemoryStore>, race: Race) -> Arc<Self> {
        Arc::new(Self { inner, race })
    }
}

#[async_trait]
impl CourseStore for RacingStore {
    async fn find_course(&self, id: Uuid) -> Result<Option<Course>, DatabaseError> {
        self.inner.find_course(id).await
    }

    async fn find_courses(
        &self,
        filter: &CourseFilter,
        order: CourseOrder,
        limit: Option<i64>,
    ) -> Result<Vec<Course>, DatabaseError> {
        self.inner.find_courses(filter, order, limit).await
    }

    async fn page_courses(
        &self,
        filter: &CourseFilter,
        order: CourseOrder,
        page: PageRequest,
    ) -> Result<Page<Course>, DatabaseError> {
        self.inner.page_courses(filter, order, page).await
    }

    async fn find_level(&self, id: i32) -> Result<Option<Level>, DatabaseError> {
        self.inner.find_level(id).await
    }

    async fn insert_course(&self, instructor_id: Uuid, form: &CourseForm) -> Result<Course, DatabaseError> {
        self.inner.insert_course(instructor_id, form).await
    }

    async fn update_course(&self, id: Uuid, form: &CourseForm) -> Result<Course, DatabaseError> {
        self.inner.update_course(id, form).await
    }

    async fn delete_course(&self, id: Uuid) -> Result<(), DatabaseError> {
        if let Race::EnrollBeforeDelete(user_id) = self.race {
            self.inner.add_enrollment(id, user_id, false).await?;
        }
        self.inner.delete_course(id).await
    }
}

#[async_trait]
impl EnrollmentStore for RacingStore {
    async fn find_enrollment(&self, course_id: Uuid, user_id: Uuid) -> Result<Option<Enrollment>, DatabaseError> {
        self.inner.find_enrollment(course_id, user_id).await
    }

    async fn count_enrollments(&self, course_id: Uuid) -> Result<i64, DatabaseError> {
        self.inner.count_enrollments(course_id).await
    }
}

#[async_trait]
impl MemoStore for RacingStore {
    async fn find_memo(&self, id: Uuid) -> Result<Option<Memo>, DatabaseError> {
        self.inner.find_memo(id).await
    }

    async fn memos_for_course(&self, course_id: Uuid, user_id: Uuid) -> Result<Vec<Memo>, DatabaseError> {
        self.inner.memos_for_course(course_id, user_id).await
    }

    async fn memos_by_timestamp(&self, course_id: Uuid, user_id: Uuid) -> Result<Vec<Memo>, DatabaseError> {
        self.inner.memos_by_timestamp(course_id, user_id).await
    }

    async fn memos_for_user(&self, user_id: Uuid) -> Result<Vec<Memo>, DatabaseError> {
        self.inner.memos_for_user(user_id).await
    }

    async fn count_memos(&self, course_id: Uuid, user_id: Uuid) -> Result<i64, DatabaseError> {
        self.inner.count_memos(course_id, user_id).await
    }

    async fn insert_memo(&self, memo: NewMemo) -> Result<Memo, DatabaseError> {
        self.inner.insert_memo(memo).await
    }

    async fn update_memo_content(&self, id: Uuid, content: &str) -> Result<Memo, DatabaseError> {
        self.inner.update_memo_content(id, content).await
    }

    async fn delete_memo(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.inner.delete_memo(id).await
    }
}

#[async_trait]
impl ReviewStore for RacingStore {
    async fn find_review(&self, id: Uuid) -> Result<Option<Review>, DatabaseError> {
        self.inner.find_review(id).await
    }

    async fn find_user_review(&self, course_id: Uuid, user_id: Uuid) -> Result<Option<Review>, DatabaseError> {
        self.inner.find_user_review(course_id, user_id).await
    }

    async fn reviews_for_course(&self, course_id: Uuid) -> Result<Vec<Review>, DatabaseError> {
        self.inner.reviews_for_course(course_id).await
    }

    async fn page_reviews(&self, course_id: Uuid, page: PageRequest) -> Result<Page<Review>, DatabaseError> {
        self.inner.page_reviews(course_id, page).await
    }

    async fn reviews_for_user(&self, user_id: Uuid) -> Result<Vec<Review>, DatabaseError> {
        self.inner.reviews_for_user(user_id).await
    }

    async fn count_reviews(&self, course_id: Uuid) -> Result<i64, DatabaseError> {
        self.inner.count_reviews(course_id).await
    }

    async fn average_rating(&self, course_id: Uuid) -> Result<Option<f64>, DatabaseError> {
        self.inner.average_rating(course_id).await
    }

    async fn insert_review(&self, review: NewReview) -> Result<Review, DatabaseError> {
        if let Race::DuplicateReview = self.race {
            self.inner.insert_review(review.clone()).await?;
        }
        self.inner.insert_review(review).await
    }

    async fn update_review(&self, id: Uuid, rating: i32, content: Option<&str>) -> Result<Review, DatabaseError> {
        self.inner.update_review(id, rating, content).await
    }

    async fn delete_review(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.inner.delete_review(id).await
    }
}

#[async_trait]
impl UserStore for RacingStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        self.inner.find_user(id).await
    }

    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, DatabaseError> {
        self.inner.find_user_by_login(login).await
    }
}

#[async_trait]
impl RecordStore for RacingStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        self.inner.ping().await
    }

    fn backend_name(&self) -> &'static str {
        "racing"
    }
}
