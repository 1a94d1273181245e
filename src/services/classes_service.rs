use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::auth::guard::{self, Owned};
use crate::auth::Actor;
use crate::config::ListingConfig;
use crate::database::manager::DatabaseError;
use crate::database::models::{Course, CourseForm};
use crate::database::{CourseStore, EnrollmentStore, RecordStore};
use crate::filter::{self, CourseCondition, CourseFilter, CourseOrder, CourseSearch};
use crate::services::error::{ServiceError, ServiceResult};
use crate::types::{Operation, Page};

/// Course listing, search and authoring
#[derive(Clone)]
pub struct ClassesService {
    store: Arc<dyn RecordStore>,
    listing: ListingConfig,
}

impl ClassesService {
    pub fn new(store: Arc<dyn RecordStore>, listing: ListingConfig) -> Self {
        Self { store, listing }
    }

    pub async fn create(&self, actor: &Actor, form: CourseForm) -> ServiceResult<Course> {
        if !actor.role.can_author_courses() {
            return Err(ServiceError::forbidden("Only instructors can create courses"));
        }
        let form = self.validate(form).await?;

        let course = self.store.insert_course(actor.id, &form).await?;
        info!(course = %course.id, instructor = %actor.id, "created course");
        Ok(course)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Course> {
        guard::resolve(self.store.find_course(id).await?)
    }

    /// Filtered listing, newest first
    pub async fn list(&self, actor: Option<&Actor>, search: &CourseSearch, page: Option<i64>) -> ServiceResult<Page<Course>> {
        let request = filter::page_request(page, self.listing.page_size)?;
        let filter = CourseFilter::build(actor, search);
        Ok(self.store.page_courses(&filter, CourseOrder::Newest, request).await?)
    }

    /// Every course the actor may see, with no search applied
    pub async fn visible_to(&self, actor: Option<&Actor>) -> ServiceResult<Vec<Course>> {
        let filter = CourseFilter::build(actor, &CourseSearch::default());
        Ok(self.store.find_courses(&filter, CourseOrder::Newest, None).await?)
    }

    pub async fn by_instructor(&self, instructor_id: Uuid) -> ServiceResult<Vec<Course>> {
        let filter = CourseFilter::new().with(CourseCondition::InstructorIs(instructor_id));
        Ok(self.store.find_courses(&filter, CourseOrder::Newest, None).await?)
    }

    /// An instructor's courses, most enrolled first
    pub async fn instructor_page(
        &self,
        instructor_id: Uuid,
        page: Option<i64>,
        level_id: Option<i32>,
        kw: Option<&str>,
    ) -> ServiceResult<Page<Course>> {
        let request = filter::page_request(page, self.listing.instructor_page_size)?;

        let mut filter = CourseFilter::new().with(CourseCondition::InstructorIs(instructor_id));
        if let Some(level) = level_id.filter(|l| *l > 0) {
            filter.push(CourseCondition::LevelEq(level));
        }
        if let Some(kw) = kw.map(str::trim).filter(|k| !k.is_empty()) {
            filter.push(CourseCondition::TitleContains(kw.to_lowercase()));
        }

        Ok(self.store.page_courses(&filter, CourseOrder::MostEnrolled, request).await?)
    }

    /// Random sample, restricted to the actor's level when they have one
    pub async fn random(&self, actor: Option<&Actor>, limit: Option<i64>) -> ServiceResult<Vec<Course>> {
        let limit = filter::sample_limit(limit, self.listing.random_limit, self.listing.max_random_limit)?;

        let mut filter = CourseFilter::new();
        if let Some(level) = actor.and_then(|a| a.level_id) {
            filter.push(CourseCondition::LevelEq(level));
        }
        Ok(self.store.find_courses(&filter, CourseOrder::Random, Some(limit)).await?)
    }

    pub async fn update(&self, actor: &Actor, id: Uuid, form: CourseForm) -> ServiceResult<Course> {
        let found = self.store.find_course(id).await?;
        guard::authorize(actor, found, Operation::Edit)?;
        let form = self.validate(form).await?;

        let course = self.store.update_course(id, &form).await?;
        info!(course = %id, actor = %actor.id, "updated course");
        Ok(course)
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid) -> ServiceResult<()> {
        let found = self.store.find_course(id).await?;
        guard::authorize(actor, found, Operation::Delete)?;

        let enrolled = self.store.count_enrollments(id).await?;
        if enrolled > 0 {
            return Err(Self::enrolled_conflict());
        }

        match self.store.delete_course(id).await {
            Ok(()) => {
                info!(course = %id, actor = %actor.id, "deleted course");
                Ok(())
            }
            // an enrollment landed between the count and the delete
            Err(DatabaseError::ForeignKeyViolation(_)) => Err(Self::enrolled_conflict()),
            Err(e) => Err(e.into()),
        }
    }

    fn enrolled_conflict() -> ServiceError {
        ServiceError::conflict(format!("Cannot delete a {} that has enrollments", Course::KIND))
    }

    async fn validate(&self, mut form: CourseForm) -> ServiceResult<CourseForm> {
        form.title = form.title.trim().to_string();
        if form.title.is_empty() {
            return Err(ServiceError::validation("title", "Title is required"));
        }
        if form.level_id <= 0 {
            return Err(ServiceError::validation("level_id", "Level is required"));
        }
        if self.store.find_level(form.level_id).await?.is_none() {
            return Err(ServiceError::not_found(format!("level {} not found", form.level_id)));
        }
        Ok(form)
    }
}
