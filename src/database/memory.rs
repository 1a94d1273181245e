//! In-process record store.
//!
//! Used for local development without PostgreSQL and for tests. It enforces
//! the same constraints as the SQL schema: one review per (course, user),
//! enrollments block course deletion, courses need an existing level and
//! instructor. Every mutation runs under a single write lock.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::Role;
use crate::database::manager::DatabaseError;
use crate::database::models::{Course, CourseForm, Enrollment, Level, Memo, NewMemo, NewReview, Review, User};
use crate::database::repository::{CourseStore, EnrollmentStore, MemoStore, RecordStore, ReviewStore, UserStore};
use crate::filter::{CourseFilter, CourseOrder};
use crate::types::{Page, PageRequest};

#[derive(Debug, Clone)]
struct StoredCourse {
    id: Uuid,
    title: String,
    content: String,
    level_id: i32,
    instructor_id: Uuid,
    image_url: Option<String>,
    video_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    levels: BTreeMap<i32, Level>,
    users: HashMap<Uuid, User>,
    courses: Vec<StoredCourse>,
    enrollments: Vec<Enrollment>,
    memos: Vec<Memo>,
    reviews: Vec<Review>,
}

impl Tables {
    fn course_view(&self, stored: &StoredCourse) -> Course {
        let instructor_name = self
            .users
            .get(&stored.instructor_id)
            .map(|u| u.user_name.clone())
            .unwrap_or_default();
        let enrollment_count = self
            .enrollments
            .iter()
            .filter(|e| e.course_id == stored.id)
            .count() as i64;

        Course {
            id: stored.id,
            title: stored.title.clone(),
            content: stored.content.clone(),
            level_id: stored.level_id,
            instructor_id: stored.instructor_id,
            instructor_name,
            image_url: stored.image_url.clone(),
            video_url: stored.video_url.clone(),
            enrollment_count,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }

    fn matching_courses(&self, filter: &CourseFilter, order: CourseOrder) -> Vec<Course> {
        let mut rows: Vec<Course> = self
            .courses
            .iter()
            .map(|c| self.course_view(c))
            .filter(|c| filter.matches(c))
            .collect();

        match order {
            CourseOrder::Newest => rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id))),
            CourseOrder::MostEnrolled => rows.sort_by(|a, b| {
                b.enrollment_count
                    .cmp(&a.enrollment_count)
                    .then(b.created_at.cmp(&a.created_at))
                    .then(a.id.cmp(&b.id))
            }),
            CourseOrder::Random => rows.shuffle(&mut rand::thread_rng()),
        }
        rows
    }

    fn check_course_refs(&self, instructor_id: Uuid, level_id: i32) -> Result<(), DatabaseError> {
        if !self.levels.contains_key(&level_id) {
            return Err(DatabaseError::ForeignKeyViolation("courses_level_id_fkey".to_string()));
        }
        if !self.users.contains_key(&instructor_id) {
            return Err(DatabaseError::ForeignKeyViolation("courses_instructor_id_fkey".to_string()));
        }
        Ok(())
    }

    fn check_course_exists(&self, course_id: Uuid, constraint: &str) -> Result<(), DatabaseError> {
        if self.courses.iter().any(|c| c.id == course_id) {
            Ok(())
        } else {
            Err(DatabaseError::ForeignKeyViolation(constraint.to_string()))
        }
    }
}

/// Newest first; among equal timestamps the later insert comes first
fn newest_first<T: Clone>(rows: impl DoubleEndedIterator<Item = T>, created: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    let mut out: Vec<T> = rows.rev().collect();
    out.sort_by(|a, b| created(b).cmp(&created(a)));
    out
}

/// Users seeded by [`MemoryStore::development`]
pub const DEV_USERS: [(u128, &str, &str, Role, Option<i32>); 3] = [
    (1, "instructor", "Dev Instructor", Role::Instructor, None),
    (2, "learner", "Dev Learner", Role::Learner, Some(1)),
    (3, "admin", "Dev Admin", Role::Admin, None),
];

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with the standard three level tiers
    pub async fn with_default_levels() -> Self {
        let store = Self::new();
        for (id, name) in [(1, "Beginner"), (2, "Intermediate"), (3, "Advanced")] {
            store.add_level(id, name).await;
        }
        store
    }

    /// Default levels plus one user per role. Ids are fixed, so a token
    /// minted by one process resolves in another.
    pub async fn development() -> Self {
        let store = Self::with_default_levels().await;
        for (id, login, user_name, role, level_id) in DEV_USERS {
            store.insert_user(Uuid::from_u128(id), login, user_name, role, level_id).await;
        }
        store
    }

    pub async fn add_level(&self, id: i32, name: &str) -> Level {
        let level = Level { id, name: name.to_string() };
        self.tables.write().await.levels.insert(id, level.clone());
        level
    }

    pub async fn add_user(&self, login: &str, user_name: &str, role: Role, level_id: Option<i32>) -> User {
        self.insert_user(Uuid::new_v4(), login, user_name, role, level_id).await
    }

    async fn insert_user(&self, id: Uuid, login: &str, user_name: &str, role: Role, level_id: Option<i32>) -> User {
        let user = User {
            id,
            login: login.to_string(),
            user_name: user_name.to_string(),
            role: role.as_str().to_string(),
            level_id,
            created_at: Utc::now(),
        };
        self.tables.write().await.users.insert(user.id, user.clone());
        user
    }

    /// Enroll a user; one enrollment per (course, user)
    pub async fn add_enrollment(&self, course_id: Uuid, user_id: Uuid, completed: bool) -> Result<Enrollment, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.check_course_exists(course_id, "enrollments_course_id_fkey")?;
        if !tables.users.contains_key(&user_id) {
            return Err(DatabaseError::ForeignKeyViolation("enrollments_user_id_fkey".to_string()));
        }
        if tables.enrollments.iter().any(|e| e.course_id == course_id && e.user_id == user_id) {
            return Err(DatabaseError::UniqueViolation("enrollments_course_id_user_id_key".to_string()));
        }
        let enrollment = Enrollment {
            id: Uuid::new_v4(),
            course_id,
            user_id,
            completed,
            created_at: Utc::now(),
        };
        tables.enrollments.push(enrollment.clone());
        Ok(enrollment)
    }

    pub async fn set_completed(&self, course_id: Uuid, user_id: Uuid, completed: bool) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let enrollment = tables
            .enrollments
            .iter_mut()
            .find(|e| e.course_id == course_id && e.user_id == user_id)
            .ok_or_else(|| DatabaseError::NotFound("enrollment".to_string()))?;
        enrollment.completed = completed;
        Ok(())
    }
}

#[async_trait]
impl CourseStore for MemoryStore {
    async fn find_course(&self, id: Uuid) -> Result<Option<Course>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.courses.iter().find(|c| c.id == id).map(|c| tables.course_view(c)))
    }

    async fn find_courses(
        &self,
        filter: &CourseFilter,
        order: CourseOrder,
        limit: Option<i64>,
    ) -> Result<Vec<Course>, DatabaseError> {
        let mut rows = self.tables.read().await.matching_courses(filter, order);
        if let Some(limit) = limit {
            rows.truncate(limit.max(0) as usize);
        }
        Ok(rows)
    }

    async fn page_courses(
        &self,
        filter: &CourseFilter,
        order: CourseOrder,
        page: PageRequest,
    ) -> Result<Page<Course>, DatabaseError> {
        let rows = self.tables.read().await.matching_courses(filter, order);
        let total = rows.len() as i64;
        let content = rows
            .into_iter()
            .skip(page.offset().max(0) as usize)
            .take(page.size.max(0) as usize)
            .collect();
        Ok(Page::new(content, page, total))
    }

    async fn find_level(&self, id: i32) -> Result<Option<Level>, DatabaseError> {
        Ok(self.tables.read().await.levels.get(&id).cloned())
    }

    async fn insert_course(&self, instructor_id: Uuid, form: &CourseForm) -> Result<Course, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.check_course_refs(instructor_id, form.level_id)?;
        let now = Utc::now();
        let stored = StoredCourse {
            id: Uuid::new_v4(),
            title: form.title.clone(),
            content: form.content.clone(),
            level_id: form.level_id,
            instructor_id,
            image_url: form.image_url.clone(),
            video_url: form.video_url.clone(),
            created_at: now,
            updated_at: now,
        };
        let view = tables.course_view(&stored);
        tables.courses.push(stored);
        Ok(view)
    }

    async fn update_course(&self, id: Uuid, form: &CourseForm) -> Result<Course, DatabaseError> {
        let mut tables = self.tables.write().await;
        let instructor_id = tables
            .courses
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.instructor_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("course {}", id)))?;
        tables.check_course_refs(instructor_id, form.level_id)?;

        let stored = tables
            .courses
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| DatabaseError::NotFound(format!("course {}", id)))?;
        stored.title = form.title.clone();
        stored.content = form.content.clone();
        stored.level_id = form.level_id;
        stored.image_url = form.image_url.clone();
        stored.video_url = form.video_url.clone();
        stored.updated_at = Utc::now();
        let stored = stored.clone();
        Ok(tables.course_view(&stored))
    }

    async fn delete_course(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.courses.iter().any(|c| c.id == id) {
            return Err(DatabaseError::NotFound(format!("course {}", id)));
        }
        // enrollments restrict, memos and reviews cascade
        if tables.enrollments.iter().any(|e| e.course_id == id) {
            return Err(DatabaseError::ForeignKeyViolation("enrollments_course_id_fkey".to_string()));
        }
        tables.courses.retain(|c| c.id != id);
        tables.memos.retain(|m| m.course_id != id);
        tables.reviews.retain(|r| r.course_id != id);
        Ok(())
    }
}

#[async_trait]
impl EnrollmentStore for MemoryStore {
    async fn find_enrollment(&self, course_id: Uuid, user_id: Uuid) -> Result<Option<Enrollment>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .enrollments
            .iter()
            .find(|e| e.course_id == course_id && e.user_id == user_id)
            .cloned())
    }

    async fn count_enrollments(&self, course_id: Uuid) -> Result<i64, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.enrollments.iter().filter(|e| e.course_id == course_id).count() as i64)
    }
}

#[async_trait]
impl MemoStore for MemoryStore {
    async fn find_memo(&self, id: Uuid) -> Result<Option<Memo>, DatabaseError> {
        Ok(self.tables.read().await.memos.iter().find(|m| m.id == id).cloned())
    }

    async fn memos_for_course(&self, course_id: Uuid, user_id: Uuid) -> Result<Vec<Memo>, DatabaseError> {
        let tables = self.tables.read().await;
        let rows = tables
            .memos
            .iter()
            .filter(|m| m.course_id == course_id && m.user_id == user_id)
            .cloned()
            .collect::<Vec<_>>();
        Ok(newest_first(rows.into_iter(), |m| m.created_at))
    }

    async fn memos_by_timestamp(&self, course_id: Uuid, user_id: Uuid) -> Result<Vec<Memo>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Memo> = tables
            .memos
            .iter()
            .filter(|m| m.course_id == course_id && m.user_id == user_id)
            .cloned()
            .collect();
        // NULLS LAST, then oldest first
        rows.sort_by(|a, b| match (a.video_timestamp, b.video_timestamp) {
            (Some(x), Some(y)) => x.cmp(&y).then(a.created_at.cmp(&b.created_at)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.created_at.cmp(&b.created_at),
        });
        Ok(rows)
    }

    async fn memos_for_user(&self, user_id: Uuid) -> Result<Vec<Memo>, DatabaseError> {
        let tables = self.tables.read().await;
        let rows = tables
            .memos
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect::<Vec<_>>();
        Ok(newest_first(rows.into_iter(), |m| m.created_at))
    }

    async fn count_memos(&self, course_id: Uuid, user_id: Uuid) -> Result<i64, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .memos
            .iter()
            .filter(|m| m.course_id == course_id && m.user_id == user_id)
            .count() as i64)
    }

    async fn insert_memo(&self, memo: NewMemo) -> Result<Memo, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.check_course_exists(memo.course_id, "memos_course_id_fkey")?;
        let now = Utc::now();
        let memo = Memo {
            id: Uuid::new_v4(),
            course_id: memo.course_id,
            user_id: memo.user_id,
            content: memo.content,
            video_timestamp: memo.video_timestamp,
            created_at: now,
            updated_at: now,
        };
        tables.memos.push(memo.clone());
        Ok(memo)
    }

    async fn update_memo_content(&self, id: Uuid, content: &str) -> Result<Memo, DatabaseError> {
        let mut tables = self.tables.write().await;
        let memo = tables
            .memos
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| DatabaseError::NotFound(format!("memo {}", id)))?;
        memo.content = content.to_string();
        memo.updated_at = Utc::now();
        Ok(memo.clone())
    }

    async fn delete_memo(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.memos.len();
        tables.memos.retain(|m| m.id != id);
        if tables.memos.len() == before {
            return Err(DatabaseError::NotFound(format!("memo {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn find_review(&self, id: Uuid) -> Result<Option<Review>, DatabaseError> {
        Ok(self.tables.read().await.reviews.iter().find(|r| r.id == id).cloned())
    }

    async fn find_user_review(&self, course_id: Uuid, user_id: Uuid) -> Result<Option<Review>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .reviews
            .iter()
            .find(|r| r.course_id == course_id && r.user_id == user_id)
            .cloned())
    }

    async fn reviews_for_course(&self, course_id: Uuid) -> Result<Vec<Review>, DatabaseError> {
        let tables = self.tables.read().await;
        let rows = tables
            .reviews
            .iter()
            .filter(|r| r.course_id == course_id)
            .cloned()
            .collect::<Vec<_>>();
        Ok(newest_first(rows.into_iter(), |r| r.created_at))
    }

    async fn page_reviews(&self, course_id: Uuid, page: PageRequest) -> Result<Page<Review>, DatabaseError> {
        let rows = self.reviews_for_course(course_id).await?;
        let total = rows.len() as i64;
        let content = rows
            .into_iter()
            .skip(page.offset().max(0) as usize)
            .take(page.size.max(0) as usize)
            .collect();
        Ok(Page::new(content, page, total))
    }

    async fn reviews_for_user(&self, user_id: Uuid) -> Result<Vec<Review>, DatabaseError> {
        let tables = self.tables.read().await;
        let rows = tables
            .reviews
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect::<Vec<_>>();
        Ok(newest_first(rows.into_iter(), |r| r.created_at))
    }

    async fn count_reviews(&self, course_id: Uuid) -> Result<i64, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.reviews.iter().filter(|r| r.course_id == course_id).count() as i64)
    }

    async fn average_rating(&self, course_id: Uuid) -> Result<Option<f64>, DatabaseError> {
        let tables = self.tables.read().await;
        let ratings: Vec<i32> = tables
            .reviews
            .iter()
            .filter(|r| r.course_id == course_id)
            .map(|r| r.rating)
            .collect();
        if ratings.is_empty() {
            return Ok(None);
        }
        let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
        Ok(Some(sum as f64 / ratings.len() as f64))
    }

    async fn insert_review(&self, review: NewReview) -> Result<Review, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.check_course_exists(review.course_id, "reviews_course_id_fkey")?;
        if tables
            .reviews
            .iter()
            .any(|r| r.course_id == review.course_id && r.user_id == review.user_id)
        {
            return Err(DatabaseError::UniqueViolation("reviews_course_id_user_id_key".to_string()));
        }
        let now = Utc::now();
        let review = Review {
            id: Uuid::new_v4(),
            course_id: review.course_id,
            user_id: review.user_id,
            rating: review.rating,
            content: review.content,
            created_at: now,
            updated_at: now,
        };
        tables.reviews.push(review.clone());
        Ok(review)
    }

    async fn update_review(&self, id: Uuid, rating: i32, content: Option<&str>) -> Result<Review, DatabaseError> {
        let mut tables = self.tables.write().await;
        let review = tables
            .reviews
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| DatabaseError::NotFound(format!("review {}", id)))?;
        review.rating = rating;
        review.content = content.map(str::to_string);
        review.updated_at = Utc::now();
        Ok(review.clone())
    }

    async fn delete_review(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.reviews.len();
        tables.reviews.retain(|r| r.id != id);
        if tables.reviews.len() == before {
            return Err(DatabaseError::NotFound(format!("review {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.read().await.users.values().find(|u| u.login == login).cloned())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
