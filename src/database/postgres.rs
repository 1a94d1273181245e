use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Course, CourseForm, Enrollment, Level, Memo, NewMemo, NewReview, Review, User};
use crate::database::query_builder::{bind_param_query, bind_param_query_as, course_by_id_sql, QueryBuilder};
use crate::database::repository::{CourseStore, EnrollmentStore, MemoStore, RecordStore, ReviewStore, UserStore};
use crate::filter::{CourseFilter, CourseOrder};
use crate::types::{Page, PageRequest};

const MEMO_COLUMNS: &str = "id, course_id, user_id, content, video_timestamp, created_at, updated_at";
const REVIEW_COLUMNS: &str = "id, course_id, user_id, rating, content, created_at, updated_at";

/// Record store backed by PostgreSQL
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn count_courses(&self, filter: &CourseFilter) -> Result<i64, DatabaseError> {
        let sql_result = QueryBuilder::new(filter, CourseOrder::Newest).count_sql();
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(&self.pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    async fn require_course(&self, id: Uuid) -> Result<Course, DatabaseError> {
        self.find_course(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("course {}", id)))
    }
}

#[async_trait]
impl CourseStore for PgStore {
    async fn find_course(&self, id: Uuid) -> Result<Option<Course>, DatabaseError> {
        let course = sqlx::query_as::<_, Course>(&course_by_id_sql())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(course)
    }

    async fn find_courses(
        &self,
        filter: &CourseFilter,
        order: CourseOrder,
        limit: Option<i64>,
    ) -> Result<Vec<Course>, DatabaseError> {
        let sql_result = QueryBuilder::new(filter, order).select_sql(limit, None);
        let mut q = sqlx::query_as::<_, Course>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        Ok(q.fetch_all(&self.pool).await?)
    }

    async fn page_courses(
        &self,
        filter: &CourseFilter,
        order: CourseOrder,
        page: PageRequest,
    ) -> Result<Page<Course>, DatabaseError> {
        let total = self.count_courses(filter).await?;
        let sql_result = QueryBuilder::new(filter, order).select_sql(Some(page.size), Some(page.offset()));
        let mut q = sqlx::query_as::<_, Course>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(&self.pool).await?;
        Ok(Page::new(rows, page, total))
    }

    async fn find_level(&self, id: i32) -> Result<Option<Level>, DatabaseError> {
        let level = sqlx::query_as::<_, Level>("SELECT id, name FROM levels WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(level)
    }

    async fn insert_course(&self, instructor_id: Uuid, form: &CourseForm) -> Result<Course, DatabaseError> {
        let row = sqlx::query(
            "INSERT INTO courses (id, title, content, level_id, instructor_id, image_url, video_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(&form.title)
        .bind(&form.content)
        .bind(form.level_id)
        .bind(instructor_id)
        .bind(&form.image_url)
        .bind(&form.video_url)
        .fetch_one(&self.pool)
        .await?;
        let id: Uuid = row.try_get("id")?;
        self.require_course(id).await
    }

    async fn update_course(&self, id: Uuid, form: &CourseForm) -> Result<Course, DatabaseError> {
        let result = sqlx::query(
            "UPDATE courses
             SET title = $2, content = $3, level_id = $4, image_url = $5, video_url = $6, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(&form.title)
        .bind(&form.content)
        .bind(form.level_id)
        .bind(&form.image_url)
        .bind(&form.video_url)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("course {}", id)));
        }
        self.require_course(id).await
    }

    async fn delete_course(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("course {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl EnrollmentStore for PgStore {
    async fn find_enrollment(&self, course_id: Uuid, user_id: Uuid) -> Result<Option<Enrollment>, DatabaseError> {
        let enrollment = sqlx::query_as::<_, Enrollment>(
            "SELECT id, course_id, user_id, completed, created_at
             FROM enrollments
             WHERE course_id = $1 AND user_id = $2",
        )
        .bind(course_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(enrollment)
    }

    async fn count_enrollments(&self, course_id: Uuid) -> Result<i64, DatabaseError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM enrollments WHERE course_id = $1")
            .bind(course_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }
}

#[async_trait]
impl MemoStore for PgStore {
    async fn find_memo(&self, id: Uuid) -> Result<Option<Memo>, DatabaseError> {
        let memo = sqlx::query_as::<_, Memo>(&format!("SELECT {} FROM memos WHERE id = $1", MEMO_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(memo)
    }

    async fn memos_for_course(&self, course_id: Uuid, user_id: Uuid) -> Result<Vec<Memo>, DatabaseError> {
        let memos = sqlx::query_as::<_, Memo>(&format!(
            "SELECT {} FROM memos WHERE course_id = $1 AND user_id = $2 ORDER BY created_at DESC, id",
            MEMO_COLUMNS
        ))
        .bind(course_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(memos)
    }

    async fn memos_by_timestamp(&self, course_id: Uuid, user_id: Uuid) -> Result<Vec<Memo>, DatabaseError> {
        let memos = sqlx::query_as::<_, Memo>(&format!(
            "SELECT {} FROM memos WHERE course_id = $1 AND user_id = $2
             ORDER BY video_timestamp ASC NULLS LAST, created_at ASC, id",
            MEMO_COLUMNS
        ))
        .bind(course_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(memos)
    }

    async fn memos_for_user(&self, user_id: Uuid) -> Result<Vec<Memo>, DatabaseError> {
        let memos = sqlx::query_as::<_, Memo>(&format!(
            "SELECT {} FROM memos WHERE user_id = $1 ORDER BY created_at DESC, id",
            MEMO_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(memos)
    }

    async fn count_memos(&self, course_id: Uuid, user_id: Uuid) -> Result<i64, DatabaseError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM memos WHERE course_id = $1 AND user_id = $2")
            .bind(course_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    async fn insert_memo(&self, memo: NewMemo) -> Result<Memo, DatabaseError> {
        let memo = sqlx::query_as::<_, Memo>(&format!(
            "INSERT INTO memos (id, course_id, user_id, content, video_timestamp)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            MEMO_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(memo.course_id)
        .bind(memo.user_id)
        .bind(&memo.content)
        .bind(memo.video_timestamp)
        .fetch_one(&self.pool)
        .await?;
        Ok(memo)
    }

    async fn update_memo_content(&self, id: Uuid, content: &str) -> Result<Memo, DatabaseError> {
        sqlx::query_as::<_, Memo>(&format!(
            "UPDATE memos SET content = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            MEMO_COLUMNS
        ))
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("memo {}", id)))
    }

    async fn delete_memo(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM memos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("memo {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl ReviewStore for PgStore {
    async fn find_review(&self, id: Uuid) -> Result<Option<Review>, DatabaseError> {
        let review = sqlx::query_as::<_, Review>(&format!("SELECT {} FROM reviews WHERE id = $1", REVIEW_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(review)
    }

    async fn find_user_review(&self, course_id: Uuid, user_id: Uuid) -> Result<Option<Review>, DatabaseError> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE course_id = $1 AND user_id = $2",
            REVIEW_COLUMNS
        ))
        .bind(course_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(review)
    }

    async fn reviews_for_course(&self, course_id: Uuid) -> Result<Vec<Review>, DatabaseError> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE course_id = $1 ORDER BY created_at DESC, id",
            REVIEW_COLUMNS
        ))
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    async fn page_reviews(&self, course_id: Uuid, page: PageRequest) -> Result<Page<Review>, DatabaseError> {
        let total = self.count_reviews(course_id).await?;
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE course_id = $1 ORDER BY created_at DESC, id LIMIT $2 OFFSET $3",
            REVIEW_COLUMNS
        ))
        .bind(course_id)
        .bind(page.size)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(Page::new(reviews, page, total))
    }

    async fn reviews_for_user(&self, user_id: Uuid) -> Result<Vec<Review>, DatabaseError> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE user_id = $1 ORDER BY created_at DESC, id",
            REVIEW_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    async fn count_reviews(&self, course_id: Uuid) -> Result<i64, DatabaseError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews WHERE course_id = $1")
            .bind(course_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    async fn average_rating(&self, course_id: Uuid) -> Result<Option<f64>, DatabaseError> {
        let avg: (Option<f64>,) = sqlx::query_as("SELECT AVG(rating)::float8 FROM reviews WHERE course_id = $1")
            .bind(course_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(avg.0)
    }

    async fn insert_review(&self, review: NewReview) -> Result<Review, DatabaseError> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "INSERT INTO reviews (id, course_id, user_id, rating, content)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            REVIEW_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(review.course_id)
        .bind(review.user_id)
        .bind(review.rating)
        .bind(&review.content)
        .fetch_one(&self.pool)
        .await?;
        Ok(review)
    }

    async fn update_review(&self, id: Uuid, rating: i32, content: Option<&str>) -> Result<Review, DatabaseError> {
        sqlx::query_as::<_, Review>(&format!(
            "UPDATE reviews SET rating = $2, content = $3, updated_at = NOW() WHERE id = $1 RETURNING {}",
            REVIEW_COLUMNS
        ))
        .bind(id)
        .bind(rating)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("review {}", id)))
    }

    async fn delete_review(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("review {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, login, user_name, role, level_id, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, login, user_name, role, level_id, created_at FROM users WHERE login = $1",
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
