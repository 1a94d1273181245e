use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{FromRow, Postgres};

use crate::filter::filter_order::FilterOrder;
use crate::filter::types::SqlResult;
use crate::filter::{CourseFilter, CourseOrder, SqlParam};

/// Columns of the course read view. Instructor name comes from the users
/// join, enrollment count from a correlated subquery.
pub const COURSE_COLUMNS: &str = "c.id, c.title, c.content, c.level_id, c.instructor_id, \
     u.user_name AS instructor_name, c.image_url, c.video_url, \
     (SELECT COUNT(*) FROM enrollments e WHERE e.course_id = c.id) AS enrollment_count, \
     c.created_at, c.updated_at";

pub const COURSE_FROM: &str = "FROM courses c JOIN users u ON u.id = c.instructor_id";

/// Builds course listing SQL from a filter and an order
pub struct QueryBuilder<'a> {
    filter: &'a CourseFilter,
    order: CourseOrder,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(filter: &'a CourseFilter, order: CourseOrder) -> Self {
        Self { filter, order }
    }

    /// `SELECT DISTINCT` over the filter, ordered and optionally windowed.
    ///
    /// Ordering happens outside the DISTINCT subquery so that `RANDOM()` and
    /// derived columns are allowed as sort keys.
    pub fn select_sql(&self, limit: Option<i64>, offset: Option<i64>) -> SqlResult {
        let where_result = self.filter.to_where_sql();
        let query = [
            format!(
                "SELECT * FROM (SELECT DISTINCT {} {} WHERE {}) AS t",
                COURSE_COLUMNS, COURSE_FROM, where_result.query
            ),
            FilterOrder::generate(self.order),
            Self::build_limit_clause(limit, offset),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params: where_result.params }
    }

    pub fn count_sql(&self) -> SqlResult {
        let where_result = self.filter.to_where_sql();
        let query = format!(
            "SELECT COUNT(*) AS count FROM (SELECT DISTINCT c.id {} WHERE {}) AS t",
            COURSE_FROM, where_result.query
        );
        SqlResult { query, params: where_result.params }
    }

    fn build_limit_clause(limit: Option<i64>, offset: Option<i64>) -> String {
        match (limit, offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            _ => String::new(),
        }
    }
}

pub fn course_by_id_sql() -> String {
    format!("SELECT {} {} WHERE c.id = $1", COURSE_COLUMNS, COURSE_FROM)
}

pub fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, Postgres, PgArguments>,
    v: &'q SqlParam,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match v {
        SqlParam::Int(i) => q.bind(*i),
        SqlParam::Text(s) => q.bind(s.as_str()),
        SqlParam::Uuid(id) => q.bind(*id),
    }
}

pub fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    v: &'q SqlParam,
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        SqlParam::Int(i) => q.bind(*i),
        SqlParam::Text(s) => q.bind(s.as_str()),
        SqlParam::Uuid(id) => q.bind(*id),
    }
}
