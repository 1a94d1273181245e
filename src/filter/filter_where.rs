use super::types::{CourseCondition, SqlParam};

/// Renders course conditions into a parameterized `WHERE` body.
///
/// Column references assume the listing query aliases courses as `c` and
/// the instructor join as `u`.
pub struct FilterWhere {
    param_values: Vec<SqlParam>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn generate(conditions: &[CourseCondition], starting_param_index: usize) -> (String, Vec<SqlParam>) {
        let mut filter_where = Self::new(starting_param_index);
        filter_where.build(conditions)
    }

    fn build(&mut self, conditions: &[CourseCondition]) -> (String, Vec<SqlParam>) {
        let sql_conditions: Vec<String> = conditions.iter().map(|c| self.build_sql_condition(c)).collect();
        let where_clause = if sql_conditions.is_empty() {
            "1=1".to_string()
        } else {
            sql_conditions.join(" AND ")
        };
        (where_clause, std::mem::take(&mut self.param_values))
    }

    fn build_sql_condition(&mut self, condition: &CourseCondition) -> String {
        match condition {
            CourseCondition::LevelAtMost(max) => {
                format!("c.level_id <= {}", self.param(SqlParam::Int(i64::from(*max))))
            }
            CourseCondition::LevelEq(level) => {
                format!("c.level_id = {}", self.param(SqlParam::Int(i64::from(*level))))
            }
            CourseCondition::TitleContains(needle) => {
                format!("LOWER(c.title) LIKE {} ESCAPE '\\'", self.param(SqlParam::Text(like_pattern(needle))))
            }
            CourseCondition::InstructorNameContains(needle) => {
                format!("LOWER(u.user_name) LIKE {} ESCAPE '\\'", self.param(SqlParam::Text(like_pattern(needle))))
            }
            CourseCondition::InstructorIs(id) => {
                format!("c.instructor_id = {}", self.param(SqlParam::Uuid(*id)))
            }
        }
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

/// `%needle%` with LIKE metacharacters in the needle escaped
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
