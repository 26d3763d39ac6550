use chrono::NaiveDate;
use sqlx::MySql;
use sqlx::mysql::MySqlArguments;
use sqlx::query::QueryAs;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    I64(i64),
    Date(NaiveDate),
}

/// ===============================
/// Dynamic WHERE clause
/// ===============================
///
/// Predicates are ANDed in the order they are pushed. Values only ever
/// travel as bind parameters.
#[derive(Debug, Default)]
pub struct WhereClause {
    predicates: Vec<String>,
    values: Vec<SqlValue>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// `column = ?`
    pub fn eq(&mut self, column: &str, value: SqlValue) -> &mut Self {
        self.predicates.push(format!("{} = ?", column));
        self.values.push(value);
        self
    }

    /// `column IN (?, ?, ...)`; an empty set adds nothing.
    pub fn is_in(&mut self, column: &str, values: impl IntoIterator<Item = SqlValue>) -> &mut Self {
        let before = self.values.len();
        self.values.extend(values);

        let added = self.values.len() - before;
        if added > 0 {
            let placeholders = vec!["?"; added].join(", ");
            self.predicates
                .push(format!("{} IN ({})", column, placeholders));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Renders ` WHERE a AND b`, or an empty string when nothing was pushed.
    pub fn sql(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.predicates.join(" AND "))
        }
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Binds every collected value onto `query`, in order.
    pub fn bind_all<'q, O>(
        &self,
        mut query: QueryAs<'q, MySql, O, MySqlArguments>,
    ) -> QueryAs<'q, MySql, O, MySqlArguments> {
        for value in &self.values {
            query = match value {
                SqlValue::I64(v) => query.bind(*v),
                SqlValue::Date(v) => query.bind(*v),
            };
        }
        query
    }
}

/// Parses a comma separated id list such as `"3,4"`.
///
/// Any segment that is not an integer rejects the whole list.
pub fn parse_id_list(raw: &str) -> Result<Vec<i64>, std::num::ParseIntError> {
    raw.split(',').map(|id| id.trim().parse::<i64>()).collect()
}
