//! SQL fragment builders shared by the repositories.
//!
//! Every builder returns placeholder SQL plus the values to bind, in
//! placeholder order. Nothing user-supplied is ever spliced into the text.

use rust_decimal::Decimal;
use sqlx::{postgres::PgArguments, query::QueryAs, Postgres};

use crate::companies::dto::CompanyFilter;
use crate::error::AppError;
use crate::jobs::dto::JobFilter;

/// A value bound to a `$N` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Int(i32),
    Decimal(Decimal),
    Bool(bool),
}

/// Output of [`sql_for_partial_update`].
#[derive(Debug, Clone, PartialEq)]
pub struct PartialUpdate {
    /// `"column"=$N` fragments in input order.
    pub columns: Vec<String>,
    pub values: Vec<SqlValue>,
}

impl PartialUpdate {
    /// Fragments joined for a `SET` clause.
    pub fn set_cols(&self) -> String {
        self.columns.join(", ")
    }

    /// Placeholder index for the first parameter after the SET values,
    /// typically the row key in `WHERE`.
    pub fn next_placeholder(&self) -> usize {
        self.values.len() + 1
    }
}

/// Builds the SET part of an UPDATE from the supplied fields.
///
/// `js_to_sql` maps request field names to column names; fields it does not
/// mention are used as the column name unchanged.
///
/// `{firstName: "Aliya", age: 32}` with `[("firstName", "first_name")]`
/// gives `["\"first_name\"=$1", "\"age\"=$2"]` and `["Aliya", 32]`.
pub fn sql_for_partial_update(
    data: Vec<(&str, SqlValue)>,
    js_to_sql: &[(&str, &str)],
) -> Result<PartialUpdate, AppError> {
    if data.is_empty() {
        return Err(AppError::bad_request("No data"));
    }

    let mut columns = Vec::with_capacity(data.len());
    let mut values = Vec::with_capacity(data.len());
    for (idx, (field, value)) in data.into_iter().enumerate() {
        let column = js_to_sql
            .iter()
            .find(|(js, _)| *js == field)
            .map(|(_, col)| *col)
            .unwrap_or(field);
        columns.push(format!("\"{}\"={}", column, placeholder(idx + 1)));
        values.push(value);
    }

    Ok(PartialUpdate { columns, values })
}

/// A `WHERE` fragment with its bound values. `sql` is empty when no
/// filter applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

#[derive(Default)]
struct Conditions {
    parts: Vec<String>,
    values: Vec<SqlValue>,
}

impl Conditions {
    fn bound(&mut self, build: impl FnOnce(&str) -> String, value: SqlValue) {
        self.values.push(value);
        let ph = placeholder(self.values.len());
        self.parts.push(build(&ph));
    }

    fn raw(&mut self, condition: &str) {
        self.parts.push(condition.to_string());
    }

    fn finish(self) -> WhereClause {
        if self.parts.is_empty() {
            return WhereClause::default();
        }
        WhereClause {
            sql: format!("WHERE {}", self.parts.join(" AND ")),
            values: self.values,
        }
    }
}

/// Filters for `GET /companies`.
pub fn sql_where_company_filters(filter: &CompanyFilter) -> Result<WhereClause, AppError> {
    if let (Some(min), Some(max)) = (filter.min_employees, filter.max_employees) {
        if min > max {
            return Err(AppError::bad_request(
                "minEmployees cannot be greater than maxEmployees",
            ));
        }
    }

    let mut c = Conditions::default();
    if let Some(name) = non_empty(&filter.name) {
        c.bound(|ph| format!("name ILIKE {ph}"), SqlValue::Text(contains(name)));
    }
    if let Some(min) = filter.min_employees {
        c.bound(|ph| format!("num_employees >= {ph}"), SqlValue::Int(min));
    }
    if let Some(max) = filter.max_employees {
        c.bound(|ph| format!("num_employees <= {ph}"), SqlValue::Int(max));
    }
    Ok(c.finish())
}

/// Filters for `GET /jobs`. `hasEquity=false` is the same as leaving it out.
pub fn sql_where_job_filters(filter: &JobFilter) -> WhereClause {
    let mut c = Conditions::default();
    if let Some(title) = non_empty(&filter.title) {
        c.bound(|ph| format!("title ILIKE {ph}"), SqlValue::Text(contains(title)));
    }
    if let Some(min) = filter.min_salary {
        c.bound(|ph| format!("salary >= {ph}"), SqlValue::Int(min));
    }
    if filter.has_equity == Some(true) {
        c.raw("equity > 0");
    }
    c.finish()
}

/// Binds values in placeholder order.
pub fn bind_values<'q, O>(
    mut q: QueryAs<'q, Postgres, O, PgArguments>,
    values: Vec<SqlValue>,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for v in values {
        q = match v {
            SqlValue::Text(s) => q.bind(s),
            SqlValue::Int(i) => q.bind(i),
            SqlValue::Decimal(d) => q.bind(d),
            SqlValue::Bool(b) => q.bind(b),
        };
    }
    q
}

fn placeholder(n: usize) -> String {
    format!("${n}")
}

fn contains(needle: &str) -> String {
    format!("%{needle}%")
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
