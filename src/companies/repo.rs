use sqlx::PgPool;
use tracing::warn;

use super::dto::{CompanyFilter, NewCompany, UpdateCompany};
use super::repo_types::{Company, CompanyDetail, CompanyJob};
use crate::error::AppError;
use crate::sql::{bind_values, sql_for_partial_update, sql_where_company_filters, SqlValue};

const COMPANY_COLUMNS: &str = "handle, name, description, num_employees, logo_url";

const UNIQUE_VIOLATION: &str = "23505";
const NAME_CONSTRAINT: &str = "companies_name_key";

/// Both `handle` and `name` are unique; report whichever one collided.
fn duplicate(e: &dyn sqlx::error::DatabaseError, handle: &str, name: Option<&str>) -> AppError {
    let taken = match (e.constraint(), name) {
        (Some(NAME_CONSTRAINT), Some(name)) => name,
        _ => handle,
    };
    warn!(%taken, "duplicate company");
    AppError::bad_request(format!("Duplicate company: {taken}"))
}

impl Company {
    /// Insert a company; a taken handle or name is a 400.
    pub async fn create(db: &PgPool, data: NewCompany) -> Result<Company, AppError> {
        let handle = data.handle.clone();
        let name = data.name.clone();
        let res = sqlx::query_as::<_, Company>(&format!(
            r#"
            INSERT INTO companies (handle, name, description, num_employees, logo_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COMPANY_COLUMNS}
            "#
        ))
        .bind(data.handle)
        .bind(data.name)
        .bind(data.description)
        .bind(data.num_employees)
        .bind(data.logo_url)
        .fetch_one(db)
        .await;

        match res {
            Ok(company) => Ok(company),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(duplicate(&*e, &handle, Some(&name)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Companies matching `filter`, ordered by name.
    pub async fn find_all(db: &PgPool, filter: &CompanyFilter) -> Result<Vec<Company>, AppError> {
        let clause = sql_where_company_filters(filter)?;
        let query = format!(
            "SELECT {COMPANY_COLUMNS} FROM companies {} ORDER BY name",
            clause.sql
        );
        let companies = bind_values(sqlx::query_as::<_, Company>(&query), clause.values)
            .fetch_all(db)
            .await?;
        Ok(companies)
    }

    /// Company plus its jobs.
    pub async fn get(db: &PgPool, handle: &str) -> Result<CompanyDetail, AppError> {
        let company = sqlx::query_as::<_, Company>(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE handle = $1"
        ))
        .bind(handle)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No company: {handle}")))?;

        let jobs = sqlx::query_as::<_, CompanyJob>(
            "SELECT id, title, salary, equity FROM jobs WHERE company_handle = $1 ORDER BY id",
        )
        .bind(handle)
        .fetch_all(db)
        .await?;

        Ok(CompanyDetail { company, jobs })
    }

    pub async fn update(
        db: &PgPool,
        handle: &str,
        data: UpdateCompany,
    ) -> Result<Company, AppError> {
        let name = data.name.clone();
        let update = sql_for_partial_update(
            data.changes(),
            &[("numEmployees", "num_employees"), ("logoUrl", "logo_url")],
        )?;
        let query = format!(
            "UPDATE companies SET {} WHERE handle = ${} RETURNING {COMPANY_COLUMNS}",
            update.set_cols(),
            update.next_placeholder(),
        );

        let mut values = update.values;
        values.push(SqlValue::Text(handle.to_string()));
        let res = bind_values(sqlx::query_as::<_, Company>(&query), values)
            .fetch_optional(db)
            .await;

        match res {
            Ok(Some(company)) => Ok(company),
            Ok(None) => Err(AppError::not_found(format!("No company: {handle}"))),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(duplicate(&*e, handle, name.as_deref()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn remove(db: &PgPool, handle: &str) -> Result<(), AppError> {
        sqlx::query_scalar::<_, String>("DELETE FROM companies WHERE handle = $1 RETURNING handle")
            .bind(handle)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No company: {handle}")))?;
        Ok(())
    }
}
