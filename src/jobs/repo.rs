use sqlx::PgPool;
use tracing::warn;

use super::dto::{JobFilter, NewJob, UpdateJob};
use super::repo_types::Job;
use crate::error::AppError;
use crate::sql::{bind_values, sql_for_partial_update, sql_where_job_filters, SqlValue};

const JOB_COLUMNS: &str = "id, title, salary, equity, company_handle";

const FOREIGN_KEY_VIOLATION: &str = "23503";

impl Job {
    /// Insert a job; the database assigns the id.
    pub async fn create(db: &PgPool, data: NewJob) -> Result<Job, AppError> {
        let handle = data.company_handle.clone();
        let res = sqlx::query_as::<_, Job>(&format!(
            r#"
            INSERT INTO jobs (title, salary, equity, company_handle)
            VALUES ($1, $2, $3, $4)
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(data.title)
        .bind(data.salary)
        .bind(data.equity)
        .bind(data.company_handle)
        .fetch_one(db)
        .await;

        match res {
            Ok(job) => Ok(job),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) => {
                warn!(company_handle = %handle, "job for unknown company");
                Err(AppError::bad_request(format!("No company: {handle}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Jobs matching `filter` in storage order.
    pub async fn find_all(db: &PgPool, filter: &JobFilter) -> Result<Vec<Job>, AppError> {
        let clause = sql_where_job_filters(filter);
        let query = format!("SELECT {JOB_COLUMNS} FROM jobs {}", clause.sql);
        let jobs = bind_values(sqlx::query_as::<_, Job>(&query), clause.values)
            .fetch_all(db)
            .await?;
        Ok(jobs)
    }

    pub async fn get(db: &PgPool, id: i32) -> Result<Job, AppError> {
        sqlx::query_as::<_, Job>(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No job: {id}")))
    }

    /// Partial update; moving a job to an unknown company is a 400.
    pub async fn update(db: &PgPool, id: i32, data: UpdateJob) -> Result<Job, AppError> {
        let handle = data.company_handle.clone();
        let update =
            sql_for_partial_update(data.changes(), &[("companyHandle", "company_handle")])?;
        let query = format!(
            "UPDATE jobs SET {} WHERE id = ${} RETURNING {JOB_COLUMNS}",
            update.set_cols(),
            update.next_placeholder(),
        );

        let mut values = update.values;
        values.push(SqlValue::Int(id));
        let res = bind_values(sqlx::query_as::<_, Job>(&query), values)
            .fetch_optional(db)
            .await;

        match res {
            Ok(Some(job)) => Ok(job),
            Ok(None) => Err(AppError::not_found(format!("No job: {id}"))),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) => {
                let handle = handle.unwrap_or_default();
                warn!(job_id = id, company_handle = %handle, "job moved to unknown company");
                Err(AppError::bad_request(format!("No company: {handle}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn remove(db: &PgPool, id: i32) -> Result<(), AppError> {
        sqlx::query_scalar::<_, i32>("DELETE FROM jobs WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No job: {id}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    async fn seed(db: &PgPool) -> Vec<i32> {
        sqlx::query(
            r#"
            INSERT INTO companies (handle, name, num_employees, description, logo_url)
            VALUES ('c1', 'C1', 1, 'Desc1', 'http://c1.img'),
                   ('c2', 'C2', 2, 'Desc2', 'http://c2.img')
            "#,
        )
        .execute(db)
        .await
        .unwrap();

        sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO jobs (title, salary, equity, company_handle)
            VALUES ('Job1', 100, 0.1, 'c1'),
                   ('Job2', 200, 0.2, 'c1'),
                   ('Job3', 300, 0, 'c1'),
                   ('Job4', NULL, NULL, 'c1')
            RETURNING id
            "#,
        )
        .fetch_all(db)
        .await
        .unwrap()
    }

    fn titles(jobs: &[Job]) -> Vec<&str> {
        jobs.iter().map(|j| j.title.as_str()).collect()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn create_unknown_company_is_bad_request(pool: PgPool) {
        seed(&pool).await;
        let data = NewJob {
            title: "Test".into(),
            salary: Some(100),
            equity: Some(Decimal::from_str("0.1").unwrap()),
            company_handle: "nope".into(),
        };
        let err = Job::create(&pool, data).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "No company: nope");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn find_all_applies_each_filter(pool: PgPool) {
        seed(&pool).await;

        let all = Job::find_all(&pool, &JobFilter::default()).await.unwrap();
        assert_eq!(titles(&all), vec!["Job1", "Job2", "Job3", "Job4"]);

        let by_title = JobFilter {
            title: Some("b1".into()),
            ..Default::default()
        };
        assert_eq!(titles(&Job::find_all(&pool, &by_title).await.unwrap()), vec!["Job1"]);

        let by_salary = JobFilter {
            min_salary: Some(150),
            ..Default::default()
        };
        assert_eq!(
            titles(&Job::find_all(&pool, &by_salary).await.unwrap()),
            vec!["Job2", "Job3"]
        );

        let with_equity = JobFilter {
            has_equity: Some(true),
            ..Default::default()
        };
        assert_eq!(
            titles(&Job::find_all(&pool, &with_equity).await.unwrap()),
            vec!["Job1", "Job2"]
        );

        let combined = JobFilter {
            title: Some("job".into()),
            min_salary: Some(150),
            has_equity: Some(true),
        };
        assert_eq!(titles(&Job::find_all(&pool, &combined).await.unwrap()), vec!["Job2"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn get_update_remove_report_missing_job(pool: PgPool) {
        seed(&pool).await;

        assert!(matches!(Job::get(&pool, 0).await, Err(AppError::NotFound(_))));

        let data = UpdateJob {
            title: Some("New".into()),
            ..Default::default()
        };
        assert!(matches!(Job::update(&pool, 0, data).await, Err(AppError::NotFound(_))));

        assert!(matches!(Job::remove(&pool, 0).await, Err(AppError::NotFound(_))));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn update_moves_job_between_companies(pool: PgPool) {
        let ids = seed(&pool).await;

        let data = UpdateJob {
            title: Some("Job1-update".into()),
            salary: Some(200000),
            equity: Some(Decimal::from_str("0.1").unwrap()),
            company_handle: Some("c2".into()),
        };
        let job = Job::update(&pool, ids[0], data).await.unwrap();
        assert_eq!(job.id, ids[0]);
        assert_eq!(job.title, "Job1-update");
        assert_eq!(job.company_handle, "c2");

        let data = UpdateJob {
            company_handle: Some("nope".into()),
            ..Default::default()
        };
        let err = Job::update(&pool, ids[0], data).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "No company: nope");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn remove_deletes_row(pool: PgPool) {
        let ids = seed(&pool).await;
        Job::remove(&pool, ids[0]).await.unwrap();
        assert!(matches!(Job::get(&pool, ids[0]).await, Err(AppError::NotFound(_))));
    }
}
