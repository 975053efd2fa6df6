use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::repo_types::Job;
use crate::sql::SqlValue;

/// Query-string filters for `GET /jobs`. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilter {
    pub title: Option<String>,
    pub min_salary: Option<i32>,
    pub has_equity: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[validate(schema(function = "new_job_equity", skip_on_field_errors = false))]
pub struct NewJob {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[validate(range(min = 0, message = "salary must be greater than or equal to 0"))]
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    #[validate(length(min = 1, max = 25, message = "companyHandle must be 1 to 25 characters"))]
    pub company_handle: String,
}

/// The id is fixed once a job exists; everything else may change.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[validate(schema(function = "update_job_equity", skip_on_field_errors = false))]
pub struct UpdateJob {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    #[validate(range(min = 0, message = "salary must be greater than or equal to 0"))]
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    #[validate(length(min = 1, max = 25, message = "companyHandle must be 1 to 25 characters"))]
    pub company_handle: Option<String>,
}

impl UpdateJob {
    pub fn changes(self) -> Vec<(&'static str, SqlValue)> {
        let mut out = Vec::new();
        if let Some(v) = self.title {
            out.push(("title", SqlValue::Text(v)));
        }
        if let Some(v) = self.salary {
            out.push(("salary", SqlValue::Int(v)));
        }
        if let Some(v) = self.equity {
            out.push(("equity", SqlValue::Decimal(v)));
        }
        if let Some(v) = self.company_handle {
            out.push(("companyHandle", SqlValue::Text(v)));
        }
        out
    }
}

// NUMERIC has no `range` support in validator, so equity is checked per struct.
fn equity_in_range(equity: Option<Decimal>) -> Result<(), ValidationError> {
    match equity {
        Some(e) if e < Decimal::ZERO || e > Decimal::ONE => {
            let mut err = ValidationError::new("range");
            err.message = Some("equity must be between 0 and 1".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

fn new_job_equity(job: &NewJob) -> Result<(), ValidationError> {
    equity_in_range(job.equity)
}

fn update_job_equity(job: &UpdateJob) -> Result<(), ValidationError> {
    equity_in_range(job.equity)
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub job: Job,
}

#[derive(Debug, Serialize)]
pub struct JobsResponse {
    pub jobs: Vec<Job>,
}

/// The id is echoed back as a string, e.g. `{"deleted": "7"}`.
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: String,
}
