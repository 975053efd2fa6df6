use serde::{Deserialize, Serialize};
use validator::Validate;

use super::repo_types::Company;
use crate::sql::SqlValue;

/// Query-string filters for `GET /companies`. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyFilter {
    pub name: Option<String>,
    pub min_employees: Option<i32>,
    pub max_employees: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    #[validate(length(min = 1, max = 25, message = "handle must be 1 to 25 characters"))]
    pub handle: String,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub description: String,
    #[validate(range(min = 0, message = "numEmployees must be greater than or equal to 0"))]
    pub num_employees: Option<i32>,
    #[validate(url(message = "logoUrl must be a URL"))]
    pub logo_url: Option<String>,
}

/// `handle` is the key and cannot be patched.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateCompany {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "numEmployees must be greater than or equal to 0"))]
    pub num_employees: Option<i32>,
    #[validate(url(message = "logoUrl must be a URL"))]
    pub logo_url: Option<String>,
}

impl UpdateCompany {
    pub fn changes(self) -> Vec<(&'static str, SqlValue)> {
        let mut out = Vec::new();
        if let Some(v) = self.name {
            out.push(("name", SqlValue::Text(v)));
        }
        if let Some(v) = self.description {
            out.push(("description", SqlValue::Text(v)));
        }
        if let Some(v) = self.num_employees {
            out.push(("numEmployees", SqlValue::Int(v)));
        }
        if let Some(v) = self.logo_url {
            out.push(("logoUrl", SqlValue::Text(v)));
        }
        out
    }
}

#[derive(Debug, Serialize)]
pub struct CompanyResponse<T> {
    pub company: T,
}

#[derive(Debug, Serialize)]
pub struct CompaniesResponse {
    pub companies: Vec<Company>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: String,
}
