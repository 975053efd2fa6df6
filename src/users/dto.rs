use serde::{Deserialize, Serialize};
use validator::Validate;

use super::repo_types::User;
use crate::sql::SqlValue;

/// Admin-created user. `isAdmin` defaults to false.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewUser {
    #[validate(length(min = 1, max = 30, message = "username must be 1 to 30 characters"))]
    pub username: String,
    #[validate(length(min = 5, max = 20, message = "password must be 5 to 20 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 30, message = "firstName must be 1 to 30 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 30, message = "lastName must be 1 to 30 characters"))]
    pub last_name: String,
    #[validate(
        length(min = 6, max = 60, message = "email must be 6 to 60 characters"),
        email(message = "email must be an email address")
    )]
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Self-registration; cannot grant admin.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterUser {
    #[validate(length(min = 1, max = 30, message = "username must be 1 to 30 characters"))]
    pub username: String,
    #[validate(length(min = 5, max = 20, message = "password must be 5 to 20 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 30, message = "firstName must be 1 to 30 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 30, message = "lastName must be 1 to 30 characters"))]
    pub last_name: String,
    #[validate(
        length(min = 6, max = 60, message = "email must be 6 to 60 characters"),
        email(message = "email must be an email address")
    )]
    pub email: String,
}

impl From<RegisterUser> for NewUser {
    fn from(r: RegisterUser) -> Self {
        Self {
            username: r.username,
            password: r.password,
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            is_admin: false,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 30, message = "firstName must be 1 to 30 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 30, message = "lastName must be 1 to 30 characters"))]
    pub last_name: Option<String>,
    #[validate(length(min = 5, max = 20, message = "password must be 5 to 20 characters"))]
    pub password: Option<String>,
    #[validate(
        length(min = 6, max = 60, message = "email must be 6 to 60 characters"),
        email(message = "email must be an email address")
    )]
    pub email: Option<String>,
}

impl UpdateUser {
    /// Supplied fields keyed by request name, in declaration order.
    pub fn changes(self) -> Vec<(&'static str, SqlValue)> {
        let mut out = Vec::new();
        if let Some(v) = self.first_name {
            out.push(("firstName", SqlValue::Text(v)));
        }
        if let Some(v) = self.last_name {
            out.push(("lastName", SqlValue::Text(v)));
        }
        if let Some(v) = self.password {
            out.push(("password", SqlValue::Text(v)));
        }
        if let Some(v) = self.email {
            out.push(("email", SqlValue::Text(v)));
        }
        out
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse<T> {
    pub user: T,
}

#[derive(Debug, Serialize)]
pub struct CreatedUserResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: String,
}

#[derive(Debug, Serialize)]
pub struct AppliedResponse {
    pub applied: i32,
}
