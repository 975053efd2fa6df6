use serde::{Deserialize, Serialize};

/// JWT payload attached to authenticated requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub username: String,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
    pub iat: usize,  // issued at (unix timestamp)
    pub exp: usize,  // expires at (unix timestamp)
    pub iss: String, // issuer
    pub aud: String, // audience
}
