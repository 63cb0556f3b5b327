use serde::{Deserialize, Serialize};

/// The profile forwarded to the client once the token has been taken out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub created_date: String,
    pub roles: Vec<i64>,
}

/// Body returned by the backend on a successful login.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}
