//! User service data types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// User id
    pub id: u64,
    /// Login name
    #[not_blank]
    pub name: String,
    /// Registration time
    #[serde(rename = "createdAt")]
    pub created_at: NaiveDateTime,
    pub status: UserStatus,
    /// Users this user follows
    pub friends: Vec<User>,
    /// Free-form attributes
    pub attributes: HashMap<String, String>,
    #[serde(skip)]
    pub password: String,
}

/// Account state
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum UserStatus {
    /// Can log in
    Active,
    /// Locked out
    Locked,
}

/// One page of results
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total matches
    pub total: u64,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    /// Name prefix
    pub name: Option<String>,
    /// Page number
    /// @default 1
    pub page: u32,
}

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    /// Login name
    #[not_blank]
    pub name: String,
    pub status: UserStatus,
}
