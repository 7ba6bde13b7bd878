//! HTTP handlers for users.

use crate::model::{CreateUser, Page, User, UserQuery};
use crate::{AppError, AppState};
use axum::extract::State;
use axum::Json;

/// User management
///
/// @menu Users
#[rest_controller]
#[request_mapping("/api/users")]
pub struct UserController;

impl UserController {
    /// List users
    ///
    /// @param query filters
    #[get_mapping]
    pub fn list(&self, query: UserQuery, state: State<AppState>) -> Json<Page<User>> {
        todo!()
    }

    /// Get a user
    ///
    /// @param id the user id
    #[get_mapping(path = ["/{id}", "/by-id/{id}"])]
    pub fn get(&self, #[path_variable] id: u64) -> Result<Json<User>, AppError> {
        todo!()
    }

    /// Create a user
    #[post_mapping]
    pub fn create(&self, #[request_body] body: CreateUser) -> Json<User> {
        todo!()
    }

    /// Remove a user
    ///
    /// @deprecated use the admin api
    #[delete_mapping("/{id}")]
    pub fn delete(&self, #[path_variable] id: u64) {}

    #[get_mapping("/audit")]
    fn audit(&self) -> String {
        String::new()
    }
}
