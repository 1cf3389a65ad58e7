use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod entity;
pub mod error;
pub mod handlers;
mod password;
pub mod repo;
pub mod services;
pub mod validate;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
