// Library root for the artist portfolio API

pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod instagram;
pub mod middleware;
pub mod models;
pub mod router;
pub mod state;

// Re-export commonly used types
pub use db::Database;
pub use error::ApiError;
pub use router::create_router;
pub use state::AppState;
