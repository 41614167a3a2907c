//! Web administration UI module.
//!
//! Provides:
//! - Administrator login/logout backed by session rows
//! - The session guard applied to every screen
//! - Listing and add/edit/delete screens for bills, departments, medicines,
//!   resources and staff

pub mod middleware;
pub mod pages;
pub mod routes;
pub mod templates;

pub use middleware::{AdminState, SESSION_COOKIE};
pub use routes::{admin_router, app_router};
