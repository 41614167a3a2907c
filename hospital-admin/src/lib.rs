//! Hospital administration console library
//!
//! Stores for bills, departments, medicines, resources and staff, the admin
//! session layer, and the axum router serving the console. The binary entry
//! point is in main.rs.

pub mod admin;
pub mod auth;
pub mod bill;
pub mod config;
pub mod db;
pub mod department;
pub mod error;
pub mod forms;
pub mod guard;
pub mod medicine;
pub mod resource;
mod sql;
pub mod staff;
