pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod errors;
pub mod mock;
pub mod models;
pub mod policy;
pub mod session;
pub mod views;
