pub mod analyze;
pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod courses;
pub mod db;
pub mod documents;
pub mod error;
pub mod home;
pub mod llm;
pub mod state;
pub mod store;
pub mod tasks;
pub mod validation;
