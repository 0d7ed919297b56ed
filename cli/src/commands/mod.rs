pub mod auth;
pub mod book;
pub mod config;
pub mod get;
