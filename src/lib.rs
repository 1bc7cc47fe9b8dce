pub mod config;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod models;
pub mod pages;
pub mod repositories;
pub mod router;
pub mod services;
pub mod session;
pub mod state;
pub mod urls;
