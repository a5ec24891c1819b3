pub mod adapters;
pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod insight;
pub mod logging;
pub mod models;
pub mod ports;
pub mod retrieval;
pub mod router;
pub mod security;
pub mod state;
pub mod utils;
