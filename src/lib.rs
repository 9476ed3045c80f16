pub mod auth;
pub mod config;
pub mod error;
pub mod hooks;
pub mod local_store;
pub mod models;
pub mod pipeline;
pub mod repository;
pub mod routes;
pub mod state;
pub mod suggest;
