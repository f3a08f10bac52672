//! # Tasktrack API Server Library
//!
//! HTTP surface of the task tracker, built on Axum.
//!
//! ## Modules
//!
//! - `app`: Application state, storage selection, and router builder
//! - `config`: Layered configuration
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Caller and validated-body extractors
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
