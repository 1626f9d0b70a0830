//! Common library for the employee directory
//!
//! This crate provides the infrastructure shared by the directory services:
//! PostgreSQL pooling and migrations, the Redis wrapper used for shared
//! sessions, and storage error types.

pub mod cache;
pub mod database;
pub mod error;
