//! Shared fixtures and assertions for integration tests.

#![allow(dead_code)]

pub mod model_assertions;
pub mod record_fixtures;
