//! Integration tests for Sumi-Extract
//!
//! These tests use wiremock to stand in for both the target page and the
//! provider's chat-completions API.

mod common;
mod executor_tests;
mod pipeline_tests;
