//! Integration tests for the maintenance console

mod api_tests;
mod support;
mod workflow_tests;
