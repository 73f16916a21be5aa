//! Integration tests for the harvester
//!
//! These tests use wiremock to create mock HTTP servers and run both
//! harvest passes end-to-end.

mod pipeline_tests;
