//! Integration tests for the harvester
//!
//! `http_tests` drives the full pipeline against a wiremock server;
//! `pipeline_tests` uses an in-memory site on tokio's paused clock to check
//! ordering, pacing and concurrency bounds deterministically.

mod http_tests;
