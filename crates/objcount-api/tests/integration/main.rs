//! Router-level tests with fake hosting and detection collaborators.
//!
//! Run all integration tests:
//!   cargo test -p objcount-api --test integration

mod api_tests;
mod detect_tests;
mod support;
