//! Adapter integration tests.

#[path = "adapters/local_test.rs"]
mod local_test;
#[path = "adapters/resend_test.rs"]
mod resend_test;
