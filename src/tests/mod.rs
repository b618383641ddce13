// Test modules

mod auth_middleware_test;
pub mod common;
