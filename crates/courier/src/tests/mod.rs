//! Test suites for the gateway crate.

mod lib_api;
mod support;
