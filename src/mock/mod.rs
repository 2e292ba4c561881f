//! Spec-driven mock server
//!
//! Matches requests against the spec's path templates, derives a strict
//! schema for the declared response and asks the generator for a body.

pub mod engine;
pub mod server;

pub use engine::{envelope_schema, MockEngine, MockRequest, MockResponse, PreparedRoute};
pub use server::MockServer;
