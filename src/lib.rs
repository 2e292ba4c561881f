//! specmock library interface
//!
//! A mock HTTP server that answers the operations of an OpenAPI 3.x or
//! Swagger 2.0 document with JSON generated by a language model under a
//! strict schema derived from the declared response.
//!
//! # Module Organization
//!
//! - [`openapi`] - Spec loading, `$ref` resolution and the document model
//! - [`routing`] - Path template matching and operation selection
//! - [`schema`] - Strict schema normalization and the response envelope
//! - [`generate`] - The generator seam and the OpenAI / Azure backend
//! - [`mock`] - Request pipeline and HTTP server
//! - [`config`], [`env`] - Configuration sources
//! - [`errors`] - Error types (SpecmockError, Result)
//! - [`status`] - Exit status codes (ExitStatus)

pub mod cli;
pub mod config;
pub mod env;
pub mod errors;
pub mod generate;
pub mod mock;
pub mod openapi;
pub mod routing;
pub mod schema;
pub mod status;
pub mod telemetry;
