//! Matching requests to spec operations

pub mod matcher;
pub mod router;

pub use matcher::{match_path, PathMatch, PathMatcher, PathParams, PathTemplate, Segment};
pub use router::{ResponseTarget, RouteTarget, Router};
