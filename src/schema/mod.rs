//! JSON schema normalization for strict structured generation
//!
//! A response schema from the spec document goes through four passes, in
//! this order:
//!
//! 1. [`merge_all_of`] folds `allOf` compositions
//! 2. [`remove_unsupported_keywords`] drops range and format constraints
//! 3. [`disallow_additional_properties`] closes every object
//! 4. [`require_all_properties`] marks every declared property required
//!
//! Later passes assume no composition is left and work on the final
//! property set of each object. Every pass returns a new tree.

pub mod envelope;
pub mod flatten;
pub mod kind;
pub mod strict;
pub mod strip;

use serde_json::Value;

pub use envelope::{build_envelope, split_envelope, GeneratedResponse};
pub use flatten::merge_all_of;
pub use kind::{classify, SchemaKind};
pub use strict::{disallow_additional_properties, require_all_properties};
pub use strip::{remove_unsupported_keywords, UNSUPPORTED_KEYWORDS};

/// Run the full strictification pipeline over a schema fragment
pub fn normalize(schema: &Value) -> Value {
    let schema = merge_all_of(schema);
    let schema = remove_unsupported_keywords(&schema);
    let schema = disallow_additional_properties(&schema);
    require_all_properties(&schema)
}
