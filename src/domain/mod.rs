//! Domain layer for the accessibility checker
//!
//! Pure value types shared by every other layer: rule identifiers, violation
//! records, check reports and the error taxonomy.

pub mod violations;

// Re-export main domain types for convenience
pub use violations::*;
