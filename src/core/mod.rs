//! Shared constants and primitive helpers used by every layer.

pub mod amount;
pub mod kinds;
