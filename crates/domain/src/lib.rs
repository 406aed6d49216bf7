//! Core domain types for multi-hop swap estimation over constant-product pools.

/// Minimum-liquidity compliance checks.
pub mod compliance;
/// Replicated market entities and their partial updates.
pub mod entities;
/// Constant-product and liquidity math.
pub mod math;
/// Reserve-derived prices.
pub mod pricing;
/// Integer token amounts and unit conversion.
pub mod token;
/// Small value types.
pub mod value_objects;
