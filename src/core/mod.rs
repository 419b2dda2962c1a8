//! Core business logic - framework-agnostic catalog, cart, checkout and receipt operations.

/// Cart aggregate and its snapshots
pub mod cart;
/// Catalog queries, validated inserts and seeding
pub mod catalog;
/// Atomic order placement and payment validation
pub mod checkout;
/// Receipt building, rendering and emission
pub mod receipt;
/// Cashier session tying the other modules together
pub mod register;
/// Stock lookup and guarded reservation
pub mod stock;
