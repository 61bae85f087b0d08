//! CampusPay - payment and entitlement service for the campus map
//!
//! Stores on the map purchase premium (VIP) or advertising packages through
//! the PayOS payment gateway. This crate owns the order lifecycle: pricing a
//! package, binding an order code to a pending entitlement, creating the
//! hosted checkout link, and reconciling the gateway's signed webhook so the
//! entitlement is committed exactly once.

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod order_code;
pub mod payments;
pub mod pricing;
