//! Test fixtures for shipment-router.
//!
//! Provides realistic test data including:
//! - Real Kaohsiung addresses with coordinates
//! - In-memory geocoding and distance matrix providers built from them

#![allow(dead_code)]

pub mod kaohsiung_locations;

pub use kaohsiung_locations::*;
