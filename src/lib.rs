//! Market data backend for the BullBear dashboard.
//!
//! `models` holds the wire contracts (`DataResult`, `ApiResponse`) and the
//! label table; everything else fetches and serves those shapes.

pub mod config;
pub mod handlers;
pub mod models;
pub mod providers;
pub mod services;
pub mod sources;
