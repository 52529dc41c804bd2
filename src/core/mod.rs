//! Core logic layer
//!
//! The typing state machine, its language catalog, the async drivers that put
//! it on a clock, and the frontend-agnostic application state.
//! Rendering lives in `frontend/`.

pub mod animator;
pub mod app_core;
pub mod catalog;
pub mod driver;

pub use app_core::AppCore;
