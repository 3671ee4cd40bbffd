//! Seamless - gradient-domain image blending
//!
//! Command-line and HTTP front-end for the `poisson-blend` engine.
//! This library exposes modules for integration testing.

pub mod api;
pub mod codec;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
pub mod session;
