pub mod blend_service;

pub use blend_service::{BlendJob, BlendService};
