//! Vizij Spring Headless
//!
//! Deterministic in-process [`SpringEngine`](vizij_spring_core::SpringEngine) for
//! tests, tools and servers: springs write into a [`Scene`] and a fixed-step driver
//! pumps their lifecycle events back into the registry.

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod scene;

pub use config::SimConfig;
pub use driver::{run_until_idle, step_frame};
pub use engine::HeadlessEngine;
pub use error::{HeadlessError, Result};
pub use scene::Scene;
