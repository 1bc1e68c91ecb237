//! Data models for the SidingOps dashboard application.
//!
//! These models match the frontend TypeScript interfaces exactly for seamless interoperability.

mod backup;
mod client;
mod dashboard;
mod project;
mod quote;
mod settings;
mod team;

pub use backup::*;
pub use client::*;
pub use dashboard::*;
pub use project::*;
pub use quote::*;
pub use settings::*;
pub use team::*;
