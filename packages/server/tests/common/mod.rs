// Common test utilities

pub mod client;
pub mod harness;

pub use client::*;
pub use fixtures::*;
pub use harness::*;
