//! # Storage Module
//!
//! Repository abstraction over the remote appointment store.
//!
//! The engine never talks to the network directly. Components receive an
//! `Arc<dyn ScheduleRepository>` at construction time, which keeps the remote
//! client swappable and lets tests substitute fakes.
//!
//! - **traits**: the `ScheduleRepository` contract
//! - **memory**: an in-process implementation for the demo binary and tests

pub mod memory;
pub mod traits;

pub use memory::InMemoryScheduleRepository;
pub use traits::ScheduleRepository;
