//! Core types and scheduling rules for the Roster staff scheduler.
//!
//! No HTTP or database code lives here. Storage is reached through
//! [`store::ScheduleStore`] and the employee/project/team registry through
//! [`directory::Directory`]; [`scheduler::Scheduler`] ties them together.

// Store and directory traits use native `async fn`; callers here are all
// generic, so the `Send` advisory lint is noise.
#![allow(async_fn_in_trait)]

pub mod analytics;
pub mod clock;
pub mod conflict;
pub mod directory;
pub mod employee;
pub mod error;
pub mod interval;
pub mod policy;
pub mod query;
pub mod schedule;
pub mod scheduler;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
