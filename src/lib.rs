// Crate root library declaration and module exports.
pub mod aggregate;
pub mod cli;
pub mod client;
pub mod config;
pub mod context;
pub mod document;
pub mod draw;
pub mod error;
pub mod layout;
pub mod model;
pub mod page;
pub mod planner;
pub mod storage;
pub mod sync;
pub mod writer;

pub use error::{PlannerError, PlannerResult};
