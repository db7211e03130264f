//! Daily planner for the terminal: a date, top priorities, a brain dump and a table of
//! time-boxed tasks with completion checkboxes. Everything is kept in a local key-value store,
//! so the planner is still there the next time it's opened.
//!

pub mod cli;
pub mod fs;
pub mod planner;
pub mod platform;
pub mod render;
pub mod storage;
pub mod utils;
