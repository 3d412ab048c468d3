//! Weekly clinic staffing: picks which professional works which shift so that
//! the least patient demand goes unmet, then compares that schedule with a
//! hand-written one.

pub mod compare;
pub mod data;
pub mod error;
pub mod evaluator;
pub mod report;
pub mod sample;
pub mod server;
pub mod solver;
