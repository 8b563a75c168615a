//! Command entry points.

pub mod check;
