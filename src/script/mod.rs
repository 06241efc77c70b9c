//! Contended memory scripts
//!
//! A script describes, in bus order, which accesses of an instruction are subject to
//! ULA contention and how many T-states each one takes.

pub mod catalog;
pub mod element;
pub mod parser;

pub use catalog::*;
pub use element::*;
pub use parser::*;
