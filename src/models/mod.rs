//! Domain models

pub mod company;

pub use company::*;
