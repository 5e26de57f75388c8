//! Web handlers module

pub mod companies;
pub mod health;
