//! SeaORM repository implementations

pub mod company;

pub use company::CompanyStore;
