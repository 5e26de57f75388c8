pub use super::companies::Entity as Companies;
