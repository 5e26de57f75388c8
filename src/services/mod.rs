//! Service layer

pub mod company_lookup;
pub mod result_cache;

pub use company_lookup::{CacheReport, CompanyLookupService, ServiceStatus};
pub use result_cache::{CacheStats, ResultCache};
