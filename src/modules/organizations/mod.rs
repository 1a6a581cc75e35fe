pub mod controller;
pub mod router;
pub mod service;

pub use router::init_organizations_router;
pub use service::OrganizationService;
