pub mod controller;
pub mod router;
pub mod service;

pub use router::init_page_permissions_router;
pub use service::PagePermissionService;
