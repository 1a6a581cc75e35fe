pub mod controller;
pub mod router;
pub mod service;

pub use router::init_navigation_router;
pub use service::NavigationService;
