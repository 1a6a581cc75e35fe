pub mod controller;
pub mod router;
pub mod service;

pub use router::init_tv_router;
pub use service::TvService;
