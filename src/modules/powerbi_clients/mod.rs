pub mod controller;
pub mod router;
pub mod service;

pub use router::init_powerbi_clients_router;
pub use service::PowerBiClientService;
