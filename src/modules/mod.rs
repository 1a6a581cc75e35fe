pub mod auth;
pub mod dashboards;
pub mod navigation;
pub mod organizations;
pub mod page_permissions;
pub mod powerbi_clients;
pub mod proxy;
pub mod reports;
pub mod tv;
pub mod users;
