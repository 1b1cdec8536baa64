pub mod crm_service;
pub use crm_service::CrmService;
pub mod dashboard_service;
pub use dashboard_service::DashboardService;
