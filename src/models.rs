pub mod crm;
pub mod dashboard;
