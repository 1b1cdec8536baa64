pub mod crm_repo;
pub use crm_repo::CrmRepository;
