pub mod accounts;
pub mod dashboard;
pub mod leads;
pub mod opps;
