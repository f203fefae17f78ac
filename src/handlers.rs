pub mod auth;
pub mod dashboard;
pub mod leads;
pub mod sellers;
