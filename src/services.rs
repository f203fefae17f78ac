pub mod analysis_service;
pub mod auth;
pub mod change_feed;
pub mod dashboard_service;
pub mod lead_filter;
pub mod lead_service;
pub mod lead_store;
