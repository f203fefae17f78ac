pub mod lead_repo;
pub use lead_repo::{LeadGateway, LeadRepository};
pub mod seller_repo;
pub use seller_repo::SellerRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
