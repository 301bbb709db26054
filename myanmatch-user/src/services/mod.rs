pub mod profile_service;
pub mod quota;
pub mod wallet;
