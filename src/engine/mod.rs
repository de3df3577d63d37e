pub mod coordinator;
pub mod fare;
pub mod notify;
pub mod seed;
