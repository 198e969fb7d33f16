pub mod dateparse;
pub mod error;
pub mod logger;
pub mod slug;
pub mod validation;
