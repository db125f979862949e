pub mod budget;
pub mod profile;
pub mod transaction;
