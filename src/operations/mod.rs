pub mod add;
pub mod budget;
pub mod dashboard;
pub mod export;
pub mod import;
pub mod ledger;
pub mod profile;
pub mod sample_data;
pub mod search;
pub mod views;
