pub mod portfolio;
pub mod search;
