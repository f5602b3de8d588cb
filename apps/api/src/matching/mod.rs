pub mod assessment;
pub mod handlers;
pub mod insights;
pub mod prompts;
pub mod ranking;
pub mod scorer;
pub mod store;
pub mod tier;
