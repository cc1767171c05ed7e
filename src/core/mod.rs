pub mod context;
pub mod error;
pub mod filter;
pub mod record_edit;
pub mod types;
