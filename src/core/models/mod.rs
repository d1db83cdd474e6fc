pub mod engine_status;
pub mod import_result;
pub mod key_listing;
