pub mod decrypt;
pub mod encrypt;
pub mod import;
pub mod keys;
pub mod recipient;
