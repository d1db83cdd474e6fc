pub mod keyring_session;
