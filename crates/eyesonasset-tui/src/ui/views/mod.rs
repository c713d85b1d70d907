pub mod assets;
pub mod auth;
pub mod edit;
pub mod owners;
