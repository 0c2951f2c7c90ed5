pub mod auth;
pub mod error;
pub mod jokes;
pub mod routes;
pub mod session;
pub mod views;
