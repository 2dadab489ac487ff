pub mod auth;

pub use auth::{AdminApi, AdminPage, AdminSession, CookiePolicy};
