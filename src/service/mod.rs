//! Long-lived services shared by the HTTP handlers.

pub mod auth;
pub mod classifier;
pub mod retrain_actor;
pub mod retrain_runner;

pub use auth::{AdminAuth, AdminClaim, Capability, SessionId, SessionStore};
pub use classifier::{ClassifierHandle, ClassifierService};
pub use retrain_actor::RetrainHandle;
