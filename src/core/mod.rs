//! Domain types shared by the answering client and the UI backend

pub mod identity;

pub use identity::{BranchScope, IdentityError, Role, SessionContext, SessionIdentity};
