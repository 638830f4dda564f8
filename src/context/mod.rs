//! Ambient context store.
//!
//! An asynchronous-call-chain-scoped key/value store: create an isolated
//! scope, run a future inside it, read/write keys visible only within that
//! scope and its descendants, and rebind callbacks so they resume with the
//! scope that was active when the rebinding happened.

mod frame;
mod namespace;

pub use frame::{Scope, ScopeBindable};
pub use namespace::{create_namespace, get_namespace, Namespace};
