pub(crate) mod client;
pub(crate) mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use client::ControlPlaneClient;
pub use types::{CloneStarted, CloneState, CloneStatus, KeyspaceRemoval};
