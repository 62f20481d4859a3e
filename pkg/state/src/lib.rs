//! Persistent cluster state for quotad.

pub mod client;
