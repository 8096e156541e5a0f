pub mod access;

pub use access::{AuthGate, Decision, apply};
