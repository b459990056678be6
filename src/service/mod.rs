//! # Client Services
//!
//! - **Session**: one authenticated connection executing one command at a time
//! - **Client**: the shared, self-healing handle applications send commands through

pub mod client;
pub mod session;
