//! # Utility Modules
//!
//! Supporting utilities for timeouts, logging, and metrics.
//!
//! ## Components
//! - **Timeout**: Async timeout wrappers and the default bounds
//! - **Logging**: Structured logging configuration
//! - **Metrics**: Per-client observability counters

pub mod logging;
pub mod metrics;
pub mod timeout;
