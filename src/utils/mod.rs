//! # Utility Modules
//!
//! Supporting utilities that sit beside the codec rather than inside it.
//!
//! ## Components
//! - **Logging**: tracing subscriber setup driven by `LoggingConfig`

pub mod logging;
