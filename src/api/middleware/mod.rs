//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. CORS: the dashboard runs in a browser on another origin
//! 2. Access logger: request id, method, path, status, latency

pub mod access_log;
