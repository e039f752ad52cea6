/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - The two upload slots and the readiness gate (slots.rs)
/// - The result lifecycle state machine (lifecycle.rs)
/// - The session object tying them together (session.rs)

pub mod data;
pub mod lifecycle;
pub mod session;
pub mod slots;
