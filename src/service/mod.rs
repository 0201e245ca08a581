//! # Session Services
//!
//! Orchestration of a full session lifetime: dialing, handshake, login,
//! and the background dispatch task, plus the mercury subsystem seam.

pub mod mercury;
pub mod session;
