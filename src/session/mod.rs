//! Session lifecycle management
//!
//! Each negotiated media connection becomes a set of independently-scheduled
//! pipeline tasks. This module owns their bookkeeping: attach on successful
//! negotiation, replacement on renegotiation, shutdown on transport closure,
//! and self-removal when every track has ended.

mod manager;

pub use manager::{SessionContext, SessionManager};
