//! Session trace logging
//!
//! [`TracingConnectionFactory`] decorates any connection factory and
//! writes one JSONL line per message crossing the transport: every
//! inform sent to a party and every action a party sends back.

mod jsonl_trace;

pub use jsonl_trace::TracingConnectionFactory;
