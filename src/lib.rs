//! Mock ledger client for an RFQ bidding platform.
//!
//! Every call waits out a simulated network latency and hands back fabricated
//! identifiers and records. Nothing is signed, submitted or stored.

pub mod ledger;
pub mod settings;
pub mod telemetry;
