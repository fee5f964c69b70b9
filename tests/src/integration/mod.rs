//! Cross-module integration scenarios.

mod dispatch_flows;
mod outbound_flows;
