//! Invariants of the search and analysis engine, checked through the
//! public library API on the shared sample document and generated apps.

pub mod risk_properties;
