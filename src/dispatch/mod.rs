//! Tick-driven dispatch
//!
//! Consumes a schedule against a live countdown clock, starting each
//! announcement early enough that speech completion lands on its offset.

pub mod dispatcher;
pub mod lead;

pub use self::dispatcher::{DispatchEvent, Dispatcher, DispatcherConfig, DispatcherInfo};
pub use self::lead::{LeadBand, LeadTable};
