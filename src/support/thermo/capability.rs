//! Capability traits used to query and construct thermodynamic states.
//!
//! Every [`ThermoClosure`](super::ThermoClosure) provides these capabilities
//! through blanket implementations, so typed callers can work with `uom`
//! quantities while the flow solver keeps to raw SI values.

mod properties;
mod state_from;

pub use properties::*;
pub use state_from::StateFrom;
