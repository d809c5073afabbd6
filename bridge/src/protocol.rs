//! Messages exchanged with the broadcasting host.
//!
//! Every message is a single JSON object on its own line, discriminated by its `"type"` field.

mod incoming;
pub use incoming::*;

mod outgoing;
pub use outgoing::*;
