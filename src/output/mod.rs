//! Line protocol output
//!
//! Everything a plugin writes to stdout goes through [`LineWriter`];
//! diagnostics belong on stderr via the logger.

pub mod protocol;

pub use protocol::LineWriter;
