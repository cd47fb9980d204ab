//! Peer relay for two-player provable matches.
//!
//! Two peers each run the deterministic engine locally and exchange only
//! their own paddle positions; the relay assembles the single authoritative
//! event stream and hands the finished CompactLog back to both.

pub mod peer;
pub mod protocol;
pub mod server;
pub mod session;

pub use peer::{run_peer, PeerReport};
pub use protocol::{Message, Role};
pub use server::run_relay;
pub use session::{Session, SessionFault};
