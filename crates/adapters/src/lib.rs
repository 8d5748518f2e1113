//! Storyweave Adapters - infrastructure behind the gateway port
//!
//! `http` talks to the real story backend over REST; `testing` provides a
//! scriptable in-memory stand-in with the same observable semantics.

pub mod http;
pub mod testing;
