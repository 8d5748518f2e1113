//! Test infrastructure
//!
//! The fake gateway lives in the adapters layer, not ports: it is a
//! concrete implementation of a port trait and belongs next to the real
//! one it stands in for.

mod fake_gateway;

pub use fake_gateway::{FakeGateway, FakeOp, RecordedCall};
