//! Storyweave Ports - the seams of the client
//!
//! `outbound` holds what the application needs from infrastructure (the
//! backend gateway); `inbound` holds what it offers its drivers (the render
//! collaborator's event stream).

pub mod inbound;
pub mod outbound;
