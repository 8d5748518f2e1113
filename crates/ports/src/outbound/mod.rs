//! Outbound ports - dependencies of the application on the outside world

mod error;
mod gateway_port;

pub use error::GatewayError;
pub use gateway_port::{
    GatewayPort, ImageUpload, NavDirection, NavPosition, NewConversation, SavedAs,
    SavedConversation, SettingKey,
};
