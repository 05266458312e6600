//! Sticker wall core library.

pub mod admin;
pub mod animation;
pub mod cache;
pub mod config;
pub mod geom;
pub mod loader;
pub mod physics;
pub mod registry;
pub mod render;
pub mod session;
pub mod sync;
pub mod world;

// Re-export commonly used types
pub use config::Config;
pub use session::WallSession;
pub use sync::{ChannelStatus, ReconnectPolicy};
