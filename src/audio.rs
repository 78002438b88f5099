//! Audio output: a single media element backed by a rodio thread.
//!
//! [`AudioPlayer`] implements [`AudioOutput`] by forwarding commands to a
//! dedicated thread that downloads sources from the gateway, decodes them and
//! plays them through the default output device.

mod fetch;
mod player;
mod sink;
mod thread;
mod types;

pub use player::AudioPlayer;
pub use types::*;
