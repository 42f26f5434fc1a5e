//! Playback host: ring buffer, cpal output and the block driver

pub mod buffer;
pub mod output;
pub mod player;

pub use buffer::AudioRingBuffer;
pub use output::{AudioError, AudioOutput, AudioDeviceInfo, list_output_devices};
pub use player::{StreamPlayer, PlayerConfig, PlaybackStatus};
