//! Audio output playback using cpal
//!
//! Opens the output device with the asset's own channel count and sample
//! rate and drains the playback ring buffer from the device callback.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Device, SampleRate, Stream, StreamConfig};
use super::buffer::AudioConsumer;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No audio output device found")]
    NoDevice,

    #[error("Failed to get device name: {0}")]
    DeviceName(String),

    #[error("Failed to build stream: {0}")]
    BuildStream(String),

    #[error("Failed to play stream: {0}")]
    PlayStream(String),

    #[error("Streaming engine lock was poisoned")]
    EnginePoisoned,
}

/// Audio output device information
#[derive(Debug, Clone)]
pub struct AudioDeviceInfo {
    pub name: String,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Audio output stream
pub struct AudioOutput {
    stream: Stream,
    consumer: Arc<Mutex<AudioConsumer>>,
    device_info: AudioDeviceInfo,
}

impl AudioOutput {
    /// Create audio output on the default device
    ///
    /// # Arguments
    /// * `consumer` - Ring buffer consumer with interleaved samples
    /// * `channels` - Channel count of the streamed asset
    /// * `sample_rate` - Sample rate of the streamed asset
    pub fn from_default_device(
        consumer: AudioConsumer,
        channels: u16,
        sample_rate: u32,
    ) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoDevice)?;

        Self::from_device(device, consumer, channels, sample_rate)
    }

    /// Create audio output on a specific device
    pub fn from_device(
        device: Device,
        consumer: AudioConsumer,
        channels: u16,
        sample_rate: u32,
    ) -> Result<Self, AudioError> {
        let name = device
            .name()
            .map_err(|e| AudioError::DeviceName(e.to_string()))?;

        let device_info = AudioDeviceInfo {
            name,
            sample_rate,
            channels,
        };

        let stream_config = StreamConfig {
            channels,
            sample_rate: SampleRate(sample_rate),
            buffer_size: BufferSize::Default,
        };

        let consumer = Arc::new(Mutex::new(consumer));

        let consumer_clone = Arc::clone(&consumer);
        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    match consumer_clone.lock() {
                        Ok(mut cons) => {
                            cons.read_or_silence(data);
                        }
                        Err(_) => data.fill(0.0),
                    }
                },
                move |err| {
                    log::error!("Audio output error: {}", err);
                },
                None,
            )
            .map_err(|e| AudioError::BuildStream(e.to_string()))?;

        Ok(Self {
            stream,
            consumer,
            device_info,
        })
    }

    /// Start playing audio
    pub fn start(&self) -> Result<(), AudioError> {
        self.stream
            .play()
            .map_err(|e| AudioError::PlayStream(e.to_string()))
    }

    /// Pause audio playback
    pub fn pause(&self) -> Result<(), AudioError> {
        self.stream
            .pause()
            .map_err(|e| AudioError::PlayStream(e.to_string()))
    }

    /// Ring buffer end drained by the device callback
    pub fn consumer(&self) -> &Mutex<AudioConsumer> {
        &self.consumer
    }

    pub fn device_info(&self) -> &AudioDeviceInfo {
        &self.device_info
    }
}

/// List available audio output devices
pub fn list_output_devices() -> Result<Vec<AudioDeviceInfo>, AudioError> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    let device_iter = host
        .output_devices()
        .map_err(|e| AudioError::DeviceName(e.to_string()))?;

    for device in device_iter {
        if let Ok(name) = device.name() {
            if let Ok(config) = device.default_output_config() {
                devices.push(AudioDeviceInfo {
                    name,
                    sample_rate: config.sample_rate().0,
                    channels: config.channels(),
                });
            }
        }
    }

    Ok(devices)
}
