//! Playback host for the streaming filter
//!
//! A driver thread pulls filtered blocks from the engine whenever the ring
//! buffer has room for one, while the cpal callback drains the ring buffer
//! at the device's pace. Control calls (cutoffs, seek) lock the engine, so
//! they always land between two block calls.

use crate::audio::buffer::{AudioConsumer, AudioProducer, AudioRingBuffer};
use crate::audio::output::{AudioError, AudioOutput};
use crate::stream::{AudioAsset, FftAudioStream, SharedSnapshots, StreamState};
use cpal::Sample;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Playback status as seen by the control side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Stopped,
    Paused,
    Playing,
}

/// Player configuration
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Ring buffer capacity in blocks
    pub ring_blocks: usize,

    /// Driver sleep when the ring buffer is full
    pub idle_sleep: Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            ring_blocks: 4,
            idle_sleep: Duration::from_millis(1),
        }
    }
}

/// Real-time player around an [`FftAudioStream`]
pub struct StreamPlayer {
    engine: Arc<Mutex<FftAudioStream>>,
    snapshots: SharedSnapshots,
    config: PlayerConfig,
    output: Option<AudioOutput>,
    driver: Option<JoinHandle<()>>,
    running: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    paused: bool,
}

impl StreamPlayer {
    pub fn new(engine: FftAudioStream, config: PlayerConfig) -> Self {
        let snapshots = SharedSnapshots::new(engine.block_size());
        Self {
            engine: Arc::new(Mutex::new(engine)),
            snapshots,
            config,
            output: None,
            driver: None,
            running: Arc::new(AtomicBool::new(false)),
            finished: Arc::new(AtomicBool::new(false)),
            paused: false,
        }
    }

    /// Start or resume playback
    ///
    /// # Returns
    /// Name of the output device
    pub fn play(&mut self) -> Result<String, AudioError> {
        if self.status() == PlaybackStatus::Stopped {
            // Stream ran out on its own: tear down before restarting
            self.shutdown();
        }

        if let Some(output) = &self.output {
            if self.paused {
                output.start()?;
                self.paused = false;
            }
            return Ok(output.device_info().name.clone());
        }

        let (block_size, channels, sample_rate) = self.with_engine(|engine| {
            if engine.is_finished() {
                engine.seek(0.0);
            }
            (engine.block_size(), engine.channel_count(), engine.sample_rate())
        })?;

        let rb = AudioRingBuffer::new(block_size * self.config.ring_blocks.max(1));
        let (producer, consumer) = rb.split();

        let output = AudioOutput::from_default_device(consumer, channels, sample_rate)?;
        output.start()?;
        let device_name = output.device_info().name.clone();

        self.running.store(true, Ordering::SeqCst);
        self.finished.store(false, Ordering::SeqCst);

        let engine = Arc::clone(&self.engine);
        let snapshots = self.snapshots.clone();
        let running = Arc::clone(&self.running);
        let finished = Arc::clone(&self.finished);
        let idle_sleep = self.config.idle_sleep;

        self.driver = Some(std::thread::spawn(move || {
            run_driver(&engine, producer, &snapshots, &running, idle_sleep);
            finished.store(true, Ordering::SeqCst);
        }));
        self.output = Some(output);
        self.paused = false;

        log::info!(
            "Playback started on {} ({} ch @ {} Hz, block {})",
            device_name,
            channels,
            sample_rate,
            block_size
        );

        Ok(device_name)
    }

    /// Pause playback, keeping the position
    pub fn pause(&mut self) -> Result<(), AudioError> {
        if self.status() != PlaybackStatus::Playing {
            return Ok(());
        }
        if let Some(output) = &self.output {
            output.pause()?;
        }
        self.paused = true;
        Ok(())
    }

    /// Toggle between playing and paused/stopped
    pub fn toggle(&mut self) -> Result<PlaybackStatus, AudioError> {
        if self.status() == PlaybackStatus::Playing {
            self.pause()?;
        } else {
            self.play()?;
        }
        Ok(self.status())
    }

    /// Stop playback and rewind to the start
    pub fn stop(&mut self) {
        let was_active = self.driver.is_some();
        self.shutdown();
        if let Ok(mut engine) = self.engine.lock() {
            engine.seek(0.0);
        }
        if was_active {
            log::info!("Playback stopped");
        }
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.driver.take() {
            let _ = handle.join();
        }

        if let Some(output) = self.output.take() {
            let _ = output.pause();
        }

        self.finished.store(false, Ordering::SeqCst);
        self.paused = false;
    }

    pub fn status(&self) -> PlaybackStatus {
        if self.driver.is_none() || self.finished.load(Ordering::SeqCst) {
            PlaybackStatus::Stopped
        } else if self.paused {
            PlaybackStatus::Paused
        } else {
            PlaybackStatus::Playing
        }
    }

    /// Replace the streamed asset
    ///
    /// Playback stops and the output device is released; the next
    /// [`play`](Self::play) reopens it at the new asset's channel count and
    /// sample rate.
    pub fn load(&mut self, asset: AudioAsset) -> Result<(), AudioError> {
        self.shutdown();

        let (channels, sample_rate) = self.with_engine(|engine| {
            engine.reload(asset);
            self.snapshots.publish(engine.snapshots());
            (engine.channel_count(), engine.sample_rate())
        })?;

        log::info!("Loaded new asset ({} ch @ {} Hz)", channels, sample_rate);
        Ok(())
    }

    /// Seek to `seconds`; samples already queued for the device are dropped
    pub fn seek(&self, seconds: f64) -> Result<(), AudioError> {
        let queued = self.output.as_ref().map(AudioOutput::consumer);
        seek_and_flush(&self.engine, seconds, queued).map(|_| ())
    }

    pub fn set_low(&self, low: f64) -> Result<(), AudioError> {
        self.with_engine(|engine| engine.set_low(low))
    }

    pub fn set_high(&self, high: f64) -> Result<(), AudioError> {
        self.with_engine(|engine| engine.set_high(high))
    }

    /// Run `f` against the engine between two block calls
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut FftAudioStream) -> R) -> Result<R, AudioError> {
        let mut engine = self.engine.lock().map_err(|_| AudioError::EnginePoisoned)?;
        Ok(f(&mut engine))
    }

    /// Handle to the snapshots published after every block
    pub fn snapshots(&self) -> SharedSnapshots {
        self.snapshots.clone()
    }
}

impl Drop for StreamPlayer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Pull blocks until the stream ends and the ring buffer has drained, or
/// until `running` is cleared
fn run_driver(
    engine: &Mutex<FftAudioStream>,
    mut producer: AudioProducer,
    snapshots: &SharedSnapshots,
    running: &AtomicBool,
    idle_sleep: Duration,
) {
    let mut frame = Vec::new();
    let mut draining = false;

    while running.load(Ordering::SeqCst) {
        if draining {
            if producer.queued() == 0 {
                break;
            }
            std::thread::sleep(idle_sleep);
            continue;
        }

        match pump_block(engine, &mut producer, &mut frame, snapshots) {
            Ok(Some(StreamState::Continue)) => {}
            Ok(Some(StreamState::EndOfStream)) => {
                log::debug!("End of stream reached");
                draining = true;
            }
            Ok(None) => std::thread::sleep(idle_sleep),
            Err(e) => {
                log::error!("Playback driver stopped: {}", e);
                break;
            }
        }
    }
}

/// Move the engine to `seconds` and drop what is still queued for the device
///
/// Both happen under the engine lock, so the driver cannot queue a block
/// from the old position in between.
///
/// # Returns
/// Number of queued samples dropped
fn seek_and_flush(
    engine: &Mutex<FftAudioStream>,
    seconds: f64,
    queued: Option<&Mutex<AudioConsumer>>,
) -> Result<usize, AudioError> {
    let mut engine = engine.lock().map_err(|_| AudioError::EnginePoisoned)?;
    engine.seek(seconds);

    let dropped = queued
        .and_then(|consumer| consumer.lock().ok().map(|mut c| c.clear()))
        .unwrap_or(0);
    if dropped > 0 {
        log::debug!("Seek dropped {} queued samples", dropped);
    }
    Ok(dropped)
}

/// Process one block if the ring buffer can take it
///
/// The engine stays locked until the chunk is queued, so a concurrent seek
/// can flush the device without racing a stale block.
///
/// # Returns
/// `None` if there was no room for a full block
fn pump_block(
    engine: &Mutex<FftAudioStream>,
    producer: &mut AudioProducer,
    frame: &mut Vec<f32>,
    snapshots: &SharedSnapshots,
) -> Result<Option<StreamState>, AudioError> {
    let mut engine = engine.lock().map_err(|_| AudioError::EnginePoisoned)?;

    if !producer.has_space(engine.block_size()) {
        return Ok(None);
    }

    let deadline = engine.block_duration_seconds();
    let started = Instant::now();

    let chunk = engine.process_block();
    let state = chunk.state;
    frame.clear();
    frame.extend(chunk.samples.iter().map(|&s| s.to_sample::<f32>()));

    let elapsed = started.elapsed().as_secs_f64();
    if elapsed > deadline {
        log::warn!(
            "Block took {:.3} ms, exceeding its {:.3} ms playback time",
            elapsed * 1e3,
            deadline * 1e3
        );
    }

    snapshots.publish(engine.snapshots());
    producer.write(&frame[..]);

    Ok(Some(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{AudioAsset, EngineConfig};

    fn engine(samples: Vec<i16>, block_size: usize) -> Mutex<FftAudioStream> {
        let asset = AudioAsset::new(samples, 1, 44100).unwrap();
        Mutex::new(FftAudioStream::load(asset, EngineConfig::with_block_size(block_size)).unwrap())
    }

    #[test]
    fn test_pump_respects_ring_capacity() {
        let engine = engine(vec![0; 2500], 1024);
        let snapshots = SharedSnapshots::new(1024);
        let (mut producer, mut consumer) = AudioRingBuffer::new(2048).split();
        let mut frame = Vec::new();

        let first = pump_block(&engine, &mut producer, &mut frame, &snapshots).unwrap();
        let second = pump_block(&engine, &mut producer, &mut frame, &snapshots).unwrap();
        let blocked = pump_block(&engine, &mut producer, &mut frame, &snapshots).unwrap();

        assert_eq!(first, Some(StreamState::Continue));
        assert_eq!(second, Some(StreamState::Continue));
        assert_eq!(blocked, None);
        assert_eq!(producer.queued(), 2048);
        assert_eq!(engine.lock().unwrap().offset(), 2048);

        let mut sink = vec![0.0; 1024];
        consumer.read(&mut sink);

        let last = pump_block(&engine, &mut producer, &mut frame, &snapshots).unwrap();
        assert_eq!(last, Some(StreamState::EndOfStream));
        assert_eq!(producer.queued(), 1024 + 452);
        assert_eq!(snapshots.sequence(), 3);
    }

    #[test]
    fn test_pump_queues_filtered_samples() {
        let n = 256;
        let samples: Vec<i16> = (0..n)
            .map(|i| (6000.0 * (2.0 * std::f64::consts::PI * 5.0 * i as f64 / n as f64).sin()) as i16)
            .collect();
        let engine = engine(samples, n);
        let snapshots = SharedSnapshots::new(n);
        let (mut producer, mut consumer) = AudioRingBuffer::new(n).split();
        let mut frame = Vec::new();

        pump_block(&engine, &mut producer, &mut frame, &snapshots).unwrap();

        let mut played = vec![0.0f32; n];
        assert_eq!(consumer.read(&mut played), n);

        let guard = engine.lock().unwrap();
        for (&p, &s) in played.iter().zip(guard.samples()) {
            assert_eq!(p, s.to_sample::<f32>());
        }

        let published = snapshots.latest();
        assert_eq!(published.sequence, guard.blocks_processed());
        assert_eq!(published.filtered_wave, guard.filtered_wave());
    }

    #[test]
    fn test_driver_streams_whole_asset() {
        let total = 5000;
        let engine = Arc::new(engine(vec![0; total], 256));
        let snapshots = SharedSnapshots::new(256);
        let running = Arc::new(AtomicBool::new(true));
        let (producer, mut consumer) = AudioRingBuffer::new(512).split();

        let handle = {
            let engine = Arc::clone(&engine);
            let snapshots = snapshots.clone();
            let running = Arc::clone(&running);
            std::thread::spawn(move || {
                run_driver(&engine, producer, &snapshots, &running, Duration::from_micros(100));
            })
        };

        let mut received = 0;
        let mut buf = vec![0.0f32; 128];
        let started = Instant::now();
        while !handle.is_finished() && started.elapsed() < Duration::from_secs(10) {
            received += consumer.read(&mut buf);
            std::thread::yield_now();
        }
        running.store(false, Ordering::SeqCst);
        handle.join().unwrap();
        received += consumer.read(&mut buf);

        assert_eq!(received, total);
        assert!(engine.lock().unwrap().is_finished());
        assert_eq!(snapshots.sequence(), ((total + 255) / 256) as u64);
    }

    #[test]
    fn test_driver_stops_when_cleared() {
        let engine = engine(vec![0; 100_000], 256);
        let snapshots = SharedSnapshots::new(256);
        let running = AtomicBool::new(false);
        let (producer, _consumer) = AudioRingBuffer::new(1024).split();

        run_driver(&engine, producer, &snapshots, &running, Duration::from_micros(100));

        assert_eq!(engine.lock().unwrap().offset(), 0);
        assert_eq!(snapshots.sequence(), 0);
    }

    #[test]
    fn test_player_starts_stopped() {
        let asset = AudioAsset::new(vec![0; 4096], 2, 48000).unwrap();
        let stream = FftAudioStream::load(asset, EngineConfig::default()).unwrap();
        let mut player = StreamPlayer::new(stream, PlayerConfig::default());

        assert_eq!(player.status(), PlaybackStatus::Stopped);
        assert!(player.pause().is_ok());
        assert_eq!(player.status(), PlaybackStatus::Stopped);

        player.set_low(10.0).unwrap();
        player.set_high(1000.0).unwrap();
        player.seek(0.01).unwrap();

        let (low, high, offset) = player
            .with_engine(|e| (e.low(), e.high(), e.offset()))
            .unwrap();
        assert_eq!(low, 10.0);
        assert_eq!(high, 256.0);
        assert_eq!(offset, 960);

        player.stop();
        assert_eq!(player.with_engine(|e| e.offset()).unwrap(), 0);
    }

    #[test]
    fn test_seek_drops_queued_samples() {
        let engine = engine(vec![0; 8192], 1024);
        let snapshots = SharedSnapshots::new(1024);
        let (mut producer, consumer) = AudioRingBuffer::new(4096).split();
        let consumer = Mutex::new(consumer);
        let mut frame = Vec::new();

        pump_block(&engine, &mut producer, &mut frame, &snapshots).unwrap();
        pump_block(&engine, &mut producer, &mut frame, &snapshots).unwrap();
        assert_eq!(producer.queued(), 2048);

        let dropped = seek_and_flush(&engine, 0.0, Some(&consumer)).unwrap();

        assert_eq!(dropped, 2048);
        assert!(consumer.lock().unwrap().is_empty());
        assert_eq!(engine.lock().unwrap().offset(), 0);

        pump_block(&engine, &mut producer, &mut frame, &snapshots).unwrap();
        assert_eq!(producer.queued(), 1024);
        assert_eq!(engine.lock().unwrap().offset(), 1024);
    }

    #[test]
    fn test_seek_without_output_only_moves() {
        let engine = engine(vec![0; 44100], 1024);

        let dropped = seek_and_flush(&engine, 0.5, None).unwrap();

        assert_eq!(dropped, 0);
        assert_eq!(engine.lock().unwrap().offset(), 22050);
    }

    #[test]
    fn test_load_replaces_asset_and_format() {
        let asset = AudioAsset::new(vec![100; 4096], 1, 44100).unwrap();
        let stream = FftAudioStream::load(asset, EngineConfig::with_block_size(1024)).unwrap();
        let mut player = StreamPlayer::new(stream, PlayerConfig::default());

        player
            .with_engine(|e| {
                e.set_low(20.0);
                e.process_block();
            })
            .unwrap();
        player.seek(0.05).unwrap();

        let next = AudioAsset::new(vec![7; 6000], 2, 22050).unwrap();
        player.load(next).unwrap();

        assert_eq!(player.status(), PlaybackStatus::Stopped);
        assert!(player.output.is_none());
        assert!(player.driver.is_none());

        let (channels, rate, count, offset, low, blocks) = player
            .with_engine(|e| {
                (
                    e.channel_count(),
                    e.sample_rate(),
                    e.sample_count(),
                    e.offset(),
                    e.low(),
                    e.blocks_processed(),
                )
            })
            .unwrap();
        assert_eq!((channels, rate, count), (2, 22050, 6000));
        assert_eq!(offset, 0);
        assert_eq!(low, 0.0);
        assert_eq!(blocks, 0);
        assert_eq!(player.snapshots().sequence(), 0);
    }
}
