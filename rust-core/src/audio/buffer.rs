//! Lock-free ring buffer carrying filtered chunks to the output callback

use ringbuf::{HeapRb, HeapConsumer, HeapProducer};

/// Single-producer, single-consumer playback buffer
pub struct AudioRingBuffer {
    producer: HeapProducer<f32>,
    consumer: HeapConsumer<f32>,
}

impl AudioRingBuffer {
    /// Create new ring buffer with given capacity
    ///
    /// # Arguments
    /// * `capacity` - Buffer capacity in samples (all channels)
    pub fn new(capacity: usize) -> Self {
        let rb = HeapRb::<f32>::new(capacity);
        let (producer, consumer) = rb.split();

        Self { producer, consumer }
    }

    /// Split into producer and consumer ends
    pub fn split(self) -> (AudioProducer, AudioConsumer) {
        (
            AudioProducer {
                producer: self.producer,
            },
            AudioConsumer {
                consumer: self.consumer,
            },
        )
    }
}

/// Producer end, owned by the block driver
pub struct AudioProducer {
    producer: HeapProducer<f32>,
}

impl AudioProducer {
    /// Write samples to buffer
    ///
    /// # Returns
    /// Number of samples actually written (may be less if buffer is full)
    pub fn write(&mut self, samples: &[f32]) -> usize {
        self.producer.push_slice(samples)
    }

    /// Check if buffer has space for n samples
    pub fn has_space(&self, n: usize) -> bool {
        self.producer.free_len() >= n
    }

    /// Samples written but not yet played
    pub fn queued(&self) -> usize {
        self.producer.len()
    }
}

/// Consumer end, owned by the output callback
pub struct AudioConsumer {
    consumer: HeapConsumer<f32>,
}

impl AudioConsumer {
    /// Read samples from buffer
    ///
    /// # Returns
    /// Number of samples actually read (may be less if buffer doesn't have enough)
    pub fn read(&mut self, buffer: &mut [f32]) -> usize {
        self.consumer.pop_slice(buffer)
    }

    /// Fill `out` completely, padding with silence on underrun
    ///
    /// # Returns
    /// Number of samples taken from the buffer
    pub fn read_or_silence(&mut self, out: &mut [f32]) -> usize {
        let read = self.consumer.pop_slice(out);
        out[read..].fill(0.0);
        read
    }

    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }

    /// Drop everything queued
    pub fn clear(&mut self) -> usize {
        self.consumer.skip(self.consumer.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_buffer_write_read() {
        let rb = AudioRingBuffer::new(1024);
        let (mut producer, mut consumer) = rb.split();

        let data = vec![0.1, 0.2, 0.3, 0.4, 0.5];
        let written = producer.write(&data);
        assert_eq!(written, 5);
        assert_eq!(producer.queued(), 5);

        let mut output = vec![0.0; 5];
        let read = consumer.read(&mut output);
        assert_eq!(read, 5);
        assert_eq!(output, data);
    }

    #[test]
    fn test_ring_buffer_overflow() {
        let rb = AudioRingBuffer::new(10);
        let (mut producer, _consumer) = rb.split();

        let written = producer.write(&[1.0; 20]);

        assert_eq!(written, 10);
        assert!(!producer.has_space(1));
    }

    #[test]
    fn test_underrun_pads_with_silence() {
        let rb = AudioRingBuffer::new(16);
        let (mut producer, mut consumer) = rb.split();
        producer.write(&[0.5, 0.5, 0.5]);

        let mut output = vec![1.0; 8];
        let read = consumer.read_or_silence(&mut output);

        assert_eq!(read, 3);
        assert_eq!(output, vec![0.5, 0.5, 0.5, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_clear_drops_queued_samples() {
        let rb = AudioRingBuffer::new(16);
        let (mut producer, mut consumer) = rb.split();
        producer.write(&[0.25; 12]);

        assert_eq!(consumer.clear(), 12);
        assert!(consumer.is_empty());
        assert!(producer.has_space(16));
    }
}
