//! WAV decoding with hound
//!
//! Every supported format is converted to interleaved 16-bit PCM.

use crate::error::EngineError;
use crate::stream::AudioAsset;
use hound::{SampleFormat, WavReader};
use std::io::Read;
use std::path::Path;

/// Load a WAV file into an [`AudioAsset`]
pub fn load_wav<P: AsRef<Path>>(path: P) -> Result<AudioAsset, EngineError> {
    let path = path.as_ref();
    log::debug!("Decoding WAV file: {}", path.display());

    let reader = WavReader::open(path)?;
    decode(reader)
}

/// Decode WAV data from any reader
pub fn read_wav<R: Read>(source: R) -> Result<AudioAsset, EngineError> {
    decode(WavReader::new(source)?)
}

fn decode<R: Read>(mut reader: WavReader<R>) -> Result<AudioAsset, EngineError> {
    let spec = reader.spec();

    let samples: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 16) => reader.samples::<i16>().collect::<Result<_, _>>()?,
        (SampleFormat::Int, bits @ 1..=32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| rescale_int(v, bits)))
            .collect::<Result<_, _>>()?,
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .map(|s| s.map(float_to_i16))
            .collect::<Result<_, _>>()?,
        (format, bits) => {
            return Err(EngineError::UnsupportedFormat(format!(
                "{:?} with {} bits per sample",
                format, bits
            )))
        }
    };

    AudioAsset::new(samples, spec.channels, spec.sample_rate)
}

/// Shift a signed integer sample of width `bits` to 16 bits
fn rescale_int(value: i32, bits: u16) -> i16 {
    if bits > 16 {
        (value >> (bits - 16)) as i16
    } else {
        (value << (16 - bits)) as i16
    }
}

fn float_to_i16(value: f32) -> i16 {
    (value as f64 * i16::MAX as f64)
        .round()
        .clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};
    use std::io::Cursor;

    fn encode<F>(spec: WavSpec, write: F) -> Vec<u8>
    where
        F: FnOnce(&mut WavWriter<&mut Cursor<Vec<u8>>>),
    {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            write(&mut writer);
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_read_16_bit_stereo() {
        let spec = WavSpec {
            channels: 2,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let bytes = encode(spec, |w| {
            for s in [1i16, -1, 1000, -1000, i16::MAX, i16::MIN] {
                w.write_sample(s).unwrap();
            }
        });

        let asset = read_wav(Cursor::new(bytes)).unwrap();

        assert_eq!(asset.channels(), 2);
        assert_eq!(asset.sample_rate(), 44100);
        assert_eq!(asset.samples(), &[1, -1, 1000, -1000, i16::MAX, i16::MIN]);
    }

    #[test]
    fn test_read_24_bit_rescales() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 24,
            sample_format: SampleFormat::Int,
        };
        let bytes = encode(spec, |w| {
            for s in [256i32, -256, 8_388_607, -8_388_608] {
                w.write_sample(s).unwrap();
            }
        });

        let asset = read_wav(Cursor::new(bytes)).unwrap();

        assert_eq!(asset.samples(), &[1, -1, i16::MAX, i16::MIN]);
    }

    #[test]
    fn test_read_float_saturates() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 22050,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let bytes = encode(spec, |w| {
            for s in [0.0f32, 0.5, -0.5, 1.0, 2.0, -2.0] {
                w.write_sample(s).unwrap();
            }
        });

        let asset = read_wav(Cursor::new(bytes)).unwrap();

        assert_eq!(asset.samples(), &[0, 16384, -16384, i16::MAX, i16::MAX, i16::MIN]);
    }

    #[test]
    fn test_empty_wav_is_rejected() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let bytes = encode(spec, |_| {});

        assert!(matches!(read_wav(Cursor::new(bytes)), Err(EngineError::EmptyAsset)));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let result = read_wav(Cursor::new(b"definitely not a wav file".to_vec()));
        assert!(matches!(result, Err(EngineError::Wav(_))));
    }

    #[test]
    fn test_load_from_disk() {
        let path = std::env::temp_dir().join(format!("fft_stream_wav_{}.wav", std::process::id()));
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        {
            let mut writer = WavWriter::create(&path, spec).unwrap();
            for i in 0..100i16 {
                writer.write_sample(i).unwrap();
            }
            writer.finalize().unwrap();
        }

        let asset = load_wav(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(asset.samples().len(), 100);
        assert_eq!(asset.samples()[42], 42);
        assert!(load_wav(&path).is_err());
    }
}
