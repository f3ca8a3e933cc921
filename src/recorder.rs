use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};

const TARGET_RATE: u32 = 16000;

/// An open microphone stream and the samples it has captured so far.
///
/// The input device is held for as long as this value lives; dropping it
/// (or calling [`Capture::finish`]) stops the stream and releases the device.
pub struct Capture {
    stream: cpal::Stream,
    buffer: Arc<Mutex<Vec<f32>>>,
    sample_rate: u32,
}

impl Capture {
    /// Open the default input device and start capturing ~16kHz mono f32.
    pub fn start() -> Result<Self, Box<dyn std::error::Error>> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or("No input device found")?;

        log::info!("Input device: {:?}", device.description());

        let supported_configs: Vec<_> = device.supported_input_configs()?.collect();

        let desired = supported_configs.iter().find(|c| {
            c.channels() == 1
                && c.min_sample_rate() <= TARGET_RATE
                && c.max_sample_rate() >= TARGET_RATE
                && c.sample_format() == cpal::SampleFormat::F32
        });

        let (config, sample_rate, downsample_factor) = if let Some(cfg) = desired {
            (cfg.with_sample_rate(TARGET_RATE).config(), TARGET_RATE, 1usize)
        } else {
            let default_config = device.default_input_config()?;
            let rate = default_config.sample_rate();
            let factor = (rate / TARGET_RATE).max(1) as usize;
            let actual_rate = rate / factor as u32;
            log::info!("Using native rate {rate}Hz, downsampling by {factor}x to ~{actual_rate}Hz");
            (default_config.config(), actual_rate, factor)
        };

        let channels = config.channels as usize;
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let sink = buffer.clone();

        let stream = device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let Ok(mut buf) = sink.lock() else {
                    return;
                };
                for (i, frame) in data.chunks(channels).enumerate() {
                    if i % downsample_factor == 0 {
                        buf.push(frame.iter().sum::<f32>() / channels as f32);
                    }
                }
            },
            |err| log::error!("Input stream error: {err}"),
            None,
        )?;

        stream.play()?;
        Ok(Self {
            stream,
            buffer,
            sample_rate,
        })
    }

    /// Stop the stream, release the device and return the captured audio as WAV.
    pub fn finish(self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        let Capture {
            stream,
            buffer,
            sample_rate,
        } = self;
        drop(stream);

        let samples = std::mem::take(&mut *buffer.lock().map_err(|_| "audio buffer poisoned")?);
        log::info!(
            "Captured {} samples ({:.1}s at {}Hz)",
            samples.len(),
            samples.len() as f32 / sample_rate as f32,
            sample_rate
        );
        samples_to_wav(&samples, sample_rate)
    }
}

/// Convert f32 samples to WAV bytes (mono 16-bit PCM).
pub fn samples_to_wav(
    samples: &[f32],
    sample_rate: u32,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
    for &s in samples {
        let clamped = s.clamp(-1.0, 1.0);
        writer.write_sample((clamped * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_capture_is_header_only() {
        let wav = samples_to_wav(&[], TARGET_RATE).unwrap();
        assert_eq!(wav.len(), 44);
        assert!(wav.len() < 1000);
    }

    #[test]
    fn samples_are_clamped_pcm16() {
        let wav = samples_to_wav(&[0.0, 2.0, -2.0, 0.5], TARGET_RATE).unwrap();
        assert_eq!(wav.len(), 44 + 4 * 2);

        let mut reader = hound::WavReader::new(std::io::Cursor::new(wav)).unwrap();
        assert_eq!(reader.spec().sample_rate, TARGET_RATE);
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, vec![0, i16::MAX, -i16::MAX, i16::MAX / 2]);
    }

    #[test]
    fn one_second_of_audio_clears_default_threshold() {
        let wav = samples_to_wav(&vec![0.1; TARGET_RATE as usize], TARGET_RATE).unwrap();
        assert!(wav.len() >= 1000);
    }
}
