use crate::error::{ChapterizeError, Result};
use crate::transcription::{Transcript, TranscriptSegment};
use std::path::Path;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Speech-to-text engine wrapping whisper.cpp
pub struct WhisperEngine {
    ctx: WhisperContext,
}

impl WhisperEngine {
    pub fn new<P: AsRef<Path>>(model_path: P, use_gpu: bool) -> Result<Self> {
        let mut params = WhisperContextParameters::default();
        params.use_gpu = use_gpu;

        let ctx = WhisperContext::new_with_params(
            model_path.as_ref().to_str().unwrap_or_default(),
            params,
        )
        .map_err(|e| ChapterizeError::Transcription(format!("Failed to load model: {}", e)))?;

        Ok(Self { ctx })
    }

    /// Transcribe audio samples (must be 16kHz mono f32). Passing a
    /// language skips whisper's auto-detection.
    pub fn transcribe(&self, samples: &[f32], language: Option<&str>) -> Result<Transcript> {
        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| ChapterizeError::Transcription(format!("Failed to create state: {}", e)))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(language);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        state
            .full(params, samples)
            .map_err(|e| ChapterizeError::Transcription(format!("Transcription failed: {}", e)))?;

        let num_segments = state.full_n_segments();

        let mut segments = Vec::new();
        for i in 0..num_segments {
            if let Some(segment) = state.get_segment(i) {
                let text = segment.to_str_lossy().map_err(|e| {
                    ChapterizeError::Transcription(format!("Failed to get text: {}", e))
                })?;
                let start = segment.start_timestamp();
                let end = segment.end_timestamp();

                // Convert centiseconds to milliseconds
                segments.push(TranscriptSegment::new(
                    (start * 10) as u64,
                    (end * 10) as u64,
                    text.trim().to_string(),
                ));
            }
        }

        let mut transcript = Transcript::new(segments);
        transcript.language = language.map(String::from);
        Ok(transcript)
    }
}

/// Load a wav file as samples for the engine, rejecting anything but
/// 16kHz mono.
pub fn load_wav_samples<P: AsRef<Path>>(wav_path: P) -> Result<Vec<f32>> {
    let reader = hound::WavReader::open(wav_path.as_ref())
        .map_err(|e| ChapterizeError::Transcription(format!("Failed to open WAV: {}", e)))?;

    let spec = reader.spec();
    if spec.sample_rate != 16000 || spec.channels != 1 {
        return Err(ChapterizeError::Transcription(format!(
            "WAV must be 16kHz mono, got {}Hz {} channels",
            spec.sample_rate, spec.channels
        )));
    }

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.unwrap_or(0.0))
            .collect(),
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.unwrap_or(0) as f32 / scale)
                .collect()
        }
    };

    Ok(samples)
}
