use crate::types::{AudioRecord, EncodedRecord};
use crate::vocab::Vocabulary;

/// Turns resampled audio and normalized transcripts into model-ready
/// numeric sequences. Feature size is 1: one scalar per input frame,
/// normalized to zero mean and unit variance over the whole utterance.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    sampling_rate_hz: u32,
    padding_value: f32,
    do_normalize: bool,
}

impl FeatureExtractor {
    pub fn new(sampling_rate_hz: u32) -> Self {
        Self {
            sampling_rate_hz,
            padding_value: 0.0,
            do_normalize: true,
        }
    }

    pub fn sampling_rate_hz(&self) -> u32 {
        self.sampling_rate_hz
    }

    /// Value the collator right-pads input features with.
    pub fn padding_value(&self) -> f32 {
        self.padding_value
    }

    pub fn encode_features(&self, samples: &[f32]) -> Vec<f32> {
        if !self.do_normalize {
            return samples.to_vec();
        }
        normalize_utterance(samples)
    }

    pub fn encode_record(&self, record: &AudioRecord, vocab: &Vocabulary) -> EncodedRecord {
        if record.sampling_rate != self.sampling_rate_hz {
            tracing::warn!(
                expected_rate_hz = self.sampling_rate_hz,
                actual_rate_hz = record.sampling_rate,
                "encoding audio at an unexpected sample rate"
            );
        }
        EncodedRecord {
            input_values: self.encode_features(&record.speech),
            labels: vocab.encode(&record.target_text),
        }
    }

    /// Encode many records in one call. Batching is a performance detail:
    /// per-record results are identical to [`Self::encode_record`].
    pub fn encode_batch(&self, records: &[AudioRecord], vocab: &Vocabulary) -> Vec<EncodedRecord> {
        records
            .iter()
            .map(|record| self.encode_record(record, vocab))
            .collect()
    }
}

fn normalize_utterance(samples: &[f32]) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }
    let n = samples.len() as f64;
    let mean = samples.iter().map(|&x| x as f64).sum::<f64>() / n;
    let var = samples
        .iter()
        .map(|&x| {
            let d = x as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    let std = var.sqrt().max(1e-7);
    samples
        .iter()
        .map(|&x| ((x as f64 - mean) / std) as f32)
        .collect()
}
