use std::collections::HashSet;
use std::path::Path;

use rayon::prelude::*;

use crate::audio::{load_audio, resample};
use crate::config::DataPrepConfig;
use crate::dataset::source::{load_source, SourceSpec};
use crate::error::DataPrepError;
use crate::features::FeatureExtractor;
use crate::text::normalize_transcript;
use crate::types::{AudioRecord, EncodedRecord, NormalizedRecord, RawRecord};
use crate::vocab::Vocabulary;

/// Owns the train/devel collections end to end: loads the configured
/// manifest sources, then drives the staged preprocessing pipeline
/// (normalize -> load audio -> resample -> encode) over a worker pool.
///
/// Every stage is a pure per-record transformation; the parallel maps
/// preserve input order and abort on the first failing record.
pub struct DatasetBuilder {
    config: DataPrepConfig,
    vocab: Vocabulary,
    extractor: FeatureExtractor,
    legal_characters: HashSet<char>,
    pool: rayon::ThreadPool,
}

impl std::fmt::Debug for DatasetBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetBuilder")
            .field("config", &self.config)
            .field("legal_characters", &self.legal_characters.len())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct DatasetSplits {
    pub train: Vec<RawRecord>,
    pub devel: Vec<RawRecord>,
}

impl DatasetBuilder {
    pub fn new(config: DataPrepConfig) -> Result<Self, DataPrepError> {
        let vocab = Vocabulary::load(&config.vocab.vocab_path, &config.vocab)?;
        let legal_characters = vocab.legal_characters();
        let extractor = FeatureExtractor::new(config.sampling_rate);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.num_loader_workers.max(1))
            .build()
            .map_err(|e| DataPrepError::runtime("build worker pool", e))?;
        Ok(Self {
            config,
            vocab,
            extractor,
            legal_characters,
            pool,
        })
    }

    pub fn config(&self) -> &DataPrepConfig {
        &self.config
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Load every configured source for both splits, concatenated in
    /// configuration order.
    pub fn load(&self) -> Result<DatasetSplits, DataPrepError> {
        Ok(DatasetSplits {
            train: self.load_split(&self.config.datasets.train)?,
            devel: self.load_split(&self.config.datasets.devel)?,
        })
    }

    pub fn load_split(&self, specs: &[SourceSpec]) -> Result<Vec<RawRecord>, DataPrepError> {
        let mut records = Vec::new();
        for spec in specs {
            let loaded = load_source(spec)?;
            tracing::info!(source = %spec.name, records = loaded.len(), "loaded manifest source");
            records.extend(loaded);
        }
        Ok(records)
    }

    /// Run the full preprocessing pipeline over one split, in the fixed
    /// stage order. Each stage consumes its input collection and returns a
    /// new one holding only what the next stage needs.
    pub fn preprocess(&self, records: Vec<RawRecord>) -> Result<Vec<EncodedRecord>, DataPrepError> {
        let normalized = self.normalize_texts(records);
        let audio = self.read_audio(normalized)?;
        let audio = self.resample_audio(audio)?;
        Ok(self.prepare_records(&audio))
    }

    fn normalize_texts(&self, records: Vec<RawRecord>) -> Vec<NormalizedRecord> {
        tracing::info!(records = records.len(), "normalizing transcripts");
        self.pool.install(|| {
            records
                .into_par_iter()
                .map(|record| NormalizedRecord {
                    text: normalize_transcript(&record.text, &self.legal_characters),
                    audio_path: record.audio_path,
                })
                .collect()
        })
    }

    fn read_audio(
        &self,
        records: Vec<NormalizedRecord>,
    ) -> Result<Vec<AudioRecord>, DataPrepError> {
        tracing::info!(records = records.len(), "loading audio");
        self.pool.install(|| {
            records
                .into_par_iter()
                .enumerate()
                .map(|(idx, record)| {
                    let (speech, sampling_rate) = load_audio(Path::new(&record.audio_path))
                        .map_err(|e| {
                            tracing::error!(
                                record = idx,
                                path = %record.audio_path,
                                "audio read failed"
                            );
                            e
                        })?;
                    Ok(AudioRecord {
                        speech,
                        sampling_rate,
                        target_text: record.text,
                    })
                })
                .collect()
        })
    }

    fn resample_audio(&self, records: Vec<AudioRecord>) -> Result<Vec<AudioRecord>, DataPrepError> {
        let target_rate = self.config.sampling_rate;
        tracing::info!(records = records.len(), target_rate, "resampling audio");
        self.pool.install(|| {
            records
                .into_par_iter()
                .enumerate()
                .map(|(idx, record)| {
                    if record.sampling_rate == target_rate {
                        return Ok(record);
                    }
                    let speech = resample(record.speech, record.sampling_rate, target_rate)
                        .map_err(|e| {
                            tracing::error!(
                                record = idx,
                                from_rate = record.sampling_rate,
                                to_rate = target_rate,
                                "resample failed"
                            );
                            e
                        })?;
                    Ok(AudioRecord {
                        speech,
                        sampling_rate: target_rate,
                        target_text: record.target_text,
                    })
                })
                .collect()
        })
    }

    fn prepare_records(&self, records: &[AudioRecord]) -> Vec<EncodedRecord> {
        tracing::info!(records = records.len(), "encoding features and labels");
        let batch_size = self.config.batch_size.max(1);
        let mut encoded = Vec::with_capacity(records.len());
        for chunk in records.chunks(batch_size) {
            encoded.extend(self.extractor.encode_batch(chunk, &self.vocab));
        }
        encoded
    }
}
