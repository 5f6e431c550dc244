pub mod audio;
pub mod collator;
pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod text;
pub mod types;
pub mod vocab;

pub use collator::{DataCollator, PaddingStrategy, LABEL_IGNORE_ID};
pub use config::{DataPrepConfig, SplitSpecs, VocabConfig};
pub use dataset::builder::{DatasetBuilder, DatasetSplits};
pub use dataset::source::{load_source, SourceSpec};
pub use error::DataPrepError;
pub use features::FeatureExtractor;
pub use text::normalize_transcript;
pub use types::{AudioRecord, Batch, EncodedRecord, NormalizedRecord, RawRecord};
pub use vocab::Vocabulary;
