use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::dataset::source::SourceSpec;
use crate::error::DataPrepError;

/// Immutable pipeline configuration, loaded once from a JSON file and
/// threaded by reference to every component. There is no process-wide
/// configuration state.
#[derive(Debug, Clone, Deserialize)]
pub struct DataPrepConfig {
    pub sampling_rate: u32,
    #[serde(default = "default_num_loader_workers")]
    pub num_loader_workers: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    pub vocab: VocabConfig,
    #[serde(default)]
    pub datasets: SplitSpecs,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VocabConfig {
    pub vocab_path: PathBuf,
    #[serde(default = "default_unk")]
    pub unk: String,
    #[serde(default = "default_blank")]
    pub blank: String,
    #[serde(default = "default_silence")]
    pub silence: String,
}

/// Manifest sources per split, concatenated in listed order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SplitSpecs {
    #[serde(default)]
    pub train: Vec<SourceSpec>,
    #[serde(default)]
    pub devel: Vec<SourceSpec>,
}

fn default_num_loader_workers() -> usize {
    1
}
fn default_batch_size() -> usize {
    8
}
fn default_unk() -> String {
    "<unk>".to_string()
}
fn default_blank() -> String {
    "<pad>".to_string()
}
fn default_silence() -> String {
    "|".to_string()
}

impl DataPrepConfig {
    pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 16_000;

    pub fn load(path: &Path) -> Result<Self, DataPrepError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| DataPrepError::io("read config file", e))?;
        serde_json::from_str(&data).map_err(|e| DataPrepError::json("parse config file", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_parses_with_defaults() {
        let json = r#"{
            "sampling_rate": 16000,
            "vocab": { "vocab_path": "vocab.json" }
        }"#;
        let config: DataPrepConfig = serde_json::from_str(json).expect("valid config json");
        assert_eq!(config.sampling_rate, 16_000);
        assert_eq!(config.num_loader_workers, 1);
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.vocab.unk, "<unk>");
        assert_eq!(config.vocab.blank, "<pad>");
        assert_eq!(config.vocab.silence, "|");
        assert!(config.datasets.train.is_empty());
        assert!(config.datasets.devel.is_empty());
    }

    #[test]
    fn config_parses_source_specs() {
        let json = r#"{
            "sampling_rate": 22050,
            "num_loader_workers": 4,
            "batch_size": 16,
            "vocab": {
                "vocab_path": "vocab.json",
                "unk": "<unk>",
                "blank": "<pad>",
                "silence": "|"
            },
            "datasets": {
                "train": [{
                    "name": "commonvoice",
                    "source_type": "csv",
                    "path": "train.csv",
                    "text_column": "sentence",
                    "path_column": "file"
                }],
                "devel": []
            }
        }"#;
        let config: DataPrepConfig = serde_json::from_str(json).expect("valid config json");
        assert_eq!(config.sampling_rate, 22_050);
        assert_eq!(config.num_loader_workers, 4);
        assert_eq!(config.datasets.train.len(), 1);
        assert_eq!(config.datasets.train[0].name, "commonvoice");
        assert_eq!(config.datasets.train[0].text_column, "sentence");
    }

    #[test]
    fn config_load_fails_on_missing_file() {
        let result = DataPrepConfig::load(Path::new("/nonexistent/config.json"));
        assert!(matches!(result, Err(DataPrepError::Io { .. })));
    }
}
