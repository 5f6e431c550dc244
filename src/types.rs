use candle_core::Tensor;

/// A record as produced by a manifest source: the two designated columns
/// renamed to canonical names, every other column dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub text: String,
    pub audio_path: String,
}

/// Same shape as [`RawRecord`], but the transcript has been canonicalized
/// against the vocabulary's legal character set.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub text: String,
    pub audio_path: String,
}

#[derive(Debug, Clone)]
pub struct AudioRecord {
    pub speech: Vec<f32>,
    pub sampling_rate: u32,
    pub target_text: String,
}

/// Model-ready record: one scalar feature per input frame plus the label
/// ID sequence for the transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRecord {
    pub input_values: Vec<f32>,
    pub labels: Vec<u32>,
}

#[derive(Debug)]
pub struct Batch {
    /// f32 tensor of shape (batch, frames), right-padded with the feature
    /// padding value.
    pub input_values: Tensor,
    /// u32 tensor of shape (batch, frames); 1 for real frames, 0 for padding.
    pub attention_mask: Tensor,
    /// i64 tensor of shape (batch, label_len); padded positions hold -100 so
    /// the loss skips them.
    pub labels: Tensor,
}
