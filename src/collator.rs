use candle_core::{Device, Tensor};

use crate::error::DataPrepError;
use crate::types::{Batch, EncodedRecord};

/// Sentinel written into padded label positions so the CTC loss skips them.
pub const LABEL_IGNORE_ID: i64 = -100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaddingStrategy {
    /// Pad to the longest sequence in the batch.
    #[default]
    Longest,
    /// Pad to the configured cap; a longer sequence is an error rather than
    /// silently truncated.
    MaxLength,
    /// No padding. Valid only when every sequence already has one length,
    /// since the output tensors cannot be ragged.
    DoNotPad,
}

/// Dynamically pads a batch of variable-length records into fixed-shape
/// tensors: inputs right-padded with the feature padding value plus an
/// attention mask, labels right-padded with the pad ID and then masked to
/// [`LABEL_IGNORE_ID`].
#[derive(Debug, Clone)]
pub struct DataCollator {
    pad_id: u32,
    padding_value: f32,
    padding: PaddingStrategy,
    max_length: Option<usize>,
    max_length_labels: Option<usize>,
    pad_to_multiple_of: Option<usize>,
    pad_to_multiple_of_labels: Option<usize>,
    device: Device,
}

impl DataCollator {
    pub fn new(pad_id: u32, padding_value: f32) -> Self {
        Self {
            pad_id,
            padding_value,
            padding: PaddingStrategy::Longest,
            max_length: None,
            max_length_labels: None,
            pad_to_multiple_of: None,
            pad_to_multiple_of_labels: None,
            device: Device::Cpu,
        }
    }

    pub fn with_padding(mut self, padding: PaddingStrategy) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn with_max_length_labels(mut self, max_length_labels: usize) -> Self {
        self.max_length_labels = Some(max_length_labels);
        self
    }

    pub fn with_pad_to_multiple_of(mut self, multiple: usize) -> Self {
        self.pad_to_multiple_of = Some(multiple);
        self
    }

    pub fn with_pad_to_multiple_of_labels(mut self, multiple: usize) -> Self {
        self.pad_to_multiple_of_labels = Some(multiple);
        self
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    pub fn collate(&self, records: &[EncodedRecord]) -> Result<Batch, DataPrepError> {
        if records.is_empty() {
            return Err(DataPrepError::EmptyBatch);
        }
        let rows = records.len();

        let input_lens: Vec<usize> = records.iter().map(|r| r.input_values.len()).collect();
        let label_lens: Vec<usize> = records.iter().map(|r| r.labels.len()).collect();
        let input_target =
            self.target_len(&input_lens, self.max_length, self.pad_to_multiple_of)?;
        let label_target =
            self.target_len(&label_lens, self.max_length_labels, self.pad_to_multiple_of_labels)?;

        let mut input_data = Vec::with_capacity(rows * input_target);
        let mut mask_data = Vec::with_capacity(rows * input_target);
        for record in records {
            let len = record.input_values.len();
            input_data.extend_from_slice(&record.input_values);
            input_data.extend(std::iter::repeat(self.padding_value).take(input_target - len));
            mask_data.extend(std::iter::repeat(1u32).take(len));
            mask_data.extend(std::iter::repeat(0u32).take(input_target - len));
        }

        // Labels are padded with the pad ID first, then every position whose
        // label mask is 0 is rewritten to the ignore sentinel.
        let mut label_data = Vec::with_capacity(rows * label_target);
        for record in records {
            let len = record.labels.len();
            let mut row: Vec<i64> = record.labels.iter().map(|&id| id as i64).collect();
            row.extend(std::iter::repeat(self.pad_id as i64).take(label_target - len));
            for (pos, value) in row.iter_mut().enumerate() {
                if pos >= len {
                    *value = LABEL_IGNORE_ID;
                }
            }
            label_data.extend(row);
        }

        let input_values = Tensor::from_vec(input_data, (rows, input_target), &self.device)
            .map_err(|e| DataPrepError::runtime("build input tensor", e))?;
        let attention_mask = Tensor::from_vec(mask_data, (rows, input_target), &self.device)
            .map_err(|e| DataPrepError::runtime("build attention mask tensor", e))?;
        let labels = Tensor::from_vec(label_data, (rows, label_target), &self.device)
            .map_err(|e| DataPrepError::runtime("build label tensor", e))?;

        Ok(Batch {
            input_values,
            attention_mask,
            labels,
        })
    }

    fn target_len(
        &self,
        lens: &[usize],
        cap: Option<usize>,
        multiple: Option<usize>,
    ) -> Result<usize, DataPrepError> {
        let longest = lens.iter().copied().max().unwrap_or(0);
        let mut target = match self.padding {
            PaddingStrategy::Longest => longest,
            PaddingStrategy::MaxLength => {
                let cap = cap.unwrap_or(longest);
                if longest > cap {
                    return Err(DataPrepError::runtime(
                        "collate",
                        format!("sequence length {longest} exceeds max length {cap}"),
                    ));
                }
                cap
            }
            PaddingStrategy::DoNotPad => {
                if lens.iter().any(|&len| len != longest) {
                    return Err(DataPrepError::runtime(
                        "collate",
                        "padding disabled but sequence lengths differ",
                    ));
                }
                longest
            }
        };
        if let Some(multiple) = multiple {
            if multiple > 0 {
                target = target.div_ceil(multiple) * multiple;
            }
        }
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAD_ID: u32 = 4;

    fn record(input_len: usize, labels: Vec<u32>) -> EncodedRecord {
        EncodedRecord {
            input_values: (0..input_len).map(|i| i as f32 * 0.1).collect(),
            labels,
        }
    }

    fn collator() -> DataCollator {
        DataCollator::new(PAD_ID, 0.0)
    }

    #[test]
    fn empty_batch_is_an_error() {
        let err = collator().collate(&[]).unwrap_err();
        assert!(matches!(err, DataPrepError::EmptyBatch));
    }

    #[test]
    fn pads_inputs_to_longest_with_mask() {
        let records = vec![record(3, vec![0]), record(5, vec![1])];
        let batch = collator().collate(&records).expect("collate");

        assert_eq!(batch.input_values.dims(), &[2, 5]);
        let mask: Vec<Vec<u32>> = batch.attention_mask.to_vec2().expect("mask to_vec2");
        assert_eq!(mask[0], vec![1, 1, 1, 0, 0]);
        assert_eq!(mask[1], vec![1, 1, 1, 1, 1]);

        let inputs: Vec<Vec<f32>> = batch.input_values.to_vec2().expect("inputs to_vec2");
        assert_eq!(inputs[0][3], 0.0);
        assert_eq!(inputs[0][4], 0.0);
    }

    #[test]
    fn mask_ones_count_equals_unpadded_length() {
        let records = vec![record(2, vec![0]), record(7, vec![1]), record(4, vec![0, 1])];
        let batch = collator().collate(&records).expect("collate");
        let mask: Vec<Vec<u32>> = batch.attention_mask.to_vec2().expect("mask to_vec2");
        for (row, record) in mask.iter().zip(&records) {
            let ones = row.iter().filter(|&&v| v == 1).count();
            assert_eq!(ones, record.input_values.len());
        }
    }

    #[test]
    fn padded_label_positions_hold_ignore_sentinel() {
        let records = vec![record(3, vec![0, 1, 0]), record(3, vec![1])];
        let batch = collator().collate(&records).expect("collate");

        let labels: Vec<Vec<i64>> = batch.labels.to_vec2().expect("labels to_vec2");
        assert_eq!(labels[0], vec![0, 1, 0]);
        assert_eq!(labels[1], vec![1, LABEL_IGNORE_ID, LABEL_IGNORE_ID]);
    }

    #[test]
    fn pad_to_multiple_of_rounds_target_up() {
        let records = vec![record(5, vec![0, 1, 0])];
        let batch = collator()
            .with_pad_to_multiple_of(4)
            .with_pad_to_multiple_of_labels(8)
            .collate(&records)
            .expect("collate");
        assert_eq!(batch.input_values.dims(), &[1, 8]);
        assert_eq!(batch.labels.dims(), &[1, 8]);
    }

    #[test]
    fn max_length_padding_uses_the_cap() {
        let records = vec![record(3, vec![0]), record(5, vec![0, 1])];
        let batch = collator()
            .with_padding(PaddingStrategy::MaxLength)
            .with_max_length(10)
            .with_max_length_labels(4)
            .collate(&records)
            .expect("collate");
        assert_eq!(batch.input_values.dims(), &[2, 10]);
        assert_eq!(batch.labels.dims(), &[2, 4]);
    }

    #[test]
    fn max_length_shorter_than_a_sequence_is_an_error() {
        let records = vec![record(5, vec![0])];
        let err = collator()
            .with_padding(PaddingStrategy::MaxLength)
            .with_max_length(3)
            .collate(&records)
            .unwrap_err();
        assert!(matches!(err, DataPrepError::Runtime { .. }));
    }

    #[test]
    fn do_not_pad_requires_uniform_lengths() {
        let uniform = vec![record(4, vec![0, 1]), record(4, vec![1, 0])];
        let batch = collator()
            .with_padding(PaddingStrategy::DoNotPad)
            .collate(&uniform)
            .expect("collate");
        assert_eq!(batch.input_values.dims(), &[2, 4]);

        let ragged = vec![record(4, vec![0]), record(5, vec![1])];
        let err = collator()
            .with_padding(PaddingStrategy::DoNotPad)
            .collate(&ragged)
            .unwrap_err();
        assert!(matches!(err, DataPrepError::Runtime { .. }));
    }
}
