use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use ctc_dataprep::{
    DataCollator, DataPrepConfig, DataPrepError, DatasetBuilder, EncodedRecord, RawRecord,
};

#[derive(Debug, Parser)]
#[command(name = "prepare_dataset")]
#[command(about = "Prepare padded CTC training tensors from raw audio/text manifests")]
struct Args {
    #[arg(long, env = "DATAPREP_CONFIG", default_value = "config.json")]
    config: PathBuf,
    /// Assemble one collated batch per split after preprocessing, as a
    /// smoke test of the full record -> tensor path.
    #[arg(long)]
    collate_check: bool,
    #[arg(long, env = "DATAPREP_COLLATE_BATCH_SIZE", default_value_t = 8)]
    collate_batch_size: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), DataPrepError> {
    let started = Instant::now();
    let config = DataPrepConfig::load(&args.config)?;
    let builder = DatasetBuilder::new(config)?;
    let splits = builder.load()?;

    process_split(args, &builder, "train", splits.train)?;
    process_split(args, &builder, "devel", splits.devel)?;

    println!(
        "done in {:.1}s at {}",
        started.elapsed().as_secs_f64(),
        Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    );
    Ok(())
}

fn process_split(
    args: &Args,
    builder: &DatasetBuilder,
    split_name: &str,
    records: Vec<RawRecord>,
) -> Result<(), DataPrepError> {
    if records.is_empty() {
        println!("> {split_name}: no sources configured, skipping");
        return Ok(());
    }

    println!("> {split_name}: preprocessing {} records", records.len());
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("{split_name}: normalize / load / resample / encode"));
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));

    let encoded = builder.preprocess(records)?;
    spinner.finish_and_clear();

    let total_frames: usize = encoded.iter().map(|r| r.input_values.len()).sum();
    let total_labels: usize = encoded.iter().map(|r| r.labels.len()).sum();
    let seconds = total_frames as f64 / builder.config().sampling_rate as f64;
    println!(
        "> {split_name}: {} records, {total_frames} frames ({seconds:.1}s of audio), {total_labels} labels",
        encoded.len(),
    );

    if args.collate_check {
        collate_check(builder, split_name, &encoded, args.collate_batch_size)?;
    }
    Ok(())
}

fn collate_check(
    builder: &DatasetBuilder,
    split_name: &str,
    encoded: &[EncodedRecord],
    batch_size: usize,
) -> Result<(), DataPrepError> {
    let collator = DataCollator::new(builder.vocab().pad_id(), 0.0);
    let head = &encoded[..encoded.len().min(batch_size.max(1))];
    let batch = collator.collate(head)?;
    println!(
        "> {split_name}: collated batch input {:?}, mask {:?}, labels {:?}",
        batch.input_values.dims(),
        batch.attention_mask.dims(),
        batch.labels.dims(),
    );
    Ok(())
}
