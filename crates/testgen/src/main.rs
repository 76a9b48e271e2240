use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use hcert_testgen::driver::{FRACTION_INVALID_CASES, FRACTION_VALID_CASES};
use hcert_testgen::{Corpus, Generator, GeneratorOptions, KeyStore, ValueSets};

#[derive(Parser)]
#[command(
    name = "hcert-testgen",
    about = "Generate labeled HCERT conformance test vectors"
)]
struct Args {
    /// Schema directory holding the `valuesets` subdirectory.
    #[arg(long, default_value = "ehn-dgc-schema")]
    schema_dir: PathBuf,

    /// Directory holding the `names` and `birthdates` corpora.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Directory holding the per-credential-type PEM key material.
    #[arg(long, default_value = "nl-dsc-keys")]
    keys_dir: PathBuf,

    /// RNG seed; the same seed reproduces the same corpus.
    #[arg(long)]
    seed: Option<u64>,

    /// Write the vector list here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Retention probability for fully valid cases.
    #[arg(long, default_value_t = FRACTION_VALID_CASES)]
    fraction_valid: f64,

    /// Retention probability for cases with invalid records.
    #[arg(long, default_value_t = FRACTION_INVALID_CASES)]
    fraction_invalid: f64,

    /// Skip the QR rendering stage.
    #[arg(long)]
    no_qr: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(err) = run(args) {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let value_sets = ValueSets::load_dir(&args.schema_dir.join("valuesets"))?;
    let corpus = Corpus::load(&args.data_dir)?;
    let keys = KeyStore::load(&args.keys_dir)?;

    log::info!(
        "loaded {} name and {} birthdate records",
        corpus.names.len(),
        corpus.birthdates.len()
    );

    let options = GeneratorOptions {
        fraction_valid: args.fraction_valid,
        fraction_invalid: args.fraction_invalid,
        render_qr: !args.no_qr,
        seed: args.seed,
    };
    let mut generator = Generator::new(value_sets, corpus, keys, options)?;
    let vectors = generator.run();
    log::info!("generated {} test vectors", vectors.len());

    match args.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, &vectors)?;
            writer.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, &vectors)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}
