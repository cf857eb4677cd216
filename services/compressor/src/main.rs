//! grid-compress
//!
//! Round a gridded dataset to a controlled precision and store it as a
//! losslessly compressed Zarr store.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use compressor::{Compressor, CompressorConfig, JobConfig};
use grid_store::LosslessCodec;
use rounding::{ExclusionList, Precision, PrecisionSpec};

/// Lossy-then-lossless compression for gridded datasets
#[derive(Parser, Debug)]
#[command(name = "grid-compress")]
#[command(about = "Round gridded data to a bounded precision and write it compressed")]
struct Args {
    /// YAML job file; command-line flags override its values
    #[arg(short, long, env = "COMPRESS_JOB")]
    config: Option<PathBuf>,

    /// Input Zarr store (or NetCDF file with the `netcdf` feature)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output Zarr store
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Round every data variable to this many decimal places
    #[arg(short = 'd', long, allow_hyphen_values = true)]
    decimal_places: Option<i32>,

    /// Round every data variable to this many significant digits
    #[arg(short = 's', long)]
    significant_digits: Option<u32>,

    /// Per-variable precision as JSON, e.g. '{"UVEL": 2, "WVEL": {"nsd": 3}}'
    #[arg(long)]
    precision_map: Option<String>,

    /// Variables to leave unrounded (comma separated or repeated)
    #[arg(short = 'x', long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Round coordinate variables too
    #[arg(long)]
    include_coordinates: bool,

    /// Drop attributes of rounded variables
    #[arg(long)]
    drop_attrs: bool,

    /// Lossless codec: none, gzip, blosc_lz4, blosc_zstd
    #[arg(long, env = "ZARR_COMPRESSION")]
    codec: Option<LosslessCodec>,

    /// Replace an existing output store
    #[arg(long)]
    overwrite: bool,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON")]
    json_logs: bool,
}

fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // stdout carries the report
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);

    if args.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Everything a run needs, after merging the job file with the flags.
#[derive(Debug)]
struct Job {
    input: PathBuf,
    output: PathBuf,
    spec: PrecisionSpec,
    exclusions: Option<ExclusionList>,
    config: CompressorConfig,
}

fn resolve_job(args: &Args) -> Result<Job> {
    let file = args
        .config
        .as_ref()
        .map(JobConfig::load)
        .transpose()?;

    let mut config = CompressorConfig::from_env();
    if let Some(job) = &file {
        config = job.apply_to(config);
    }
    if args.include_coordinates {
        config.policy.include_coordinates = true;
    }
    if args.drop_attrs {
        config.keep_attrs = false;
    }
    if let Some(codec) = args.codec {
        config.store.codec = codec;
    }
    if args.overwrite {
        config.store.overwrite = true;
    }

    let input = match (&args.input, &file) {
        (Some(path), _) => path.clone(),
        (None, Some(job)) => job.input.clone(),
        (None, None) => bail!("no input given: pass --input or a job file"),
    };
    let output = match (&args.output, &file) {
        (Some(path), _) => path.clone(),
        (None, Some(job)) => job.output.clone(),
        (None, None) => bail!("no output given: pass --output or a job file"),
    };

    let spec = match (cli_precision(args)?, &file) {
        (Some(spec), _) => spec,
        (None, Some(job)) => job.precision_spec()?,
        (None, None) => bail!(
            "no precision given: pass --decimal-places, --significant-digits or --precision-map"
        ),
    };

    let exclusions = if args.exclude.is_empty() {
        file.as_ref().and_then(JobConfig::exclusions)
    } else {
        Some(ExclusionList::from(args.exclude.clone()))
    };

    Ok(Job {
        input,
        output,
        spec,
        exclusions,
        config,
    })
}

/// The precision flags, of which at most one may be given.
fn cli_precision(args: &Args) -> Result<Option<PrecisionSpec>> {
    let given = [
        args.decimal_places.is_some(),
        args.significant_digits.is_some(),
        args.precision_map.is_some(),
    ]
    .iter()
    .filter(|&&set| set)
    .count();
    if given > 1 {
        bail!("--decimal-places, --significant-digits and --precision-map are mutually exclusive");
    }

    if let Some(d) = args.decimal_places {
        return Ok(Some(PrecisionSpec::from(d)));
    }
    if let Some(n) = args.significant_digits {
        return Ok(Some(PrecisionSpec::from(Precision::SignificantDigits(n))));
    }
    if let Some(map) = &args.precision_map {
        let value: serde_json::Value =
            serde_json::from_str(map).context("--precision-map is not valid JSON")?;
        return Ok(Some(PrecisionSpec::from_json(&value)?));
    }
    Ok(None)
}

fn run(args: Args) -> Result<()> {
    let job = resolve_job(&args)?;

    info!(
        input = %job.input.display(),
        output = %job.output.display(),
        codec = %job.config.store.codec,
        "Starting compression"
    );

    let compressor = Compressor::new(job.config);
    let report = compressor
        .compress_file(&job.input, &job.output, &job.spec, job.exclusions.as_ref())
        .with_context(|| format!("Failed to compress {}", job.input.display()))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
