use clap::{Parser, Subcommand};
use elicit_gen::{config, freshness, generate, output};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "elicit-gen")]
#[command(about = "Generate elicitation method documents from a CSV source of truth")]
#[command(long_about = "\
Generate elicitation method documents from a CSV source of truth

The methods table and its YAML list files live in one data directory.
Generated Markdown is written next to them and stamped with a fingerprint
of the sources so staleness can be checked without regenerating.

Data directory:

  advanced-elicitation/
  ├── methods.csv                  # num, category, method_name, description, output_pattern
  ├── mapping.yaml                 # primary pools, quick pools, roles, category metadata
  ├── custom_lists.yaml            # user lists (optional)
  ├── primary_verify.md            # generated
  ├── primary_discover.md          # generated
  ├── ae_user_lists.md             # generated when custom lists exist
  ├── ae_by_categories/            # generated, one file per category
  └── ae_by_roles/                 # generated, one file per role

Run 'elicit-gen gen-config' to generate a documented elicit.toml.")]
#[command(version)]
struct Cli {
    /// Project root (where elicit.toml lives)
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log format: text (default) or json
    #[arg(long, default_value = "text", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Validate sources and write every document family
    Generate {
        /// Print the generation report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Report whether generated documents match the current sources
    Check {
        /// Print the freshness report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load and validate sources without writing anything
    Validate,
    /// Print a stock elicit.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            output::print_error(&*e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match &cli.command {
        Command::Generate { json } => {
            let config = config::load_config(&cli.root)?;
            init_thread_pool(&config.processing);
            let report = generate::generate(&cli.root, &config)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_generate_report(&report);
            }
        }
        Command::Check { json } => {
            let config = config::load_config(&cli.root)?;
            let report = freshness::check(&cli.root, &config);
            if *json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_freshness(&report);
            }
            if !report.is_fresh() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Validate => {
            let config = config::load_config(&cli.root)?;
            let validation = generate::validate_sources(&cli.root, &config)?;
            output::print_validation(&validation);
            if !validation.is_valid() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Logs go to stderr so stdout stays parseable with `--json`.
fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "elicit_gen=warn",
        1 => "elicit_gen=info",
        2 => "elicit_gen=debug",
        _ => "elicit_gen=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// Size the global rayon pool used for source reads and rendering.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
