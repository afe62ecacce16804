//! CLI argument parsing

mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use streambench_auth::{AuthConfig, AuthType};
use streambench_core::{StepSchedule, DEFAULT_MODEL};
use streambench_report::OutputFormat;

pub use commands::execute;

/// Concurrency load tester for streaming LLM inference endpoints
#[derive(Parser, Debug)]
#[command(name = "streambench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one benchmark, or probe for the concurrency limit with --adaptive
    Run(RunArgs),
    /// Run a fixed list of (requests, concurrency) levels back to back
    Sweep(SweepArgs),
}

/// Endpoint, credentials, prompts and output, shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// URL of the OpenAI-compatible server (`/v1` is appended if missing)
    #[arg(long)]
    pub llm_url: String,

    /// API key; `default` means none
    #[arg(long, env = "API_KEY", default_value = "default", hide_env_values = true)]
    pub api_key: String,

    /// Model name
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Use the long-context prompt corpus
    #[arg(long)]
    pub use_long_context: bool,

    /// Authentication strategy (auto, bearer, basic, none)
    #[arg(long, default_value = "auto")]
    pub auth_type: AuthType,

    /// Username for HTTP basic auth
    #[arg(long)]
    pub basic_auth_user: Option<String>,

    /// Password for HTTP basic auth
    #[arg(long)]
    pub basic_auth_password: Option<String>,

    /// Verbatim Authorization header value (e.g. 'Basic xxxx')
    #[arg(long)]
    pub auth_header: Option<String>,

    /// Text file with one prompt per line, replacing the bundled short prompts
    #[arg(long)]
    pub prompt_file: Option<PathBuf>,

    /// What to print (line, json, both)
    #[arg(long, default_value = "line")]
    pub output_format: OutputFormat,

    /// Also write results as JSON to this file
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl CommonArgs {
    /// Credentials as given on the command line
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            auth_type: self.auth_type,
            api_key: Some(self.api_key.clone()),
            basic_auth_user: self.basic_auth_user.clone(),
            basic_auth_password: self.basic_auth_password.clone(),
            auth_header: self.auth_header.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Number of requests to send
    #[arg(long, required_unless_present = "adaptive")]
    pub num_requests: Option<usize>,

    /// Number of concurrent requests
    #[arg(long, required_unless_present = "adaptive")]
    pub concurrency: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub request_timeout: u64,

    /// Maximum output tokens per request
    #[arg(long, default_value_t = 50)]
    pub output_tokens: u32,

    /// Climb concurrency until the success rate drops below the floor
    #[arg(long)]
    pub adaptive: bool,

    /// Success-rate floor for --adaptive (0..=1)
    #[arg(long, default_value_t = 0.95)]
    pub floor_success_rate: f64,

    /// Highest concurrency --adaptive may try
    #[arg(long, default_value_t = 300)]
    pub max_concurrency: usize,

    /// Concurrency of the first --adaptive level
    #[arg(long, default_value_t = 1)]
    pub initial_concurrency: usize,

    /// Concurrency increment below 50; larger levels use wider steps
    #[arg(long, default_value_t = 5)]
    pub initial_step: usize,

    /// Requests per unit of concurrency at each --adaptive level
    #[arg(long, default_value_t = 2)]
    pub requests_per_concurrency: usize,

    /// Pause between --adaptive levels in seconds
    #[arg(long, default_value_t = 5)]
    pub cooldown: u64,
}

impl RunArgs {
    /// Default banded schedule starting at `--initial-step`
    ///
    /// Bands with a smaller step than the requested start are dropped so the
    /// probe never slows down as concurrency grows.
    pub fn step_schedule(&self) -> StepSchedule {
        StepSchedule::default().with_initial_step(self.initial_step)
    }
}

/// One sweep level given as `REQUESTS:CONCURRENCY`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelArg {
    pub request_count: usize,
    pub concurrency: usize,
}

fn parse_level(s: &str) -> Result<LevelArg, String> {
    let (requests, concurrency) = s
        .split_once(':')
        .ok_or_else(|| format!("expected REQUESTS:CONCURRENCY, got '{s}'"))?;
    let parse = |v: &str, what: &str| {
        v.trim()
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| format!("{what} must be a positive integer, got '{v}'"))
    };
    Ok(LevelArg {
        request_count: parse(requests, "REQUESTS")?,
        concurrency: parse(concurrency, "CONCURRENCY")?,
    })
}

#[derive(Args, Debug)]
pub struct SweepArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Level as REQUESTS:CONCURRENCY; repeat for several levels
    /// (default 10:1 100:50 200:100 400:200 600:300)
    #[arg(long = "level", value_parser = parse_level)]
    pub levels: Vec<LevelArg>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub request_timeout: u64,

    /// Maximum output tokens per request
    #[arg(long, default_value_t = 100)]
    pub output_tokens: u32,

    /// Pause between levels in seconds
    #[arg(long, default_value_t = 5)]
    pub cooldown: u64,
}
