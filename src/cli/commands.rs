//! Subcommand execution

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use streambench_core::{
    AdaptiveConfig, AdaptiveProbe, BenchmarkConfig, BenchmarkResult, DispatchLevelRunner,
    DispatcherBuilder, ProbeReport, RequestIssuer, Sampler, Sweep, SweepConfig, SweepLevel,
};
use streambench_report::{
    render, render_json, render_probe_outcome, write_json, write_results, OutputFormat,
    SweepSummary,
};
use streambench_samplers::PromptSampler;
use streambench_vendors::{IssuerConfig, OpenAiIssuer};
use tracing::info;

use super::{Cli, Commands, CommonArgs, RunArgs, SweepArgs};

/// Run the parsed command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) if args.adaptive => run_adaptive(args).await,
        Commands::Run(args) => run_single(args).await,
        Commands::Sweep(args) => run_sweep(args).await,
    }
}

/// Issuer and sampler shared by every level of a command
struct Targets {
    issuer: Arc<dyn RequestIssuer>,
    sampler: Arc<dyn Sampler>,
}

fn prepare(common: &CommonArgs) -> Result<Targets> {
    let auth = common
        .auth_config()
        .resolve()
        .context("Failed to resolve authentication")?;

    let issuer_config = IssuerConfig::new(&common.llm_url);
    let issuer = OpenAiIssuer::new(&issuer_config, auth.header)
        .context("Failed to create the request issuer")?;
    info!(endpoint = issuer.endpoint(), auth_type = %auth.scheme, "Target endpoint");

    let sampler =
        PromptSampler::for_config(common.use_long_context, common.prompt_file.as_deref())
            .context("Failed to load prompts")?;
    info!(sampler = sampler.name(), prompts = sampler.len(), "Prompt corpus ready");

    Ok(Targets {
        issuer: Arc::new(issuer),
        sampler: Arc::new(sampler),
    })
}

fn base_config(common: &CommonArgs, request_timeout: u64, output_tokens: u32) -> BenchmarkConfig {
    BenchmarkConfig::default()
        .with_request_timeout(Duration::from_secs(request_timeout))
        .with_max_output_tokens(output_tokens)
        .with_long_context(common.use_long_context)
        .with_model(common.model.clone())
}

async fn run_single(args: RunArgs) -> Result<()> {
    let config = base_config(&args.common, args.request_timeout, args.output_tokens)
        .with_request_count(args.num_requests.unwrap_or_default())
        .with_concurrency(args.concurrency.unwrap_or_default());
    config.validate().context("Invalid benchmark configuration")?;

    let targets = prepare(&args.common)?;
    let dispatcher = DispatcherBuilder::new()
        .config(config)
        .issuer(targets.issuer)
        .sampler(targets.sampler)
        .build()?;

    let result = dispatcher
        .run_and_summarize()
        .await
        .context("Benchmark run failed")?;

    print!("{}", render(&result, args.common.output_format)?);
    save_results(&args.common, std::slice::from_ref(&result))
}

async fn run_adaptive(args: RunArgs) -> Result<()> {
    let base = base_config(&args.common, args.request_timeout, args.output_tokens);
    let adaptive = AdaptiveConfig::default()
        .with_floor_success_rate(args.floor_success_rate)
        .with_ceiling(args.max_concurrency)
        .with_initial_concurrency(args.initial_concurrency)
        .with_step_schedule(args.step_schedule())
        .with_requests_per_concurrency(args.requests_per_concurrency)
        .with_cooldown(Duration::from_secs(args.cooldown));

    let targets = prepare(&args.common)?;
    let runner = DispatchLevelRunner::new(targets.issuer, targets.sampler);
    let probe = AdaptiveProbe::new(base, adaptive, runner)
        .context("Invalid adaptive probe configuration")?;

    let report = probe.run().await.context("Adaptive probe failed")?;
    print_probe(&report, args.common.output_format)?;

    if let Some(path) = &args.common.output {
        write_json(path, &report)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), levels = report.levels.len(), "Wrote probe report");
    }
    Ok(())
}

async fn run_sweep(args: SweepArgs) -> Result<()> {
    let base = base_config(&args.common, args.request_timeout, args.output_tokens);
    let defaults = SweepConfig::default();
    let pairs: Vec<(usize, usize)> = if args.levels.is_empty() {
        defaults
            .levels
            .iter()
            .map(|l| (l.request_count, l.concurrency))
            .collect()
    } else {
        args.levels
            .iter()
            .map(|l| (l.request_count, l.concurrency))
            .collect()
    };
    let levels = pairs
        .into_iter()
        .map(|(requests, concurrency)| SweepLevel::new(requests, concurrency, args.output_tokens))
        .collect();
    let sweep_config = SweepConfig {
        request_timeout: Duration::from_secs(args.request_timeout),
        ..defaults
    }
    .with_levels(levels)
    .with_cooldown(Duration::from_secs(args.cooldown));

    let targets = prepare(&args.common)?;
    let runner = DispatchLevelRunner::new(targets.issuer, targets.sampler);
    let sweep = Sweep::new(base, sweep_config, runner).context("Invalid sweep configuration")?;

    let results = sweep.run().await.context("Sweep failed")?;
    print_levels(&results, args.common.output_format)?;
    save_results(&args.common, &results)
}

fn print_levels(results: &[BenchmarkResult], format: OutputFormat) -> Result<()> {
    if format.includes_json() {
        println!("{}", render_json(results)?);
    }
    if format.includes_line() {
        if let Some(summary) = SweepSummary::from_results(results) {
            if format.includes_json() {
                println!();
            }
            print!("{}", summary.render());
        }
    }
    Ok(())
}

fn print_probe(report: &ProbeReport, format: OutputFormat) -> Result<()> {
    if format.includes_json() {
        println!("{}", render_json(report)?);
    }
    if format.includes_line() {
        if let Some(summary) = SweepSummary::from_results(&report.levels) {
            if format.includes_json() {
                println!();
            }
            print!("{}", summary.render());
        }
        println!("\n{}", render_probe_outcome(&report.outcome));
    }
    Ok(())
}

fn save_results(common: &CommonArgs, results: &[BenchmarkResult]) -> Result<()> {
    if let Some(path) = &common.output {
        write_results(path, results)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}
