use std::fmt::Write as _;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use pii_guard_core::carbon::{
    estimate_ai_carbon, estimate_build_carbon, estimate_server_carbon, recommend_region,
    AiUsageEstimate, BuildUsageEstimate, RegionRecommendation, ServerUsageEstimate,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "carbon-estimate",
    author,
    version,
    about = "Estimate carbon footprint for AI usage, servers, and CI builds"
)]
struct Cli {
    /// AI tokens consumed
    #[arg(long)]
    tokens: Option<u64>,

    /// Model size used for the token estimate
    #[arg(long, value_parser = ["small", "medium", "large"], default_value = "medium")]
    model: String,

    /// Server hours
    #[arg(long)]
    server_hours: Option<u64>,

    /// Server size used for the server estimate
    #[arg(long, value_parser = ["small", "medium", "large", "gpu"], default_value = "medium")]
    server_size: String,

    /// Number of servers
    #[arg(long, default_value_t = 1)]
    server_count: u32,

    /// Cloud region for intensity lookups
    #[arg(long, default_value = "us-east-1")]
    region: String,

    /// Build time in minutes
    #[arg(long)]
    build_minutes: Option<u64>,

    /// Builds per day for the CI estimate
    #[arg(long, default_value_t = 10)]
    builds_per_day: u32,

    /// Recommend greener region alternatives
    #[arg(long)]
    recommend_region: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Selected estimates, serialized in this fixed order.
#[derive(Debug, Default, Serialize)]
struct Estimates {
    #[serde(skip_serializing_if = "Option::is_none")]
    ai_usage: Option<AiUsageEstimate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    server_usage: Option<ServerUsageEstimate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    build_usage: Option<BuildUsageEstimate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    region_recommendation: Option<RegionRecommendation>,
}

impl Estimates {
    fn is_empty(&self) -> bool {
        self.ai_usage.is_none()
            && self.server_usage.is_none()
            && self.build_usage.is_none()
            && self.region_recommendation.is_none()
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let mut estimates = Estimates::default();

    if let Some(tokens) = cli.tokens {
        estimates.ai_usage = Some(estimate_ai_carbon(tokens, &cli.model));
    }
    if let Some(hours) = cli.server_hours {
        estimates.server_usage = Some(estimate_server_carbon(
            hours,
            &cli.server_size,
            &cli.region,
            cli.server_count,
        ));
    }
    if let Some(minutes) = cli.build_minutes {
        estimates.build_usage = Some(estimate_build_carbon(
            minutes,
            cli.builds_per_day,
            &cli.region,
        ));
    }
    if cli.recommend_region {
        estimates.region_recommendation = Some(recommend_region(&cli.region));
    }

    if estimates.is_empty() {
        Cli::command().print_help()?;
        return Ok(ExitCode::FAILURE);
    }

    if cli.json {
        let rendered =
            serde_json::to_string_pretty(&estimates).context("failed to render estimates")?;
        println!("{rendered}");
    } else {
        print!("{}", render_human(&estimates)?);
    }
    Ok(ExitCode::SUCCESS)
}

fn render_human(estimates: &Estimates) -> Result<String> {
    let mut out = String::new();

    if let Some(ai) = &estimates.ai_usage {
        writeln!(out, "\n=== AI Usage ===")?;
        writeln!(out, "  tokens: {}", ai.tokens)?;
        writeln!(out, "  model_size: {}", ai.model_size)?;
        writeln!(out, "  carbon_gco2: {}", ai.carbon_gco2)?;
        writeln!(out, "  carbon_kg: {}", ai.carbon_kg)?;
        writeln!(out, "  equivalent_km_driven: {}", ai.equivalent_km_driven)?;
    }
    if let Some(server) = &estimates.server_usage {
        writeln!(out, "\n=== Server Usage ===")?;
        writeln!(out, "  hours: {}", server.hours)?;
        writeln!(out, "  server_size: {}", server.server_size)?;
        writeln!(out, "  server_count: {}", server.server_count)?;
        writeln!(out, "  region: {}", server.region)?;
        writeln!(
            out,
            "  region_carbon_intensity: {}",
            server.region_carbon_intensity
        )?;
        writeln!(out, "  energy_kwh: {}", server.energy_kwh)?;
        writeln!(out, "  carbon_gco2: {}", server.carbon_gco2)?;
        writeln!(out, "  carbon_kg: {}", server.carbon_kg)?;
    }
    if let Some(build) = &estimates.build_usage {
        writeln!(out, "\n=== Build Usage ===")?;
        writeln!(out, "  build_minutes: {}", build.build_minutes)?;
        writeln!(out, "  builds_per_day: {}", build.builds_per_day)?;
        writeln!(out, "  monthly_build_hours: {}", build.monthly_build_hours)?;
        writeln!(out, "  region: {}", build.region)?;
        writeln!(out, "  monthly_carbon_gco2: {}", build.monthly_carbon_gco2)?;
        writeln!(out, "  monthly_carbon_kg: {}", build.monthly_carbon_kg)?;
    }
    if let Some(recommendation) = &estimates.region_recommendation {
        writeln!(out, "\n=== Region Recommendation ===")?;
        writeln!(out, "  current_region: {}", recommendation.current_region)?;
        writeln!(
            out,
            "  current_carbon_intensity: {}",
            recommendation.current_carbon_intensity
        )?;
        writeln!(out, "  greener_alternatives:")?;
        for alternative in &recommendation.greener_alternatives {
            writeln!(
                out,
                "    - {}: {} gCO2/kWh (-{}%)",
                alternative.region, alternative.carbon_intensity, alternative.reduction_percent
            )?;
        }
    }

    Ok(out)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
