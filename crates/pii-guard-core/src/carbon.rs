//! Carbon-footprint estimation from static lookup tables and arithmetic
//! formulas. A sibling utility of the scanner; it shares no state or
//! interface with the scanning pipeline.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::Serialize;

/// Grid carbon intensity by cloud region (gCO2/kWh).
static REGION_CARBON: Lazy<BTreeMap<&'static str, f64>> = Lazy::new(|| {
    BTreeMap::from([
        // AWS
        ("eu-north-1", 8.0),
        ("ca-central-1", 20.0),
        ("us-west-2", 78.0),
        ("eu-west-1", 316.0),
        ("eu-central-1", 338.0),
        ("us-east-1", 379.0),
        ("us-east-2", 440.0),
        ("ap-northeast-1", 506.0),
        ("ap-southeast-1", 408.0),
        ("ap-south-1", 708.0),
        // GCP
        ("europe-north1", 96.0),
        ("northamerica-northeast1", 20.0),
        ("us-west1", 78.0),
        ("us-central1", 440.0),
        // Azure
        ("swedencentral", 8.0),
        ("norwayeast", 19.0),
        ("westus2", 78.0),
        ("eastus", 379.0),
    ])
});

/// gCO2e per 1K tokens by model size.
static MODEL_CARBON: Lazy<BTreeMap<&'static str, f64>> = Lazy::new(|| {
    BTreeMap::from([("small", 0.2), ("medium", 0.5), ("large", 1.2)])
});

/// Server power draw estimates (kWh per hour).
static SERVER_POWER: Lazy<BTreeMap<&'static str, f64>> = Lazy::new(|| {
    BTreeMap::from([("small", 0.1), ("medium", 0.3), ("large", 0.8), ("gpu", 2.5)])
});

/// Fallback intensity for regions missing from the table.
const DEFAULT_CARBON_INTENSITY: f64 = 400.0;
/// Build servers are assumed to draw ~0.5 kWh per hour.
const BUILD_SERVER_KWH_PER_HOUR: f64 = 0.5;
/// Average passenger car emits ~120 g/km.
const CAR_GRAMS_PER_KM: f64 = 120.0;

pub fn region_carbon_intensity(region: &str) -> f64 {
    REGION_CARBON
        .get(region)
        .copied()
        .unwrap_or(DEFAULT_CARBON_INTENSITY)
}

fn model_carbon_per_1k(model_size: &str) -> f64 {
    MODEL_CARBON
        .get(model_size)
        .copied()
        .unwrap_or(MODEL_CARBON["medium"])
}

fn server_power_kwh(server_size: &str) -> f64 {
    SERVER_POWER
        .get(server_size)
        .copied()
        .unwrap_or(SERVER_POWER["medium"])
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiUsageEstimate {
    pub tokens: u64,
    pub model_size: String,
    pub carbon_gco2: f64,
    pub carbon_kg: f64,
    pub equivalent_km_driven: f64,
}

/// Estimate carbon from AI/LLM token usage.
pub fn estimate_ai_carbon(tokens: u64, model_size: &str) -> AiUsageEstimate {
    let total_gco2 = (tokens as f64 / 1000.0) * model_carbon_per_1k(model_size);
    AiUsageEstimate {
        tokens,
        model_size: model_size.to_string(),
        carbon_gco2: round_to(total_gco2, 2),
        carbon_kg: round_to(total_gco2 / 1000.0, 4),
        equivalent_km_driven: round_to(total_gco2 / CAR_GRAMS_PER_KM, 2),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerUsageEstimate {
    pub hours: u64,
    pub server_size: String,
    pub server_count: u32,
    pub region: String,
    pub region_carbon_intensity: f64,
    pub energy_kwh: f64,
    pub carbon_gco2: f64,
    pub carbon_kg: f64,
}

/// Estimate carbon from server usage in a given region.
pub fn estimate_server_carbon(
    hours: u64,
    server_size: &str,
    region: &str,
    count: u32,
) -> ServerUsageEstimate {
    let carbon_intensity = region_carbon_intensity(region);
    let total_kwh = server_power_kwh(server_size) * hours as f64 * count as f64;
    let total_gco2 = total_kwh * carbon_intensity;
    ServerUsageEstimate {
        hours,
        server_size: server_size.to_string(),
        server_count: count,
        region: region.to_string(),
        region_carbon_intensity: carbon_intensity,
        energy_kwh: round_to(total_kwh, 2),
        carbon_gco2: round_to(total_gco2, 2),
        carbon_kg: round_to(total_gco2 / 1000.0, 4),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildUsageEstimate {
    pub build_minutes: u64,
    pub builds_per_day: u32,
    pub monthly_build_hours: f64,
    pub region: String,
    pub monthly_carbon_gco2: f64,
    pub monthly_carbon_kg: f64,
}

/// Estimate monthly carbon from CI/CD builds.
pub fn estimate_build_carbon(
    build_minutes: u64,
    builds_per_day: u32,
    region: &str,
) -> BuildUsageEstimate {
    let hours_per_month = (build_minutes as f64 / 60.0) * builds_per_day as f64 * 30.0;
    let carbon_intensity = region_carbon_intensity(region);
    let total_gco2 = hours_per_month * BUILD_SERVER_KWH_PER_HOUR * carbon_intensity;
    BuildUsageEstimate {
        build_minutes,
        builds_per_day,
        monthly_build_hours: round_to(hours_per_month, 1),
        region: region.to_string(),
        monthly_carbon_gco2: round_to(total_gco2, 2),
        monthly_carbon_kg: round_to(total_gco2 / 1000.0, 4),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionAlternative {
    pub region: String,
    pub carbon_intensity: f64,
    pub reduction_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionRecommendation {
    pub current_region: String,
    pub current_carbon_intensity: f64,
    pub greener_alternatives: Vec<RegionAlternative>,
}

/// Recommend up to three greener region alternatives, lowest intensity
/// first.
pub fn recommend_region(current_region: &str) -> RegionRecommendation {
    let current_carbon = region_carbon_intensity(current_region);
    let mut greener: Vec<(&str, f64)> = REGION_CARBON
        .iter()
        .filter(|(_, carbon)| **carbon < current_carbon)
        .map(|(region, carbon)| (*region, *carbon))
        .collect();
    greener.sort_by(|a, b| a.1.total_cmp(&b.1));

    let greener_alternatives = greener
        .into_iter()
        .take(3)
        .map(|(region, carbon)| RegionAlternative {
            region: region.to_string(),
            carbon_intensity: carbon,
            reduction_percent: round_to((current_carbon - carbon) / current_carbon * 100.0, 1),
        })
        .collect();

    RegionRecommendation {
        current_region: current_region.to_string(),
        current_carbon_intensity: current_carbon,
        greener_alternatives,
    }
}
