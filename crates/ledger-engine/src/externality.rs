//! Externality catalogue: eight cost categories bound to the three indices.
//!
//! Each category costs `rate * revenue * (1 - index)`. At index 0 the eight
//! rates together consume exactly half of revenue.

use ledger_core::{CategoryCosts, IndexKind, IndexTriple, CATEGORY_COUNT};
use serde::Serialize;

/// Sum of all category rates.
pub const TOTAL_RATE: f64 = 0.50;

/// Named externality cost types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ExternalityCategory {
    Climate,
    Biodiversity,
    WaterSoil,
    Health,
    Inequality,
    LaborExploitation,
    SystemicRisk,
    RegulatoryCapture,
}

impl ExternalityCategory {
    /// Catalogue order; also the slot order in [`CategoryCosts`].
    pub const ALL: [ExternalityCategory; CATEGORY_COUNT] = [
        ExternalityCategory::Climate,
        ExternalityCategory::Biodiversity,
        ExternalityCategory::WaterSoil,
        ExternalityCategory::Health,
        ExternalityCategory::Inequality,
        ExternalityCategory::LaborExploitation,
        ExternalityCategory::SystemicRisk,
        ExternalityCategory::RegulatoryCapture,
    ];

    /// Share of revenue lost at index 0.
    pub fn rate(&self) -> f64 {
        match self {
            Self::Climate => 0.12,
            Self::Biodiversity => 0.06,
            Self::WaterSoil => 0.04,
            Self::Health => 0.06,
            Self::Inequality => 0.08,
            Self::LaborExploitation => 0.04,
            Self::SystemicRisk => 0.07,
            Self::RegulatoryCapture => 0.03,
        }
    }

    /// Index whose health suppresses this cost.
    pub fn index(&self) -> IndexKind {
        match self {
            Self::Climate | Self::Biodiversity | Self::WaterSoil => IndexKind::Ecological,
            Self::Health | Self::Inequality | Self::LaborExploitation => IndexKind::Social,
            Self::SystemicRisk | Self::RegulatoryCapture => IndexKind::Institutional,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Climate => "Climate & CO2",
            Self::Biodiversity => "Biodiversity loss",
            Self::WaterSoil => "Water & soil",
            Self::Health => "Health damage",
            Self::Inequality => "Social inequality",
            Self::LaborExploitation => "Worker exploitation",
            Self::SystemicRisk => "Systemic risk",
            Self::RegulatoryCapture => "Regulatory capture",
        }
    }

    /// Stable snake_case identifier, used for export column names.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Climate => "climate",
            Self::Biodiversity => "biodiversity",
            Self::WaterSoil => "water_soil",
            Self::Health => "health",
            Self::Inequality => "inequality",
            Self::LaborExploitation => "labor_exploitation",
            Self::SystemicRisk => "systemic_risk",
            Self::RegulatoryCapture => "regulatory_capture",
        }
    }

    /// Display colour as hex.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Climate => "#ff6b6b",
            Self::Biodiversity => "#cc4444",
            Self::WaterSoil => "#aa3333",
            Self::Health => "#ff8c42",
            Self::Inequality => "#e07020",
            Self::LaborExploitation => "#c06010",
            Self::SystemicRisk => "#fbbf24",
            Self::RegulatoryCapture => "#d4a017",
        }
    }

    /// Slot of this category in [`CategoryCosts`].
    pub fn slot(&self) -> usize {
        *self as usize
    }
}

/// Cost of one category: `rate * revenue * (1 - index_value)`.
pub fn cost(category: ExternalityCategory, revenue: f64, index_value: f64) -> f64 {
    category.rate() * revenue * (1.0 - index_value)
}

/// Costs of all eight categories for a revenue base and index levels.
pub fn category_costs(revenue: f64, indices: &IndexTriple) -> CategoryCosts {
    let mut costs = [0.0; CATEGORY_COUNT];
    for category in ExternalityCategory::ALL {
        costs[category.slot()] = cost(category, revenue, indices.get(category.index()));
    }
    CategoryCosts(costs)
}

/// Sum of the catalogue rates; equals [`TOTAL_RATE`] up to rounding.
pub fn rate_total() -> f64 {
    ExternalityCategory::ALL.iter().map(|c| c.rate()).sum()
}

/// Look up one category's cost in a cost vector.
pub fn cost_of(costs: &CategoryCosts, category: ExternalityCategory) -> f64 {
    costs.0[category.slot()]
}
