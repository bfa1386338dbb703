//! Scenario parameters and their documented ranges.

use crate::{IndexTriple, ValidationError};
use serde::{Deserialize, Serialize};

/// Inputs of one engine run besides the historical series.
///
/// Defaults match the reference scenario. Ranges are enforced by
/// [`ScenarioParams::validate`] at configuration boundaries only; the engine
/// runs any finite parameter set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioParams {
    /// Annual surplus growth.
    pub growth_rate: f64,
    /// Leverage strength.
    pub gamma: f64,
    /// Base dialysis rate.
    pub dr_0: f64,
    /// Feedback dampening on the dialysis rate.
    pub beta: f64,
    pub ehi_0: f64,
    pub hri_0: f64,
    pub iri_0: f64,
    /// Ecological share of diverted capital.
    pub q_b_share: f64,
    /// Annual extractive index decline.
    pub ext_degrad: f64,
    /// Projection horizon in years.
    pub proj_years: u32,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            growth_rate: 0.04,
            gamma: 1.0,
            dr_0: 0.05,
            beta: 0.15,
            ehi_0: 0.30,
            hri_0: 0.40,
            iri_0: 0.50,
            q_b_share: 0.50,
            ext_degrad: 0.04,
            proj_years: 10,
        }
    }
}

/// Tunable parameter identifiers, used by sweeps and validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamKind {
    GrowthRate,
    Gamma,
    Dr0,
    Beta,
    Ehi0,
    Hri0,
    Iri0,
    QbShare,
    ExtDegrad,
    ProjYears,
}

/// Closed range for one parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamBound {
    pub kind: ParamKind,
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
}

impl ParamBound {
    pub fn contains(&self, v: f64) -> bool {
        (self.min..=self.max).contains(&v)
    }
}

impl ParamKind {
    pub const ALL: [ParamKind; 10] = [
        ParamKind::GrowthRate,
        ParamKind::Gamma,
        ParamKind::Dr0,
        ParamKind::Beta,
        ParamKind::Ehi0,
        ParamKind::Hri0,
        ParamKind::Iri0,
        ParamKind::QbShare,
        ParamKind::ExtDegrad,
        ParamKind::ProjYears,
    ];

    pub fn name(&self) -> &'static str {
        self.bound().name
    }

    /// Documented range for this parameter.
    pub fn bound(&self) -> ParamBound {
        let (name, min, max) = match self {
            ParamKind::GrowthRate => ("growth_rate", 0.0, 0.15),
            ParamKind::Gamma => ("gamma", 0.0, 3.0),
            ParamKind::Dr0 => ("dr_0", 0.01, 0.20),
            ParamKind::Beta => ("beta", 0.0, 0.50),
            ParamKind::Ehi0 => ("ehi_0", 0.1, 0.9),
            ParamKind::Hri0 => ("hri_0", 0.1, 0.9),
            ParamKind::Iri0 => ("iri_0", 0.1, 0.9),
            ParamKind::QbShare => ("q_b_share", 0.0, 1.0),
            ParamKind::ExtDegrad => ("ext_degrad", 0.01, 0.10),
            ParamKind::ProjYears => ("proj_years", 5.0, 20.0),
        };
        ParamBound {
            kind: *self,
            name,
            min,
            max,
        }
    }

    /// Parse a snake_case parameter name.
    pub fn from_name(name: &str) -> Option<ParamKind> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }
}

impl ScenarioParams {
    /// Documented range of every parameter, in [`ParamKind::ALL`] order.
    pub fn bounds() -> [ParamBound; 10] {
        ParamKind::ALL.map(|k| k.bound())
    }

    /// Starting (today's) index levels.
    pub fn starting_indices(&self) -> IndexTriple {
        IndexTriple::new(self.ehi_0, self.hri_0, self.iri_0)
    }

    pub fn get(&self, kind: ParamKind) -> f64 {
        match kind {
            ParamKind::GrowthRate => self.growth_rate,
            ParamKind::Gamma => self.gamma,
            ParamKind::Dr0 => self.dr_0,
            ParamKind::Beta => self.beta,
            ParamKind::Ehi0 => self.ehi_0,
            ParamKind::Hri0 => self.hri_0,
            ParamKind::Iri0 => self.iri_0,
            ParamKind::QbShare => self.q_b_share,
            ParamKind::ExtDegrad => self.ext_degrad,
            ParamKind::ProjYears => f64::from(self.proj_years),
        }
    }

    /// Set one parameter. The horizon is rounded to the nearest whole year.
    pub fn set(&mut self, kind: ParamKind, v: f64) {
        match kind {
            ParamKind::GrowthRate => self.growth_rate = v,
            ParamKind::Gamma => self.gamma = v,
            ParamKind::Dr0 => self.dr_0 = v,
            ParamKind::Beta => self.beta = v,
            ParamKind::Ehi0 => self.ehi_0 = v,
            ParamKind::Hri0 => self.hri_0 = v,
            ParamKind::Iri0 => self.iri_0 = v,
            ParamKind::QbShare => self.q_b_share = v,
            ParamKind::ExtDegrad => self.ext_degrad = v,
            ParamKind::ProjYears => self.proj_years = v.round().max(0.0) as u32,
        }
    }

    /// Copy with one parameter replaced.
    pub fn with(&self, kind: ParamKind, v: f64) -> Self {
        let mut next = self.clone();
        next.set(kind, v);
        next
    }

    /// Check every parameter against its documented range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for kind in ParamKind::ALL {
            let bound = kind.bound();
            let v = self.get(kind);
            if !v.is_finite() {
                return Err(ValidationError::NonFinite(bound.name));
            }
            if !bound.contains(v) {
                return Err(ValidationError::ParamOutOfRange {
                    name: bound.name,
                    value: v,
                    min: bound.min,
                    max: bound.max,
                });
            }
        }
        Ok(())
    }
}
