//! Faults and their random placement onto wires.

use std::collections::BTreeMap;
use std::fmt;

use astrahl_model::Wire;
use rand::Rng;
use rand_distr::{Beta, Distribution};
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::SimError;

/// Shape parameters of the observability prior. Most faults are hard to
/// observe; a few are easy.
pub const OBSERVABILITY_ALPHA: f64 = 0.09;
pub const OBSERVABILITY_BETA: f64 = 8.9;

/// A latent defect. Higher observability means easier to find and fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fault {
    observability: f64,
}

/// Faults present on each wire.
pub type FaultDistribution = BTreeMap<Wire, Vec<Fault>>;

impl Fault {
    pub fn new(observability: f64) -> Result<Self, SimError> {
        if !(0.0..=1.0).contains(&observability) {
            return Err(SimError::InvalidObservability(observability));
        }
        Ok(Self { observability })
    }

    /// Draw a fault with observability from Beta(0.09, 8.9).
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Result<Self, SimError> {
        let prior = observability_prior()?;
        Ok(Self {
            observability: prior.sample(rng),
        })
    }

    pub fn observability(&self) -> f64 {
        self.observability
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fault({:.4})", self.observability)
    }
}

fn observability_prior() -> Result<Beta<f64>, SimError> {
    Beta::new(OBSERVABILITY_ALPHA, OBSERVABILITY_BETA)
        .map_err(|e| SimError::Distribution(e.to_string()))
}

/// Scatter `num_faults` sampled faults over the wires of `confidences`.
///
/// Each fault repeatedly picks a wire or "nothing" uniformly. Picking
/// nothing `fault_drop_limit` times drops the fault. Picking a wire accepts
/// the fault there when `a * (1 - observability) > confidence` for a fresh
/// `a ~ U[0, 1)`, otherwise the fault picks again.
pub fn create_fault_distribution<R: Rng + ?Sized>(
    confidences: &BTreeMap<Wire, f64>,
    num_faults: usize,
    fault_drop_limit: u32,
    rng: &mut R,
) -> Result<FaultDistribution, SimError> {
    let prior = observability_prior()?;
    let wires: Vec<&Wire> = confidences.keys().collect();
    let drop_limit = fault_drop_limit.max(1);
    let mut distribution: FaultDistribution =
        wires.iter().map(|w| ((*w).clone(), Vec::new())).collect();

    for i in 0..num_faults {
        let fault = Fault {
            observability: prior.sample(rng),
        };
        debug!(fault = i, observability = fault.observability, "created fault");
        let mut drops = 0;
        loop {
            let choice = rng.gen_range(0..=wires.len());
            let Some(wire) = wires.get(choice) else {
                drops += 1;
                if drops >= drop_limit {
                    debug!(fault = i, drops, "dropping fault");
                    break;
                }
                continue;
            };
            let confidence = confidences[*wire];
            let chance: f64 = rng.gen();
            if chance * (1.0 - fault.observability) > confidence {
                debug!(fault = i, %wire, chance, confidence, "assigned fault");
                if let Some(faults) = distribution.get_mut(*wire) {
                    faults.push(fault);
                }
                break;
            }
            debug!(fault = i, %wire, chance, confidence, "rejected fault");
        }
    }

    let assigned: usize = distribution.values().map(Vec::len).sum();
    info!(
        assigned,
        dropped = num_faults - assigned,
        "created fault distribution"
    );
    for (wire, faults) in &distribution {
        info!(%wire, confidence = confidences[wire], faults = faults.len(), "wire faults");
    }
    Ok(distribution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn confidences(values: &[(&str, f64)]) -> BTreeMap<Wire, f64> {
        values
            .iter()
            .map(|(name, value)| (Wire::new(*name), *value))
            .collect()
    }

    #[test]
    fn display_uses_four_decimals() {
        assert_eq!(Fault::new(0.0123).unwrap().to_string(), "Fault(0.0123)");
    }

    #[test]
    fn observability_must_be_a_probability() {
        assert!(Fault::new(1.5).is_err());
        assert!(Fault::new(-0.1).is_err());
        assert!(Fault::new(f64::NAN).is_err());
    }

    #[test]
    fn sampled_observability_is_mostly_small() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let faults: Vec<_> = (0..2000).map(|_| Fault::sample(&mut rng).unwrap()).collect();
        assert!(faults.iter().all(|f| (0.0..=1.0).contains(&f.observability())));
        let mean = faults.iter().map(Fault::observability).sum::<f64>() / faults.len() as f64;
        // Beta(0.09, 8.9) has mean 0.09 / 8.99.
        assert!(mean < 0.05, "mean observability {mean}");
    }

    #[test]
    fn every_fault_is_assigned_or_dropped() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let conf = confidences(&[("a", 0.0), ("b", 0.2), ("c", 0.5)]);
        let distribution = create_fault_distribution(&conf, 40, 1, &mut rng).unwrap();
        assert_eq!(distribution.len(), 3);
        let assigned: usize = distribution.values().map(Vec::len).sum();
        assert!(assigned <= 40);
    }

    #[test]
    fn fully_confident_wires_receive_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let conf = confidences(&[("a", 1.0), ("b", 1.0)]);
        let distribution = create_fault_distribution(&conf, 25, 3, &mut rng).unwrap();
        assert!(distribution.values().all(Vec::is_empty));
    }

    #[test]
    fn higher_drop_limit_keeps_more_faults() {
        let conf = confidences(&[("a", 0.1), ("b", 0.1)]);
        let count = |limit| {
            let mut rng = ChaCha8Rng::seed_from_u64(21);
            let d = create_fault_distribution(&conf, 400, limit, &mut rng).unwrap();
            d.values().map(Vec::len).sum::<usize>()
        };
        assert!(count(8) > count(1));
    }
}
