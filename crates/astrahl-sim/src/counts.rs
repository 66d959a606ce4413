use astrahl_model::{Expression, WireOrder};
use astrahl_solver::{FaultCountTable, Point};
use rand::Rng;
use rand_distr::{Distribution, Geometric};

use crate::errors::SimError;

/// `rows` rows of initial fault counts for the wires of `point`.
///
/// Wire `w` gets a count drawn from a geometric distribution over trials
/// (support starts at 1) with success probability `1 - conf_fn(point[w])`.
pub fn geometric_fault_counts<R: Rng + ?Sized>(
    point: &Point,
    conf_fn: &Expression,
    rows: usize,
    rng: &mut R,
) -> Result<FaultCountTable, SimError> {
    let columns = WireOrder::from_wires(point.keys().cloned());
    let distributions = point
        .iter()
        .map(|(wire, value)| {
            let probability = 1.0 - conf_fn.eval(*value);
            if !(probability > 0.0 && probability <= 1.0) {
                return Err(SimError::InvalidProbability {
                    wire: wire.clone(),
                    probability,
                });
            }
            Geometric::new(probability).map_err(|e| SimError::Distribution(e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut table = FaultCountTable::new(columns);
    for _ in 0..rows {
        let row = distributions
            .iter()
            .map(|d| u32::try_from(d.sample(rng).saturating_add(1)).unwrap_or(u32::MAX))
            .collect();
        table.push_row(row)?;
    }
    Ok(table)
}
