//! Row-per-record tables with one column per wire in canonical order.

use std::collections::BTreeMap;

use astrahl_model::{Wire, WireOrder};

use crate::errors::SolverError;

#[derive(Debug, Clone, PartialEq)]
pub struct Table<T> {
    columns: WireOrder,
    rows: Vec<Vec<T>>,
}

/// Operating points, one row per experiment.
pub type PointTable = Table<f64>;
/// Solver or baseline allocations, one row per experiment.
pub type AllocationTable = Table<f64>;
/// Initial fault counts, one row per experiment.
pub type FaultCountTable = Table<u32>;

impl<T: Clone> Table<T> {
    pub fn new(columns: WireOrder) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(columns: WireOrder, rows: Vec<Vec<T>>) -> Result<Self, SolverError> {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// `count` copies of `row`.
    pub fn repeat(columns: WireOrder, row: Vec<T>, count: usize) -> Result<Self, SolverError> {
        Self::from_rows(columns, vec![row; count])
    }

    pub fn push_row(&mut self, row: Vec<T>) -> Result<(), SolverError> {
        if row.len() != self.columns.len() {
            return Err(SolverError::ShapeMismatch(format!(
                "row {} has {} values for {} wires",
                self.rows.len(),
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Appends a row given as a wire mapping; the key set must match the
    /// columns exactly.
    pub fn push_map(&mut self, values: &BTreeMap<Wire, T>) -> Result<(), SolverError> {
        if let Some(extra) = values.keys().find(|w| self.columns.index_of(w).is_none()) {
            return Err(SolverError::UnknownWire(extra.name().to_string()));
        }
        let row = self
            .columns
            .iter()
            .map(|wire| {
                values.get(wire).cloned().ok_or_else(|| {
                    SolverError::ShapeMismatch(format!("row is missing wire `{wire}`"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.push_row(row)
    }

    pub fn columns(&self) -> &WireOrder {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<T>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[T]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn row_map(&self, index: usize) -> Option<BTreeMap<Wire, T>> {
        let row = self.rows.get(index)?;
        Some(self.columns.iter().cloned().zip(row.iter().cloned()).collect())
    }

    pub fn row_maps(&self) -> impl Iterator<Item = BTreeMap<Wire, T>> + '_ {
        self.rows
            .iter()
            .map(|row| self.columns.iter().cloned().zip(row.iter().cloned()).collect())
    }

    /// Values of one wire across all rows.
    pub fn column(&self, wire: &Wire) -> Option<Vec<T>> {
        let index = self.columns.index_of(wire)?;
        Some(self.rows.iter().map(|row| row[index].clone()).collect())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Table<U> {
        Table {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .map(|row| row.iter().map(&mut f).collect())
                .collect(),
        }
    }

    /// Cell-wise combination of two tables over the same wires and row count.
    pub fn zip_with<U, V>(
        &self,
        other: &Table<U>,
        mut f: impl FnMut(&T, &U) -> V,
    ) -> Result<Table<V>, SolverError> {
        if self.columns != other.columns {
            return Err(SolverError::ShapeMismatch(
                "tables cover different wires".to_string(),
            ));
        }
        if self.rows.len() != other.rows.len() {
            return Err(SolverError::ShapeMismatch(format!(
                "{} rows against {} rows",
                self.rows.len(),
                other.rows.len()
            )));
        }
        let rows = self
            .rows
            .iter()
            .zip(&other.rows)
            .map(|(lhs, rhs)| lhs.iter().zip(rhs).map(|(a, b)| f(a, b)).collect())
            .collect();
        Ok(Table {
            columns: self.columns.clone(),
            rows,
        })
    }
}
