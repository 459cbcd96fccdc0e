//! Historical lag features
//!
//! `value_lag_k` at position `i` is the value at position `i - k` of the
//! same (group's) chronologically sorted sub-sequence. The two policies make
//! a different correctness/availability trade-off: ungrouped inputs are
//! typically small ad-hoc pulls that must not collapse to zero rows, while
//! grouped multi-entity batches must not fabricate within-entity history.

use crate::clean::VALUE_COL;
use crate::error::{AqError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// How the series is partitioned for lag computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LagPolicy {
    /// One global series. Offsets that can never be populated
    /// (`k >= row count`) are pruned from the working set, and leading
    /// gaps in the surviving lag columns are forward- then backward-filled.
    Ungrouped,
    /// Independent per-entity sub-sequences keyed by a column. No pruning
    /// and no filling: rows without real history keep null lags and are
    /// dropped by the assembler.
    Grouped { key: String },
}

/// Name of the lag column for a given offset.
pub fn lag_column_name(offset: usize) -> String {
    format!("value_lag_{offset}")
}

/// Lag feature generator over a chronologically sorted table.
#[derive(Debug, Clone)]
pub struct LagGenerator {
    offsets: Vec<usize>,
    policy: LagPolicy,
}

impl LagGenerator {
    pub fn new(offsets: Vec<usize>, policy: LagPolicy) -> Self {
        Self { offsets, policy }
    }

    /// The offsets that will actually be computed for a table of `n_rows`.
    pub fn effective_offsets(&self, n_rows: usize) -> Vec<usize> {
        match self.policy {
            LagPolicy::Ungrouped => self
                .offsets
                .iter()
                .copied()
                .filter(|&k| k > 0 && k < n_rows)
                .collect(),
            LagPolicy::Grouped { .. } => {
                self.offsets.iter().copied().filter(|&k| k > 0).collect()
            }
        }
    }

    /// Add one `value_lag_k` column per effective offset and return the
    /// names added, in offset order. The input must already be sorted
    /// chronologically; under the grouped policy the global sort implies
    /// within-group chronological order. Never fails on short input: an
    /// empty working set makes this a no-op.
    pub fn apply(&self, df: &mut DataFrame) -> Result<Vec<String>> {
        let n = df.height();
        let offsets = self.effective_offsets(n);
        if offsets.is_empty() {
            debug!(rows = n, "no satisfiable lag offsets; skipping lag step");
            return Ok(Vec::new());
        }

        let values: Vec<Option<f64>> = df
            .column(VALUE_COL)?
            .as_materialized_series()
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .collect();

        let groups: Vec<Vec<usize>> = match &self.policy {
            LagPolicy::Ungrouped => vec![(0..n).collect()],
            LagPolicy::Grouped { key } => group_indices(df, key)?,
        };

        let mut added = Vec::with_capacity(offsets.len());
        for &k in &offsets {
            let mut lagged: Vec<Option<f64>> = vec![None; n];
            for positions in &groups {
                for (j, &row) in positions.iter().enumerate() {
                    if j >= k {
                        lagged[row] = values[positions[j - k]];
                    }
                }
            }

            if matches!(self.policy, LagPolicy::Ungrouped) {
                fill_forward_backward(&mut lagged);
            }

            let name = lag_column_name(k);
            df.with_column(Column::new(name.as_str().into(), lagged))?;
            added.push(name);
        }

        Ok(added)
    }
}

/// Row indices per group, groups in first-appearance order, indices in
/// table order (chronological for a sorted table).
fn group_indices(df: &DataFrame, key: &str) -> Result<Vec<Vec<usize>>> {
    let series = df
        .column(key)
        .map_err(|_| AqError::ValidationError(format!("group column {key:?} is missing")))?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let ca = series.str()?;

    let mut order: Vec<String> = Vec::new();
    let mut by_key: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, opt) in ca.into_iter().enumerate() {
        let entity = opt.unwrap_or("").to_string();
        by_key
            .entry(entity.clone())
            .or_insert_with(|| {
                order.push(entity);
                Vec::new()
            })
            .push(i);
    }

    Ok(order
        .into_iter()
        .map(|k| by_key.remove(&k).unwrap_or_default())
        .collect())
}

/// Forward-fill then backward-fill, so leading gaps take the first real
/// value and a column with any real value ends up fully populated.
fn fill_forward_backward(values: &mut [Option<f64>]) {
    let mut last = None;
    for v in values.iter_mut() {
        match *v {
            Some(x) => last = Some(x),
            None => *v = last,
        }
    }
    let mut next = None;
    for v in values.iter_mut().rev() {
        match *v {
            Some(x) => next = Some(x),
            None => *v = next,
        }
    }
}
