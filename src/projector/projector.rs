//! Store to grid projection and back

use tracing::debug;

use super::errors::{ProjectionError, ProjectionResult};
use super::grid::{Axis, Grid};
use crate::observability::Event;
use crate::schema::{ParamDef, ParamValue, Scalar, SchemaRegistry, ValueType};
use crate::state::StateView;
use crate::store::{RecordKey, ValueRecord, ValueStore};

/// Projects parameters onto grids shaped by the active state.
///
/// Axes are the parameter's labels in declaration order, each over its
/// active values in domain order, plus a trailing axis for vector values.
pub struct ArrayProjector<'a> {
    registry: &'a SchemaRegistry,
    store: &'a ValueStore,
    state: &'a StateView,
}

impl<'a> ArrayProjector<'a> {
    pub fn new(registry: &'a SchemaRegistry, store: &'a ValueStore, state: &'a StateView) -> Self {
        Self {
            registry,
            store,
            state,
        }
    }

    /// Builds the grid of `name`.
    ///
    /// Fails with `IncompleteProjection` if any active label combination has
    /// no record.
    pub fn to_grid(&self, name: &str) -> ProjectionResult<Grid> {
        let param = self.numeric_param(name)?;
        let records = self
            .store
            .get(name)
            .ok_or_else(|| ProjectionError::UnknownParameter(name.to_string()))?;

        let active = self.active_axes(param);
        let mut data = Vec::new();
        let mut width: Option<usize> = None;
        let mut missing = Vec::new();

        for positions in combinations(&active) {
            let key = RecordKey::new(positions);
            let Some(value) = records.get(&key) else {
                missing.push(self.registry.render_labels(param, key.positions()));
                continue;
            };
            let elements = value.elements();
            match width {
                Some(expected) if expected != elements.len() => {
                    return Err(ProjectionError::RaggedVector {
                        param: name.to_string(),
                        expected,
                        found: elements.len(),
                    });
                }
                _ => width = Some(elements.len()),
            }
            data.extend(elements.iter().map(|e| e.as_f64().unwrap_or(f64::NAN)));
        }

        if !missing.is_empty() {
            return Err(ProjectionError::IncompleteProjection {
                param: name.to_string(),
                missing,
            });
        }

        let mut axes: Vec<Axis> = self
            .registry
            .param_labels(param)
            .zip(&active)
            .map(|(label, positions)| Axis {
                label: Some(label.name().to_string()),
                values: positions
                    .iter()
                    .filter_map(|&p| label.value(p).cloned())
                    .collect(),
            })
            .collect();
        if param.is_vector() {
            axes.push(Axis {
                label: None,
                values: (0..width.unwrap_or(0) as i64).map(Scalar::Int).collect(),
            });
        }

        let shape: Vec<usize> = axes.iter().map(Axis::len).collect();
        let grid = Grid::new(axes, data).ok_or_else(|| ProjectionError::ShapeMismatch {
            param: name.to_string(),
            expected: shape.clone(),
            found: shape,
        })?;
        debug!(
            event = %Event::ProjectionBuilt,
            param = name,
            cells = grid.len(),
            "projection built"
        );
        Ok(grid)
    }

    /// Turns a grid back into one full record per cell, in grid order.
    ///
    /// The store is not modified.
    pub fn from_grid(&self, name: &str, grid: &Grid) -> ProjectionResult<Vec<ValueRecord>> {
        let param = self.numeric_param(name)?;
        let active = self.active_axes(param);

        let found = grid.shape();
        let mut expected: Vec<usize> = active.iter().map(Vec::len).collect();
        if param.is_vector() {
            expected.push(found.get(active.len()).copied().unwrap_or(0));
        }
        if found != expected {
            return Err(ProjectionError::ShapeMismatch {
                param: name.to_string(),
                expected,
                found,
            });
        }

        let width = if param.is_vector() {
            expected.last().copied().unwrap_or(0)
        } else {
            1
        };

        let mut records = Vec::new();
        for (cell, positions) in combinations(&active).into_iter().enumerate() {
            let start = cell * width;
            let mut elements = Vec::with_capacity(width);
            for (offset, &raw) in grid.data()[start..start + width].iter().enumerate() {
                elements.push(to_scalar(param, raw, start + offset)?);
            }
            let value = if param.is_vector() {
                ParamValue::Vector(elements)
            } else {
                match elements.pop() {
                    Some(scalar) => ParamValue::Scalar(scalar),
                    None => continue,
                }
            };
            records.push(ValueRecord {
                labels: self.registry.record_labels(param, &positions),
                value,
            });
        }
        Ok(records)
    }

    fn numeric_param(&self, name: &str) -> ProjectionResult<&'a ParamDef> {
        let param = self
            .registry
            .param(name)
            .ok_or_else(|| ProjectionError::UnknownParameter(name.to_string()))?;
        if !param.value_type().is_numeric() {
            return Err(ProjectionError::NonNumeric {
                param: name.to_string(),
                type_name: param.value_type().type_name(),
            });
        }
        Ok(param)
    }

    fn active_axes(&self, param: &ParamDef) -> Vec<Vec<usize>> {
        self.registry
            .param_labels(param)
            .map(|label| self.state.active_positions(label))
            .collect()
    }
}

/// Every combination of positions, last axis fastest
fn combinations(axes: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut out: Vec<Vec<usize>> = vec![Vec::with_capacity(axes.len())];
    for axis in axes {
        let mut next = Vec::with_capacity(out.len() * axis.len());
        for prefix in &out {
            for &p in axis {
                let mut combo = prefix.clone();
                combo.push(p);
                next.push(combo);
            }
        }
        out = next;
    }
    out
}

fn to_scalar(param: &ParamDef, raw: f64, index: usize) -> ProjectionResult<Scalar> {
    let invalid = || ProjectionError::TypeCoercion {
        param: param.name().to_string(),
        index,
        value: raw,
    };
    match param.value_type() {
        ValueType::Int => {
            if raw.is_finite() && raw.fract() == 0.0 {
                Ok(Scalar::Int(raw as i64))
            } else {
                Err(invalid())
            }
        }
        ValueType::Bool => Ok(Scalar::Bool(raw != 0.0)),
        ValueType::Float if raw.is_finite() => Ok(Scalar::Float(raw)),
        _ => Err(invalid()),
    }
}
