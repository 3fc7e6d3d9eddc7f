//! Dense row-major grids

use serde::Serialize;

use crate::schema::Scalar;

/// One grid axis. Vector values get a trailing axis without a label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub label: Option<String>,
    pub values: Vec<Scalar>,
}

impl Axis {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A dense numeric grid, stored row-major (last axis varies fastest)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    axes: Vec<Axis>,
    data: Vec<f64>,
}

impl Grid {
    /// Builds a grid. Returns `None` if `data` does not fill the axes exactly.
    pub fn new(axes: Vec<Axis>, data: Vec<f64>) -> Option<Self> {
        let cells: usize = axes.iter().map(Axis::len).product();
        (cells == data.len()).then_some(Self { axes, data })
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn shape(&self) -> Vec<usize> {
        self.axes.iter().map(Axis::len).collect()
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Mutable cells, for editing a grid in place before writing it back
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat offset of a multi-index
    pub fn offset(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.axes.len() {
            return None;
        }
        let mut offset = 0;
        for (axis, &i) in self.axes.iter().zip(index) {
            if i >= axis.len() {
                return None;
            }
            offset = offset * axis.len() + i;
        }
        Some(offset)
    }

    pub fn get(&self, index: &[usize]) -> Option<f64> {
        self.offset(index).and_then(|o| self.data.get(o).copied())
    }
}
