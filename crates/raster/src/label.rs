//! Connected-component labeling of a binary mask.
//!
//! Rules:
//! 1. Foreground cells are those set in the mask; everything else is background.
//! 2. Two foreground cells belong to the same component when they share an
//!    edge (4-connectivity).  Diagonal neighbours are separate components.
//! 3. Components are numbered from 1 in raster scan order; background is 0.

use std::collections::VecDeque;

use crate::Mask;

/// Result of labeling a mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labeling {
    pub width: usize,
    pub height: usize,
    /// One label per cell, row-major.  `0` is background.
    pub labels: Vec<u32>,
    /// Number of components found.
    pub count: usize,
}

impl Labeling {
    pub fn label_at(&self, row: usize, col: usize) -> u32 {
        self.labels[row * self.width + col]
    }

    /// Cell count of every component, indexed by `label - 1`.
    pub fn component_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.count];
        for &label in self.labels.iter().filter(|&&l| l != 0) {
            sizes[label as usize - 1] += 1;
        }
        sizes
    }
}

/// Label the 4-connected foreground components of `mask`.
pub fn label_components(mask: &Mask) -> Labeling {
    let (width, height) = (mask.width, mask.height);
    let mut labels = vec![0u32; width * height];
    let mut next: u32 = 0;
    let mut queue: VecDeque<usize> = VecDeque::new();

    for start in 0..labels.len() {
        if !mask.cells[start] || labels[start] != 0 {
            continue;
        }

        // Flood the new component breadth-first.
        next += 1;
        labels[start] = next;
        queue.push_back(start);

        while let Some(idx) = queue.pop_front() {
            let (row, col) = (idx / width, idx % width);
            let neighbours = [
                (row > 0).then(|| idx - width),
                (row + 1 < height).then(|| idx + width),
                (col > 0).then(|| idx - 1),
                (col + 1 < width).then(|| idx + 1),
            ];
            for n in neighbours.into_iter().flatten() {
                if mask.cells[n] && labels[n] == 0 {
                    labels[n] = next;
                    queue.push_back(n);
                }
            }
        }
    }

    Labeling { width, height, labels, count: next as usize }
}

// ============================================================
// Unit tests
// ============================================================
