//! Per-frame screen-space occupancy grid.

use std::collections::HashMap;

use cartotext_core::ScreenRect;

/// Screen occupancy structure answering "is this rectangle free".
///
/// Committed rectangles are bucketed into fixed-size cells so overlap
/// queries only touch nearby allocations. The grid is cleared at the start
/// of every frame and owned exclusively by the frame pass.
pub struct CollisionGrid {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<usize>>,
    rects: Vec<ScreenRect>,
}

impl CollisionGrid {
    /// Create an empty grid with the given cell edge in pixels.
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(1.0),
            cells: HashMap::new(),
            rects: Vec::new(),
        }
    }

    /// Forget all allocations; called at frame start.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.rects.clear();
    }

    fn cell_span(&self, rect: &ScreenRect) -> (i32, i32, i32, i32) {
        let min_x = (rect.min.x / self.cell_size).floor() as i32;
        let min_y = (rect.min.y / self.cell_size).floor() as i32;
        let max_x = (rect.max.x / self.cell_size).floor() as i32;
        let max_y = (rect.max.y / self.cell_size).floor() as i32;
        (min_x, min_y, max_x, max_y)
    }

    /// Test `rect` against every rectangle committed this frame.
    pub fn is_allocated(&self, rect: &ScreenRect) -> bool {
        let (min_x, min_y, max_x, max_y) = self.cell_span(rect);
        for cx in min_x..=max_x {
            for cy in min_y..=max_y {
                let Some(indices) = self.cells.get(&(cx, cy)) else {
                    continue;
                };
                if indices.iter().any(|&i| self.rects[i].intersects(rect)) {
                    return true;
                }
            }
        }
        false
    }

    /// Commit a rectangle. Committing the same rectangle twice within a
    /// frame is a no-op.
    pub fn allocate(&mut self, rect: ScreenRect) {
        let (min_x, min_y, max_x, max_y) = self.cell_span(&rect);
        if let Some(indices) = self.cells.get(&(min_x, min_y)) {
            if indices.iter().any(|&i| self.rects[i] == rect) {
                return;
            }
        }

        let index = self.rects.len();
        self.rects.push(rect);
        for cx in min_x..=max_x {
            for cy in min_y..=max_y {
                self.cells.entry((cx, cy)).or_default().push(index);
            }
        }
    }

    /// Commit every rectangle of a multi-part label, or none of them.
    ///
    /// Sub-rectangles of one label may overlap each other (icon behind
    /// text); the atomicity requirement is against rectangles already
    /// committed by other labels.
    pub fn allocate_all(&mut self, rects: &[ScreenRect]) -> bool {
        if rects.is_empty() {
            return false;
        }
        if rects.iter().any(|r| self.is_allocated(r)) {
            return false;
        }
        for rect in rects {
            self.allocate(*rect);
        }
        true
    }

    /// Number of rectangles committed this frame.
    pub fn allocated_count(&self) -> usize {
        self.rects.len()
    }
}
