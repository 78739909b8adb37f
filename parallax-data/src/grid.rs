//! Static triangle topology for the depth grid.
//!
//! The depth field is a structured `width x height` grid, so the
//! connectivity is fixed: every grid cell contributes two triangles over
//! the row-major vertex indices. Built once at startup and immutable for
//! the process lifetime.

use tracing::debug;

/// Fixed triangle connectivity between adjacent pixels in the depth grid.
#[derive(Debug, Clone)]
pub struct GridTopology {
    width: u32,
    height: u32,
    triangles: Vec<[u32; 3]>,
}

impl GridTopology {
    /// Build the topology for a `width x height` vertex grid.
    ///
    /// Cell (x, y) with corners `ul = y*w + x`, `ur = ul + 1`,
    /// `ll = (y+1)*w + x`, `lr = ll + 1` emits the triangles
    /// `(ll, ul, ur)` and `(ll, ur, lr)`.
    pub fn build(width: u32, height: u32) -> Self {
        let cells = width.saturating_sub(1) as usize * height.saturating_sub(1) as usize;
        let mut triangles = Vec::with_capacity(cells * 2);

        for y in 0..height.saturating_sub(1) {
            for x in 0..width.saturating_sub(1) {
                let ul = y * width + x;
                let ur = ul + 1;
                let ll = (y + 1) * width + x;
                let lr = ll + 1;

                triangles.push([ll, ul, ur]);
                triangles.push([ll, ur, lr]);
            }
        }

        debug!(
            "Built grid topology for {}x{}: {} triangles",
            width,
            height,
            triangles.len()
        );

        Self {
            width,
            height,
            triangles,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of vertices the topology indexes into.
    pub fn vertex_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Triangle index triplets.
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Flattened index list, three entries per triangle.
    pub fn flat_indices(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_count() {
        let topo = GridTopology::build(4, 3);
        // (w-1) * (h-1) * 2 triangles, 6 indices per cell
        assert_eq!(topo.triangles().len(), 3 * 2 * 2);
        assert_eq!(topo.flat_indices().len(), (4 - 1) * (3 - 1) * 6);
    }

    #[test]
    fn test_indices_in_range() {
        let topo = GridTopology::build(5, 4);
        let max = topo.vertex_count() as u32;
        for tri in topo.triangles() {
            for &idx in tri {
                assert!(idx < max);
            }
        }
    }

    #[test]
    fn test_first_cell_winding() {
        let topo = GridTopology::build(4, 3);
        // Cell (0, 0): ul=0, ur=1, ll=4, lr=5
        assert_eq!(topo.triangles()[0], [4, 0, 1]);
        assert_eq!(topo.triangles()[1], [4, 1, 5]);
    }

    #[test]
    fn test_degenerate_grids() {
        assert!(GridTopology::build(1, 1).triangles().is_empty());
        assert!(GridTopology::build(4, 1).triangles().is_empty());
        assert!(GridTopology::build(1, 4).triangles().is_empty());
    }

    #[test]
    fn test_every_vertex_referenced() {
        let topo = GridTopology::build(3, 3);
        let mut seen = vec![false; topo.vertex_count()];
        for tri in topo.triangles() {
            for &idx in tri {
                seen[idx as usize] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }
}
