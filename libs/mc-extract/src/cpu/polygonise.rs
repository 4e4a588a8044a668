//! Cell triangulation shared by the CPU count and generate kernels.
//!
//! Each cube is split into six tetrahedra around the `c0 → c6` diagonal and
//! every tetrahedron is polygonised on its own. Both kernels classify corners
//! through the same [`inside_mask`], so the count pass and the generate pass
//! always agree on how many vertices a cell emits.
//!
//! Triangles wind counter-clockwise when seen from the outside (the side
//! where the field is `>= iso_level`).

use glam::Vec3;
use mc_grid::GridCorner;

/// Cube corner offsets `(dx, dy, dz)`, i.e. `(k, j, i)` steps.
const CUBE_CORNERS: [[u32; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 1, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [1, 1, 1],
    [0, 1, 1],
];

/// Six positively oriented tetrahedra sharing the `c0 → c6` diagonal.
const TETRAHEDRA: [[usize; 4]; 6] = [
    [0, 5, 1, 6],
    [0, 1, 2, 6],
    [0, 2, 3, 6],
    [0, 3, 7, 6],
    [0, 7, 4, 6],
    [0, 4, 5, 6],
];

/// Even permutation of tetrahedron slots starting with slot `a`.
const LEADING: [[usize; 4]; 4] = [[0, 1, 2, 3], [1, 2, 0, 3], [2, 0, 1, 3], [3, 0, 2, 1]];

pub(crate) type Cell = [GridCorner; 8];

/// Gathers the eight corners of the cell handled by work-item
/// `(gx, gy, gz)`; `None` for padding work-items outside `[0, n-1)³`.
pub(crate) fn load_cell(corners: &[GridCorner], n: u32, [gx, gy, gz]: [u32; 3]) -> Option<Cell> {
    let cells = n.checked_sub(1)?;
    if gx >= cells || gy >= cells || gz >= cells {
        return None;
    }
    let n = n as usize;
    let mut cell = [GridCorner::default(); 8];
    for (slot, [dx, dy, dz]) in CUBE_CORNERS.iter().enumerate() {
        let i = (gz + dz) as usize;
        let j = (gy + dy) as usize;
        let k = (gx + dx) as usize;
        cell[slot] = *corners.get((i * n + j) * n + k)?;
    }
    Some(cell)
}

/// Bit `s` is set when tetrahedron slot `s` is inside (`value < iso_level`).
/// NaN compares false and is therefore outside.
#[inline]
fn inside_mask(cell: &Cell, tetrahedron: &[usize; 4], iso_level: f32) -> u8 {
    tetrahedron
        .iter()
        .enumerate()
        .fold(0u8, |mask, (slot, &corner)| {
            if cell[corner].value < iso_level {
                mask | (1 << slot)
            } else {
                mask
            }
        })
}

#[inline]
fn tetrahedron_vertex_count(mask: u8) -> u32 {
    match mask.count_ones() {
        1 | 3 => 3,
        2 => 6,
        _ => 0,
    }
}

/// Number of vertices cell emits at `iso_level`; always a multiple of 3.
pub(crate) fn count_cell(cell: &Cell, iso_level: f32) -> u32 {
    TETRAHEDRA
        .iter()
        .map(|tetrahedron| tetrahedron_vertex_count(inside_mask(cell, tetrahedron, iso_level)))
        .sum()
}

/// Emits exactly [`count_cell`] vertices, three per triangle.
pub(crate) fn emit_cell(cell: &Cell, iso_level: f32, emit: &mut impl FnMut([f32; 4])) {
    for tetrahedron in &TETRAHEDRA {
        let corners = tetrahedron.map(|corner| &cell[corner]);
        let mask = inside_mask(cell, tetrahedron, iso_level);
        let edge = |from: usize, to: usize| interpolate(corners[from], corners[to], iso_level);

        match mask.count_ones() {
            1 => {
                let [a, b, c, d] = LEADING[mask.trailing_zeros() as usize];
                emit(edge(a, b));
                emit(edge(a, c));
                emit(edge(a, d));
            }
            3 => {
                let outside = (!mask & 0b1111).trailing_zeros() as usize;
                let [a, b, c, d] = LEADING[outside];
                emit(edge(a, b));
                emit(edge(a, d));
                emit(edge(a, c));
            }
            2 => {
                let [a, b, c, d] = pair_order(mask);
                let (ac, ad, bc, bd) = (edge(a, c), edge(a, d), edge(b, c), edge(b, d));
                emit(ac);
                emit(ad);
                emit(bd);
                emit(ac);
                emit(bd);
                emit(bc);
            }
            _ => {}
        }
    }
}

/// Even permutation `(a, b, c, d)` with `a`, `b` the two inside slots.
fn pair_order(mask: u8) -> [usize; 4] {
    match mask {
        0b0011 => [0, 1, 2, 3],
        0b0101 => [0, 2, 3, 1],
        0b1001 => [0, 3, 1, 2],
        0b0110 => [1, 2, 0, 3],
        0b1010 => [1, 3, 2, 0],
        _ => [2, 3, 0, 1],
    }
}

/// Point where the field crosses `iso_level` on edge `from → to`, as `[x, y, z, 1]`.
fn interpolate(from: &GridCorner, to: &GridCorner, iso_level: f32) -> [f32; 4] {
    let t = (iso_level - from.value) / (to.value - from.value);
    let t = if t.is_finite() { t } else { 0.5 };
    Vec3::from(from.position)
        .lerp(Vec3::from(to.position), t)
        .extend(1.0)
        .to_array()
}

// =============================================================================
// TESTS
// =============================================================================
