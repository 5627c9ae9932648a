//! Grid rebuild and neighbor-list phases, expressed over job row ranges.
//!
//! Both entry points here are called from worker threads with a claimed
//! `[start, end)` range.  `insert_range` only appends to the grid's atomic
//! slots; `query_range` writes only the neighbor stripes of rows it owns and
//! appends to the pair buffer — exactly the sharing contract the store's
//! columns are built around.

use std::ops::Range;

use swarm_store::ComponentStore;

use crate::grid::UniformGrid;

/// Insert every active, finitely-positioned entity of `range` into the grid.
pub fn insert_range(grid: &UniformGrid, store: &ComponentStore, range: Range<u32>) {
    for row in range {
        let row = row as usize;
        if !store.is_active(row) {
            continue;
        }
        let x = store.transform.x.get(row);
        let y = store.transform.y.get(row);
        grid.insert(row as u32, x, y);
    }
}

/// Build and publish the neighbor list for every active entity of `range`,
/// and record overlapping pairs into the store's pair buffer.
///
/// `scratch` is a reusable accumulator (capacity K); callers keep one per
/// worker so the hot path allocates nothing.
pub fn query_range(
    grid: &UniformGrid,
    store: &ComponentStore,
    range: Range<u32>,
    scratch: &mut Vec<(u32, f32)>,
) {
    let k = store.neighbors.max_neighbors();

    for row in range {
        let i = row as usize;
        if !store.is_active(i) {
            continue;
        }

        let visual_range = store.collider.visual_range.get(i);
        let x = store.transform.x.get(i);
        let y = store.transform.y.get(i);
        let cell = grid.cell_coords(x, y);

        scratch.clear();
        if visual_range > 0.0 {
            if let Some((col, row_cell)) = cell {
                gather(grid, store, i, x, y, visual_range, col, row_cell, k, scratch);
            }
        }

        // Ascending index order makes downstream column reads sequential.
        insertion_sort_by_id(scratch);
        store.neighbors.publish_row(i, scratch);
        record_pairs(store, i, scratch);
    }
}

/// Walk the cells within `visual_range` of `(x, y)` and accumulate up to `k`
/// neighbors with `0 < Δ² < visual_range²`.
#[allow(clippy::too_many_arguments)]
fn gather(
    grid: &UniformGrid,
    store: &ComponentStore,
    i: usize,
    x: f32,
    y: f32,
    visual_range: f32,
    col: usize,
    row: usize,
    k: usize,
    out: &mut Vec<(u32, f32)>,
) {
    let reach = (visual_range / grid.cell_size()).ceil() as usize;
    let range_sq = visual_range * visual_range;

    let col_lo = col.saturating_sub(reach);
    let col_hi = (col + reach).min(grid.cols() - 1);
    let row_lo = row.saturating_sub(reach);
    let row_hi = (row + reach).min(grid.rows() - 1);

    'cells: for cy in row_lo..=row_hi {
        for cx in col_lo..=col_hi {
            let len = grid.cell_len(cx, cy);
            for slot in 0..len {
                let j = grid.cell_entry(cx, cy, slot);
                if j as usize == i {
                    continue;
                }
                let dx = store.transform.x.get(j as usize) - x;
                let dy = store.transform.y.get(j as usize) - y;
                let d2 = dx * dx + dy * dy;
                if d2 > 0.0 && d2 < range_sq {
                    out.push((j, d2));
                    if out.len() == k {
                        break 'cells; // K cap: remaining candidates are dropped
                    }
                }
            }
        }
    }
}

/// Sort neighbor entries ascending by entity index.  K is small, so a plain
/// insertion sort beats the general-purpose sorts here.
fn insertion_sort_by_id(entries: &mut [(u32, f32)]) {
    for idx in 1..entries.len() {
        let item = entries[idx];
        let mut at = idx;
        while at > 0 && entries[at - 1].0 > item.0 {
            entries[at] = entries[at - 1];
            at -= 1;
        }
        entries[at] = item;
    }
}

/// Append `(i, j)` overlap pairs to the pair buffer, one per pair: only the
/// lower-indexed endpoint reports, and only when the layer/mask filter of
/// both sides agrees.
fn record_pairs(store: &ComponentStore, i: usize, neighbors: &[(u32, f32)]) {
    let ri = store.collider.radius.get(i);
    let layer_i = store.collider.layer.get(i);
    let mask_i = store.collider.mask.get(i);

    for &(j, d2) in neighbors {
        let j = j as usize;
        if j <= i {
            continue;
        }
        if (layer_i & store.collider.mask.get(j)) == 0
            || (store.collider.layer.get(j) & mask_i) == 0
        {
            continue;
        }
        let min_dist = ri + store.collider.radius.get(j);
        if min_dist > 0.0 && d2 < min_dist * min_dist {
            store.pairs.push(i as u32, j as u32);
        }
    }
}
