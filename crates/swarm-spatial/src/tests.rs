//! Unit tests for swarm-spatial.

use swarm_core::Vec2;
use swarm_store::ComponentStore;

use crate::grid::UniformGrid;
use crate::query::{insert_range, query_range};

/// A store with `n` rows, all active, radius 1, visual range `vr`.
fn active_store(n: usize, k: usize, vr: f32) -> ComponentStore {
    let store = ComponentStore::new(n, k, 1024);
    for row in 0..n {
        store.transform.active.set(row, 1);
        store.collider.radius.set(row, 1.0);
        store.collider.visual_range.set(row, vr);
        store.collider.layer.set(row, 1);
        store.collider.mask.set(row, u16::MAX);
    }
    store
}

fn rebuild_and_query(grid: &UniformGrid, store: &ComponentStore) {
    grid.clear();
    store.pairs.reset();
    let n = store.count() as u32;
    insert_range(grid, store, 0..n);
    let mut scratch = Vec::new();
    query_range(grid, store, 0..n, &mut scratch);
}

#[cfg(test)]
mod grid {
    use super::*;

    #[test]
    fn dimensions_round_up() {
        let grid = UniformGrid::new(100, 70, 32, 16);
        assert_eq!(grid.cols(), 4);
        assert_eq!(grid.rows(), 3);
    }

    #[test]
    fn cell_cap_has_floor_and_ceiling() {
        // Sparse world → floor of 32.
        let sparse = UniformGrid::new(1000, 1000, 50, 10);
        assert_eq!(grid_cap(&sparse), 32);
        // Hyper-dense world → ceiling of 256.
        let dense = UniformGrid::new(100, 100, 100, 100_000);
        assert_eq!(grid_cap(&dense), 256);
    }

    fn grid_cap(grid: &UniformGrid) -> usize {
        grid.cell_capacity()
    }

    #[test]
    fn nan_and_negative_positions_skip() {
        let grid = UniformGrid::new(100, 100, 10, 8);
        assert!(!grid.insert(0, f32::NAN, 5.0));
        assert!(!grid.insert(0, -1.0, 5.0));
        assert!(grid.cell_coords(f32::INFINITY, 0.0).is_none());
    }

    #[test]
    fn far_positions_clamp_to_edge_cells() {
        let grid = UniformGrid::new(100, 100, 10, 8);
        assert_eq!(grid.cell_coords(5000.0, 5000.0), Some((9, 9)));
    }

    #[test]
    fn insert_and_read_back_in_order() {
        let grid = UniformGrid::new(100, 100, 10, 8);
        assert!(grid.insert(4, 15.0, 25.0));
        assert!(grid.insert(9, 16.0, 26.0));
        assert_eq!(grid.cell_len(1, 2), 2);
        assert_eq!(grid.cell_entry(1, 2, 0), 4);
        assert_eq!(grid.cell_entry(1, 2, 1), 9);
    }

    #[test]
    fn clear_resets_only_occupied_cells() {
        let grid = UniformGrid::new(100, 100, 10, 8);
        grid.insert(0, 5.0, 5.0);
        grid.insert(1, 95.0, 95.0);
        assert_eq!(grid.occupancy(), 2);
        grid.clear();
        assert_eq!(grid.cell_len(0, 0), 0);
        assert_eq!(grid.cell_len(9, 9), 0);
        assert_eq!(grid.occupancy(), 0);
        // Reusable after clear.
        grid.insert(2, 5.0, 5.0);
        assert_eq!(grid.cell_len(0, 0), 1);
    }

    #[test]
    fn full_cell_drops_and_counts() {
        let grid = UniformGrid::new(100, 100, 10, 8);
        let cap = grid.cell_capacity() as u32;
        for e in 0..cap + 3 {
            grid.insert(e, 5.0, 5.0);
        }
        assert_eq!(grid.cell_len(0, 0), cap as usize);
        assert_eq!(grid.take_overflow(), 3);
        assert_eq!(grid.take_overflow(), 0, "take drains the counter");
    }

    #[test]
    fn concurrent_inserts_lose_nothing_below_cap() {
        use std::sync::Arc;
        let grid = Arc::new(UniformGrid::new(320, 320, 32, 4000));
        let handles: Vec<_> = (0..4u32)
            .map(|t| {
                let grid = Arc::clone(&grid);
                std::thread::spawn(move || {
                    for e in 0..500 {
                        let id = t * 500 + e;
                        let x = (id % 10) as f32 * 32.0 + 1.0;
                        let y = (id / 10 % 10) as f32 * 32.0 + 1.0;
                        assert!(grid.insert(id, x, y));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(grid.occupancy(), 2000);
    }
}

#[cfg(test)]
mod neighbors {
    use super::*;

    #[test]
    fn finds_entities_within_visual_range() {
        let store = active_store(3, 8, 30.0);
        store.place(0, Vec2::new(100.0, 100.0));
        store.place(1, Vec2::new(110.0, 100.0)); // 10 away
        store.place(2, Vec2::new(200.0, 100.0)); // 100 away

        let grid = UniformGrid::new(800, 600, 30, 3);
        rebuild_and_query(&grid, &store);

        let ids: Vec<_> = store.neighbors.neighbors(0).map(|(id, _)| id.0).collect();
        assert_eq!(ids, vec![1]);
        let (_, d2) = store.neighbors.neighbors(0).next().unwrap();
        assert_eq!(d2, 100.0);
    }

    #[test]
    fn neighbor_list_sorted_by_index() {
        let store = active_store(5, 8, 50.0);
        // Place around row 2 so insertion order differs from index order.
        store.place(2, Vec2::new(100.0, 100.0));
        store.place(4, Vec2::new(104.0, 100.0));
        store.place(0, Vec2::new(96.0, 100.0));
        store.place(3, Vec2::new(100.0, 104.0));
        store.place(1, Vec2::new(100.0, 96.0));

        let grid = UniformGrid::new(800, 600, 30, 5);
        rebuild_and_query(&grid, &store);

        let ids: Vec<_> = store.neighbors.neighbors(2).map(|(id, _)| id.0).collect();
        assert_eq!(ids, vec![0, 1, 3, 4]);
    }

    #[test]
    fn zero_visual_range_yields_empty_list() {
        let store = active_store(2, 8, 0.0);
        store.place(0, Vec2::new(10.0, 10.0));
        store.place(1, Vec2::new(11.0, 10.0));
        let grid = UniformGrid::new(100, 100, 10, 2);
        rebuild_and_query(&grid, &store);
        assert_eq!(store.neighbors.neighbor_count(0), 0);
    }

    #[test]
    fn coincident_entities_are_not_neighbors() {
        let store = active_store(2, 8, 20.0);
        store.place(0, Vec2::new(10.0, 10.0));
        store.place(1, Vec2::new(10.0, 10.0)); // Δ² == 0
        let grid = UniformGrid::new(100, 100, 10, 2);
        rebuild_and_query(&grid, &store);
        assert_eq!(store.neighbors.neighbor_count(0), 0);
    }

    #[test]
    fn k_cap_truncates() {
        let k = 4;
        let store = active_store(10, k, 100.0);
        for row in 0..10 {
            store.place(row, Vec2::new(50.0 + row as f32, 50.0));
        }
        let grid = UniformGrid::new(200, 200, 50, 10);
        rebuild_and_query(&grid, &store);
        for row in 0..10 {
            assert!(store.neighbors.neighbor_count(row) <= k);
        }
    }

    #[test]
    fn inactive_entities_are_invisible() {
        let store = active_store(2, 8, 30.0);
        store.place(0, Vec2::new(10.0, 10.0));
        store.place(1, Vec2::new(12.0, 10.0));
        store.transform.active.set(1, 0);
        let grid = UniformGrid::new(100, 100, 10, 2);
        rebuild_and_query(&grid, &store);
        assert_eq!(store.neighbors.neighbor_count(0), 0);
    }

    #[test]
    fn nan_position_skips_query() {
        let store = active_store(2, 8, 30.0);
        store.place(0, Vec2::new(f32::NAN, 10.0));
        store.place(1, Vec2::new(12.0, 10.0));
        let grid = UniformGrid::new(100, 100, 10, 2);
        rebuild_and_query(&grid, &store);
        assert_eq!(store.neighbors.neighbor_count(0), 0);
    }

    /// Grid results match a brute-force O(N²) scan on a uniform scatter.
    #[test]
    fn agrees_with_brute_force() {
        let n = 400;
        let vr = 30.0_f32;
        let store = active_store(n, 64, vr);
        // Deterministic low-discrepancy scatter over 800×600.
        let mut seed = 0x2545_f491u32;
        let mut next = || {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            seed as f32 / u32::MAX as f32
        };
        for row in 0..n {
            store.place(row, Vec2::new(next() * 800.0, next() * 600.0));
        }

        let grid = UniformGrid::new(800, 600, 30, n);
        rebuild_and_query(&grid, &store);

        let mut mismatches = 0;
        for i in 0..n {
            let mut expect: Vec<u32> = (0..n)
                .filter(|&j| j != i)
                .filter(|&j| {
                    let d = store.position(j) - store.position(i);
                    let d2 = d.length_sq();
                    d2 > 0.0 && d2 < vr * vr
                })
                .map(|j| j as u32)
                .collect();
            expect.sort_unstable();
            let got: Vec<u32> = store.neighbors.neighbors(i).map(|(id, _)| id.0).collect();
            // The K cap may truncate; compare only below the cap.
            if expect.len() < 64 && got != expect {
                mismatches += 1;
            }
        }
        assert!(
            mismatches <= n / 100,
            "grid disagreed with brute force for {mismatches} of {n} entities"
        );
    }
}

#[cfg(test)]
mod pairs {
    use super::*;

    #[test]
    fn overlapping_pair_recorded_once() {
        let store = active_store(2, 8, 30.0);
        store.collider.radius.set(0, 6.0);
        store.collider.radius.set(1, 6.0);
        store.place(0, Vec2::new(100.0, 100.0));
        store.place(1, Vec2::new(110.0, 100.0)); // overlap: 10 < 12

        let grid = UniformGrid::new(800, 600, 30, 2);
        rebuild_and_query(&grid, &store);

        let pairs: Vec<_> = store.pairs.iter().collect();
        assert_eq!(pairs, vec![(0, 1)]);
    }

    #[test]
    fn separated_pair_not_recorded() {
        let store = active_store(2, 8, 30.0);
        store.collider.radius.set(0, 3.0);
        store.collider.radius.set(1, 3.0);
        store.place(0, Vec2::new(100.0, 100.0));
        store.place(1, Vec2::new(110.0, 100.0)); // 10 > 6

        let grid = UniformGrid::new(800, 600, 30, 2);
        rebuild_and_query(&grid, &store);
        assert!(store.pairs.is_empty());
    }

    #[test]
    fn mask_filter_suppresses_pair() {
        let store = active_store(2, 8, 30.0);
        store.collider.radius.set(0, 6.0);
        store.collider.radius.set(1, 6.0);
        store.place(0, Vec2::new(100.0, 100.0));
        store.place(1, Vec2::new(110.0, 100.0));
        // Row 1 only collides with layer 2; row 0 is on layer 1.
        store.collider.mask.set(1, 0b10);

        let grid = UniformGrid::new(800, 600, 30, 2);
        rebuild_and_query(&grid, &store);
        assert!(store.pairs.is_empty());
    }
}
