//! Fan-out selection for the packed tree.
//!
//! A tree of degree `d` and height `h` has `d^(h-1)` leaf slots and
//! `(d^h - 1) / (d - 1)` slots overall, and can hold up to `d^h` records.
//! Everything here is computed with exact integer arithmetic.

use super::rtree_constants::{MIN_DEGREE, NODE_SIZE, TREE_HEADER_SIZE};

/// `base^exp`, or `None` on overflow.
fn checked_pow(base: u64, exp: u32) -> Option<u64> {
    let mut acc: u64 = 1;
    for _ in 0..exp {
        acc = acc.checked_mul(base)?;
    }
    Some(acc)
}

/// Returns `true` if `base^exp >= target`, without overflowing.
fn pow_reaches(base: u64, exp: u32, target: u64) -> bool {
    let mut acc: u64 = 1;
    for _ in 0..exp {
        if acc >= target {
            return true;
        }
        acc = match acc.checked_mul(base) {
            Some(v) => v,
            None => return true,
        };
    }
    acc >= target
}

/// Smallest `d >= 2` with `d^height >= num_records`.
pub fn root_ceil(num_records: u64, height: u32) -> u64 {
    let min = MIN_DEGREE as u64;
    if height == 0 || num_records <= min {
        return min;
    }

    let (mut lo, mut hi) = (min, num_records);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if pow_reaches(mid, height, num_records) {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    lo
}

/// Smallest height `h >= 1` with `degree^h >= num_records`.
pub fn tree_height(num_records: u64, degree: u32) -> u32 {
    let degree = degree.max(MIN_DEGREE) as u64;
    let mut height = 1;
    let mut capacity = degree;
    while capacity < num_records {
        capacity = capacity.saturating_mul(degree);
        height += 1;
    }
    height
}

/// Total node slots of a full tree, `(d^h - 1) / (d - 1)`.
pub fn node_count(degree: u32, height: u32) -> Option<u64> {
    let degree = degree as u64;
    let mut total: u64 = 0;
    let mut level: u64 = 1;
    for depth in 0..height {
        if depth > 0 {
            level = level.checked_mul(degree)?;
        }
        total = total.checked_add(level)?;
    }
    Some(total)
}

/// Leaf slots of a full tree, `d^(h - 1)`.
pub fn leaf_count(degree: u32, height: u32) -> Option<u64> {
    checked_pow(degree as u64, height.saturating_sub(1))
}

/// Serialized size of the node array plus header.
pub fn serialized_size(degree: u32, height: u32) -> Option<u64> {
    node_count(degree, height)?
        .checked_mul(NODE_SIZE)?
        .checked_add(TREE_HEADER_SIZE)
}

/// Every self-consistent `(height, degree)` pair for `num_records` records.
///
/// For each trial height `h` from 1 to `ceil(log2 N)`, the candidate degree is
/// the smallest `d` with `d^h >= N`. The trial is kept only if `h` is also
/// the smallest height that degree needs.
pub fn candidate_shapes(num_records: u64) -> Vec<(u32, u32)> {
    if num_records <= 1 {
        return vec![(1, MIN_DEGREE)];
    }

    let max_height = 64 - (num_records - 1).leading_zeros();
    let mut shapes = Vec::new();
    for height in 1..=max_height {
        let degree = match u32::try_from(root_ceil(num_records, height)) {
            Ok(d) => d,
            Err(_) => continue,
        };
        if tree_height(num_records, degree) != height {
            continue;
        }
        shapes.push((height, degree));
    }
    shapes
}

/// Picks the smallest degree whose serialized tree fits `bytes_available`.
///
/// Returns `None` when no self-consistent shape fits.
pub fn best_degree(bytes_available: u64, num_records: u64) -> Option<u32> {
    let best = candidate_shapes(num_records)
        .into_iter()
        .filter(|&(height, degree)| {
            serialized_size(degree, height).is_some_and(|bytes| bytes <= bytes_available)
        })
        .map(|(_, degree)| degree)
        .min();

    match best {
        Some(degree) => log::debug!(
            "Best degree for {} records within {} bytes: {}",
            num_records,
            bytes_available,
            degree
        ),
        None => log::warn!(
            "No feasible degree for {} records within {} bytes",
            num_records,
            bytes_available
        ),
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_ceil() {
        assert_eq!(root_ceil(1000, 1), 1000);
        assert_eq!(root_ceil(1000, 2), 32);
        assert_eq!(root_ceil(1000, 3), 10);
        assert_eq!(root_ceil(1024, 10), 2);
        assert_eq!(root_ceil(1, 3), 2);
        assert_eq!(root_ceil(u64::MAX, 2), 1u64 << 32);
    }

    #[test]
    fn test_tree_height() {
        assert_eq!(tree_height(1, 2), 1);
        assert_eq!(tree_height(2, 2), 1);
        assert_eq!(tree_height(3, 2), 2);
        assert_eq!(tree_height(1000, 10), 3);
        assert_eq!(tree_height(1001, 10), 4);
        assert_eq!(tree_height(1000, 4), 5);
    }

    #[test]
    fn test_counts() {
        assert_eq!(node_count(2, 1), Some(1));
        assert_eq!(node_count(2, 3), Some(7));
        assert_eq!(node_count(10, 3), Some(111));
        assert_eq!(leaf_count(10, 3), Some(100));
        assert_eq!(leaf_count(3, 1), Some(1));
        assert_eq!(node_count(u32::MAX, 4), None);
        assert_eq!(serialized_size(2, 1), Some(NODE_SIZE + TREE_HEADER_SIZE));
    }

    #[test]
    fn test_candidate_shapes_are_self_consistent() {
        let shapes = candidate_shapes(1000);
        assert_eq!(
            shapes,
            vec![(1, 1000), (2, 32), (3, 10), (4, 6), (5, 4), (7, 3), (10, 2)]
        );
        for (h, d) in shapes {
            assert!(pow_reaches(d as u64, h, 1000));
            assert!(!pow_reaches(d as u64, h - 1, 1000));
        }
    }

    #[test]
    fn test_exact_powers_are_not_lost() {
        // float roots of exact powers can land just above the integer
        assert!(candidate_shapes(1_000_000).contains(&(3, 100)));
        assert!(candidate_shapes(1u64 << 20).contains(&(20, 2)));
        assert!(candidate_shapes(243).contains(&(5, 3)));
    }

    #[test]
    fn test_best_degree_prefers_smallest_fitting() {
        let bytes = |nodes: u64| nodes * NODE_SIZE + TREE_HEADER_SIZE;

        assert_eq!(best_degree(16 * 1024 * 1024, 1000), Some(2));
        assert_eq!(best_degree(bytes(341), 1000), Some(4));
        assert_eq!(best_degree(bytes(341) - 1, 1000), Some(6));
        assert_eq!(best_degree(bytes(1), 1000), Some(1000));
        assert_eq!(best_degree(bytes(1) - 1, 1000), None);
    }

    #[test]
    fn test_best_degree_tiny_inputs() {
        let one_node = NODE_SIZE + TREE_HEADER_SIZE;
        assert_eq!(best_degree(one_node, 0), Some(2));
        assert_eq!(best_degree(one_node, 1), Some(2));
        assert_eq!(best_degree(one_node, 2), Some(2));
        assert_eq!(best_degree(one_node - 1, 1), None);
    }

    #[test]
    fn test_larger_budget_keeps_feasible_degrees() {
        let n = 5000;
        let budgets = [100, 1_000, 10_000, 50_000, 200_000, 1_000_000];
        for pair in budgets.windows(2) {
            for (height, degree) in candidate_shapes(n) {
                let size = serialized_size(degree, height).unwrap();
                if size <= pair[0] {
                    assert!(size <= pair[1]);
                }
            }
            match (best_degree(pair[0], n), best_degree(pair[1], n)) {
                (Some(small), Some(large)) => assert!(large <= small),
                (Some(_), None) => panic!("larger budget lost a feasible degree"),
                _ => {}
            }
        }
    }
}
