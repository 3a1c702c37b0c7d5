use std::sync::Arc;

use parking_lot::RwLock;

use super::rtree_impl::StrRTree;

/// A published tree that can be replaced while readers hold older versions.
///
/// Readers call [`SharedIndex::snapshot`] and query the returned `Arc` without
/// holding any lock. A rebuild produces a fresh tree and swaps it in with
/// [`SharedIndex::publish`]; trees already handed out stay valid until their
/// last reader drops them.
#[derive(Debug)]
pub struct SharedIndex {
    current: RwLock<Arc<StrRTree>>,
}

impl SharedIndex {
    pub fn new(tree: StrRTree) -> Self {
        Self {
            current: RwLock::new(Arc::new(tree)),
        }
    }

    /// The tree published most recently.
    pub fn snapshot(&self) -> Arc<StrRTree> {
        Arc::clone(&self.current.read())
    }

    /// Replaces the published tree and returns the previous one.
    pub fn publish(&self, tree: StrRTree) -> Arc<StrRTree> {
        let next = Arc::new(tree);
        log::debug!(
            "Publishing tree with {} records (degree {}, height {})",
            next.num_records(),
            next.degree(),
            next.height()
        );
        std::mem::replace(&mut *self.current.write(), next)
    }
}

impl From<StrRTree> for SharedIndex {
    fn from(tree: StrRTree) -> Self {
        Self::new(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexConfig;
    use crate::geometry::Point;
    use crate::rectangle::Rectangle;
    use crate::shape::Shape;
    use std::thread;

    fn grid(n: usize) -> StrRTree {
        let records: Vec<Shape> = (0..n * n)
            .map(|i| Shape::Point(Point::new((i % n) as f64, (i / n) as f64)))
            .collect();
        StrRTree::build(records, &IndexConfig::default()).unwrap().0
    }

    #[test]
    fn test_publish_swaps_tree() {
        let shared = SharedIndex::new(grid(3));
        let before = shared.snapshot();
        assert_eq!(before.num_records(), 9);

        let previous = shared.publish(grid(4));
        assert!(Arc::ptr_eq(&before, &previous));
        assert_eq!(shared.snapshot().num_records(), 16);
        assert_eq!(before.num_records(), 9);
    }

    #[test]
    fn test_concurrent_readers_see_whole_trees() {
        let shared = Arc::new(SharedIndex::from(grid(3)));
        let query = Shape::Rectangle(Rectangle::new(-1.0, -1.0, 100.0, 100.0));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                let query = query.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        let tree = shared.snapshot();
                        let hits = tree.query(&query);
                        assert_eq!(hits.len() as u32, tree.num_records());
                    }
                })
            })
            .collect();

        for n in 4..8 {
            shared.publish(grid(n));
        }
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(shared.snapshot().num_records(), 49);
    }
}
