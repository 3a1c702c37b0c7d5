//! StrRTree implementation.

use std::io::Write;
use std::ops::{Range, RangeInclusive};

use crate::config::IndexConfig;
use crate::geometry::Point;
use crate::rectangle::Rectangle;
use crate::shape::{Record, Shape};

use super::degree::{best_degree, leaf_count, node_count, tree_height};
use super::rtree_constants::MIN_DEGREE;
use super::rtree_types::{Node, SpatialError, SpatialResult, TreeStats};

/// Indices of the children of node `idx` in a tree of the given degree.
///
/// Nodes are numbered from 1 in breadth-first order, so the children of `idx`
/// are `idx * degree + r` for `r` in `2 - degree ..= 1`. Indices past the end
/// of the node array mean `idx` is a leaf.
pub fn children_of(idx: usize, degree: u32) -> RangeInclusive<usize> {
    let degree = degree as usize;
    let first = idx.saturating_sub(1) * degree + 2;
    first..=first + degree - 1
}

/// A Sort-Tile-Recursive packed R-Tree over an implicit node array.
///
/// The tree is sized once, filled once by [`StrRTree::bulk_load`], and is
/// read-only afterwards. Slot 0 of the array is unused; the root lives at
/// index 1 and the leaves occupy the last `num_leaves` slots.
///
/// # Example
/// ```rust
/// use str_spatial::{IndexConfig, Point, Rectangle, Shape, StrRTree};
///
/// let records: Vec<Shape> = (0..100)
///     .map(|i| Shape::Point(Point::new((i % 10) as f64, (i / 10) as f64)))
///     .collect();
///
/// let (tree, reordered) = StrRTree::build(records, &IndexConfig::default()).unwrap();
/// let hits = tree.query(&Shape::Rectangle(Rectangle::new(0.0, 0.0, 2.0, 2.0)));
/// let exact = str_spatial::refine(
///     reordered.records(),
///     &hits,
///     &Shape::Rectangle(Rectangle::new(0.0, 0.0, 2.0, 2.0)),
/// );
/// assert_eq!(exact.len(), 9);
/// ```
#[derive(Debug, Clone)]
pub struct StrRTree {
    pub(crate) degree: u32,
    pub(crate) height: u32,
    pub(crate) num_nodes: u32,
    pub(crate) num_leaves: u32,
    pub(crate) num_records: u32,
    pub(crate) tree: Vec<Option<Node>>,
    /// Ordinal of the first record each node covers, derived from the leaves
    pub(crate) first_record: Vec<u64>,
    pub(crate) loaded: bool,
}

/// Records in leaf order, as returned by [`StrRTree::bulk_load`].
///
/// `lines[i]` is the text encoding of `records[i]`. Writing the lines out in
/// order, each followed by a newline, produces the stream the tree's byte
/// offsets refer to.
#[derive(Debug, Clone)]
pub struct ReorderedRecords<R> {
    records: Vec<R>,
    lines: Vec<String>,
}

impl<R> ReorderedRecords<R> {
    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_records(self) -> Vec<R> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Length of the full record stream in bytes.
    pub fn total_bytes(&self) -> u64 {
        self.lines.iter().map(|l| l.len() as u64 + 1).sum()
    }

    /// Writes every line followed by a newline.
    pub fn write_to<W: Write>(&self, mut writer: W) -> SpatialResult<()> {
        for line in &self.lines {
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// The record stream as bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.total_bytes() as usize);
        for line in &self.lines {
            out.extend_from_slice(line.as_bytes());
            out.push(b'\n');
        }
        out
    }
}

impl StrRTree {
    /// Allocates an empty tree of the given height and degree.
    pub fn with_shape(height: u32, degree: u32) -> SpatialResult<Self> {
        if degree < MIN_DEGREE {
            return Err(SpatialError::InvalidOperation(format!(
                "degree must be at least {}, got {}",
                MIN_DEGREE, degree
            )));
        }
        if height == 0 {
            return Err(SpatialError::InvalidOperation(
                "height must be at least 1".into(),
            ));
        }

        let too_large = || {
            SpatialError::InvalidOperation(format!(
                "tree of height {} and degree {} has too many nodes",
                height, degree
            ))
        };
        let num_nodes = node_count(degree, height)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(too_large)?;
        let num_leaves = leaf_count(degree, height)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(too_large)?;

        let slots = num_nodes as usize + 1;
        Ok(Self {
            degree,
            height,
            num_nodes,
            num_leaves,
            num_records: 0,
            tree: vec![None; slots],
            first_record: vec![0; slots],
            loaded: false,
        })
    }

    /// Allocates an empty tree for `num_records` records whose node array
    /// fits `bytes_available`.
    pub fn with_budget(num_records: u32, bytes_available: u64) -> SpatialResult<Self> {
        let degree = best_degree(bytes_available, num_records as u64).ok_or(
            SpatialError::InfeasibleDegree {
                bytes_available,
                num_records: num_records as u64,
            },
        )?;
        let height = tree_height(num_records as u64, degree);
        let tree = Self::with_shape(height, degree)?;

        log::debug!(
            "Sized tree for {} records: degree {}, height {}, {} nodes",
            num_records,
            degree,
            height,
            tree.num_nodes
        );
        Ok(tree)
    }

    /// Sizes a tree for `records` under `config` and bulk loads it.
    pub fn build<R: Record>(
        records: Vec<R>,
        config: &IndexConfig,
    ) -> SpatialResult<(Self, ReorderedRecords<R>)> {
        let num_records = u32::try_from(records.len()).map_err(|_| {
            SpatialError::InvalidOperation(format!("too many records: {}", records.len()))
        })?;
        let mut tree = Self::with_budget(num_records, config.bytes_available)?;
        let reordered = tree.bulk_load(records, config.presorted_on_x)?;
        Ok((tree, reordered))
    }

    /// Packs `records` into the tree using Sort-Tile-Recursive ordering.
    ///
    /// # Algorithm
    /// 1. Sort by center x (skipped when `presorted_on_x`)
    /// 2. Cut into `ceil(sqrt(N / degree))` vertical slices of `degree` times
    ///    that many records
    /// 3. Sort each slice by center y, ties by x
    /// 4. Cut the resulting order into runs of `degree` records, one per leaf
    /// 5. Aggregate the internal levels bottom-up
    ///
    /// Both sorts are stable, so identical input always yields an identical
    /// tree. Returns the records in their new order along with their encoded
    /// lines.
    pub fn bulk_load<R: Record>(
        &mut self,
        records: Vec<R>,
        presorted_on_x: bool,
    ) -> SpatialResult<ReorderedRecords<R>> {
        if self.loaded {
            return Err(SpatialError::InvalidOperation(
                "tree has already been bulk loaded".into(),
            ));
        }
        if records.len() as u64 > self.capacity() {
            return Err(SpatialError::InvalidOperation(format!(
                "{} records exceed the capacity {} of a tree with degree {} and height {}",
                records.len(),
                self.capacity(),
                self.degree,
                self.height
            )));
        }

        if let Some((ordinal, mbr)) = records
            .iter()
            .map(Record::mbr)
            .enumerate()
            .find(|(_, mbr)| !mbr.is_valid())
        {
            return Err(SpatialError::InvalidGeometry(format!(
                "record {} has an invalid bounding rectangle {}",
                ordinal, mbr
            )));
        }

        let degree = self.degree as usize;
        let mut keyed: Vec<(Point, R)> = records
            .into_iter()
            .map(|record| (record.center_point(), record))
            .collect();

        if !presorted_on_x {
            keyed.sort_by(|a, b| a.0.x.total_cmp(&b.0.x));
        }

        let slice_count = ((keyed.len() as f64 / degree as f64).sqrt().ceil() as usize).max(1);
        for slice in keyed.chunks_mut(degree * slice_count) {
            slice.sort_by(|a, b| a.0.y.total_cmp(&b.0.y).then(a.0.x.total_cmp(&b.0.x)));
        }

        let records: Vec<R> = keyed.into_iter().map(|(_, record)| record).collect();
        let lines: Vec<String> = records.iter().map(Record::to_text).collect();

        let first_leaf = self.first_leaf_index();
        let mut offset = 0u64;
        for (leaf, start) in (0..records.len()).step_by(degree).enumerate() {
            let end = (start + degree).min(records.len());
            let mut mbr = Rectangle::empty();
            let mut size = 0u64;
            for (record, line) in records[start..end].iter().zip(&lines[start..end]) {
                mbr.expand(&record.mbr());
                size += line.len() as u64 + 1;
            }

            self.tree[first_leaf + leaf] = Some(Node::new(offset, size, (end - start) as u32, mbr));
            offset += size;
        }

        self.aggregate_internal_nodes();
        self.num_records = records.len() as u32;
        self.rebuild_record_index();
        self.loaded = true;

        log::info!(
            "Bulk loaded {} records ({} bytes) into {} leaves, degree {}, height {}",
            self.num_records,
            offset,
            records.len().div_ceil(degree),
            self.degree,
            self.height
        );

        Ok(ReorderedRecords { records, lines })
    }

    fn aggregate_internal_nodes(&mut self) {
        for idx in (1..self.first_leaf_index()).rev() {
            let children = self.children(idx);
            let Some(first) = self.node(*children.start()).copied() else {
                continue;
            };

            let mut parent = Node::new(first.offset, 0, 0, Rectangle::empty());
            for child in children {
                if let Some(node) = self.node(child) {
                    parent.size += node.size;
                    parent.count += node.count;
                    parent.mbr.expand(&node.mbr);
                }
            }
            self.tree[idx] = Some(parent);
        }
    }

    /// Recomputes the first record ordinal of every node from the leaf counts.
    pub(crate) fn rebuild_record_index(&mut self) {
        self.first_record = vec![0; self.tree.len()];

        let mut next = 0u64;
        for idx in self.first_leaf_index()..self.tree.len() {
            self.first_record[idx] = next;
            if let Some(node) = &self.tree[idx] {
                next += node.count as u64;
            }
        }
        for idx in (1..self.first_leaf_index()).rev() {
            let first_child = *self.children(idx).start();
            self.first_record[idx] = self.first_record.get(first_child).copied().unwrap_or(next);
        }
    }

    /// Maximum number of records the leaves can hold.
    pub fn capacity(&self) -> u64 {
        self.num_leaves as u64 * self.degree as u64
    }

    pub fn degree(&self) -> u32 {
        self.degree
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn num_nodes(&self) -> u32 {
        self.num_nodes
    }

    pub fn num_leaves(&self) -> u32 {
        self.num_leaves
    }

    pub fn num_records(&self) -> u32 {
        self.num_records
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The node array, slot 0 included.
    pub fn nodes(&self) -> &[Option<Node>] {
        &self.tree
    }

    /// Node at `idx`, or `None` for an empty or out-of-range slot.
    pub fn node(&self, idx: usize) -> Option<&Node> {
        self.tree.get(idx).and_then(Option::as_ref)
    }

    pub fn root(&self) -> Option<&Node> {
        self.node(1)
    }

    /// Index of the first leaf slot.
    pub fn first_leaf_index(&self) -> usize {
        (self.num_nodes - self.num_leaves) as usize + 1
    }

    pub fn is_leaf(&self, idx: usize) -> bool {
        *self.children(idx).start() > self.num_nodes as usize
    }

    /// Slots of the children of `idx`, see [`children_of`].
    pub fn children(&self, idx: usize) -> RangeInclusive<usize> {
        children_of(idx, self.degree)
    }

    /// Ordinals, in the reordered record stream, of every record that may
    /// intersect `query`.
    ///
    /// Results are conservative: whole leaves are returned, so callers refine
    /// candidates against exact geometry (see [`refine`]).
    pub fn query(&self, query: &Shape) -> Vec<u64> {
        let mut results = Vec::new();
        for idx in self.accepted_nodes(query) {
            let first = self.first_record[idx];
            let count = self.tree[idx].map_or(0, |node| node.count as u64);
            results.extend(first..first + count);
        }
        results
    }

    /// Byte ranges of the record stream covering every candidate of `query`,
    /// with adjacent runs merged.
    pub fn query_byte_ranges(&self, query: &Shape) -> Vec<Range<u64>> {
        let mut ranges: Vec<Range<u64>> = Vec::new();
        for idx in self.accepted_nodes(query) {
            let Some(node) = self.node(idx) else {
                continue;
            };
            let range = node.byte_range();
            match ranges.last_mut() {
                Some(last) if last.end == range.start => last.end = range.end,
                _ => ranges.push(range),
            }
        }
        ranges
    }

    /// [`StrRTree::query`] followed by [`refine`] against `records`, which
    /// must be in the reordered order.
    pub fn query_refined(&self, records: &[Shape], query: &Shape) -> Vec<u64> {
        refine(records, &self.query(query), query)
    }

    fn accepted_nodes(&self, query: &Shape) -> Vec<usize> {
        let mut accepted = Vec::new();
        if self.num_nodes > 0 {
            self.search_recursive(1, query, &mut accepted);
        }
        accepted
    }

    fn search_recursive(&self, idx: usize, query: &Shape, accepted: &mut Vec<usize>) {
        let Some(node) = self.node(idx) else {
            return;
        };

        let mbr = Shape::Rectangle(node.mbr);
        if !query.intersects(&mbr) && !query.is_edge_intersection(&mbr) {
            return;
        }

        // every descendant lies inside the query
        if query.has_area() && matches!(query.contains(&mbr), Ok(true)) {
            accepted.push(idx);
            return;
        }

        if self.is_leaf(idx) {
            accepted.push(idx);
            return;
        }

        for child in self.children(idx) {
            self.search_recursive(child, query, accepted);
        }
    }

    pub fn stats(&self) -> TreeStats {
        let occupied_nodes = self.tree.iter().filter(|n| n.is_some()).count() as u32;
        let occupied_leaves = self.tree[self.first_leaf_index()..]
            .iter()
            .filter(|n| n.is_some())
            .count();
        let leaf_fill_factor = if occupied_leaves == 0 {
            0.0
        } else {
            self.num_records as f64 / (occupied_leaves as f64 * self.degree as f64)
        };

        TreeStats {
            height: self.height,
            degree: self.degree,
            num_nodes: self.num_nodes,
            num_leaves: self.num_leaves,
            num_records: self.num_records,
            occupied_nodes,
            leaf_fill_factor,
        }
    }
}

impl PartialEq for StrRTree {
    fn eq(&self, other: &Self) -> bool {
        self.degree == other.degree
            && self.height == other.height
            && self.num_nodes == other.num_nodes
            && self.num_records == other.num_records
            && self.tree == other.tree
    }
}

/// Keeps the candidates whose record actually intersects `query`.
///
/// `records` must be the reordered records the candidates index into.
/// Out-of-range candidates are dropped.
pub fn refine(records: &[Shape], candidates: &[u64], query: &Shape) -> Vec<u64> {
    candidates
        .iter()
        .copied()
        .filter(|&ordinal| {
            records
                .get(ordinal as usize)
                .is_some_and(|record| record.intersects(query))
        })
        .collect()
}
