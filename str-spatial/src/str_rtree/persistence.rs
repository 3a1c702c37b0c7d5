//! Text and binary persistence of the node array, plus integrity checking.
//!
//! The text layout is line oriented:
//!
//! ```text
//! height,degree,numRecords,numNodes
//! offset,size,count,minX,minY,maxX,maxY     <- node 1
//! null                                      <- an unused slot
//! ...                                       <- one line per node up to numNodes
//! ```
//!
//! Reading always re-verifies the aggregate bookkeeping, so a layout that
//! parses but does not describe a consistent tree is rejected.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::rectangle::Rectangle;

use super::degree::node_count;
use super::rtree_constants::{MIN_DEGREE, NULL_NODE};
use super::rtree_impl::StrRTree;
use super::rtree_types::{
    IntegrityReport, Node, SnapshotWithChecksum, SpatialError, SpatialResult, TreeSnapshot,
};

fn malformed(message: impl Into<String>) -> SpatialError {
    SpatialError::Serialization(message.into())
}

fn parse_field<T: std::str::FromStr>(field: &str, what: &str, line_no: usize) -> SpatialResult<T> {
    field
        .trim()
        .parse()
        .map_err(|_| malformed(format!("line {}: invalid {} '{}'", line_no, what, field)))
}

fn parse_header(line: &str) -> SpatialResult<[u32; 4]> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != 4 {
        return Err(malformed(format!(
            "line 1: expected 4 header fields, found {}",
            fields.len()
        )));
    }

    let names = ["height", "degree", "numRecords", "numNodes"];
    let mut header = [0u32; 4];
    for (slot, (field, name)) in header.iter_mut().zip(fields.iter().zip(names)) {
        *slot = parse_field(field, name, 1)?;
    }
    Ok(header)
}

fn parse_node(line: &str, line_no: usize) -> SpatialResult<Option<Node>> {
    let line = line.trim();
    if line == NULL_NODE {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != 7 {
        return Err(malformed(format!(
            "line {}: expected 7 node fields, found {}",
            line_no,
            fields.len()
        )));
    }

    let offset = parse_field(fields[0], "offset", line_no)?;
    let size = parse_field(fields[1], "size", line_no)?;
    let count = parse_field(fields[2], "count", line_no)?;
    let mut coords = [0f64; 4];
    for (slot, field) in coords.iter_mut().zip(&fields[3..]) {
        *slot = parse_field(field, "coordinate", line_no)?;
    }

    Ok(Some(Node::new(
        offset,
        size,
        count,
        Rectangle::new(coords[0], coords[1], coords[2], coords[3]),
    )))
}

/// Rejects a header whose degree could not come from a bulk load of
/// `num_records`, or whose node count does not match its shape.
fn check_header(height: u32, degree: u32, num_records: u32, num_nodes: u32) -> SpatialResult<()> {
    let max_degree = num_records.max(MIN_DEGREE);
    if degree < MIN_DEGREE || degree > max_degree {
        return Err(malformed(format!(
            "line 1: degree {} outside {}..={} for {} records",
            degree, MIN_DEGREE, max_degree, num_records
        )));
    }
    if height == 0 {
        return Err(malformed("line 1: height must be at least 1"));
    }
    match node_count(degree, height) {
        Some(expected) if expected == num_nodes as u64 => Ok(()),
        expected => Err(malformed(format!(
            "line 1: height {} and degree {} need {} nodes, header declares {}",
            height,
            degree,
            expected.map_or_else(|| "too many".to_string(), |n| n.to_string()),
            num_nodes
        ))),
    }
}

fn node_line(node: &Option<Node>) -> String {
    match node {
        None => NULL_NODE.to_string(),
        Some(n) => format!(
            "{},{},{},{},{},{},{}",
            n.offset,
            n.size,
            n.count,
            n.mbr.min_x(),
            n.mbr.min_y(),
            n.mbr.max_x(),
            n.mbr.max_y()
        ),
    }
}

impl StrRTree {
    /// Writes the header and every node slot in the text layout.
    pub fn write_to<W: Write>(&self, mut writer: W) -> SpatialResult<()> {
        writeln!(
            writer,
            "{},{},{},{}",
            self.height, self.degree, self.num_records, self.num_nodes
        )?;
        for node in &self.tree[1..] {
            writeln!(writer, "{}", node_line(node))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Reads a tree in the text layout and verifies its integrity.
    pub fn read_from<R: BufRead>(reader: R) -> SpatialResult<Self> {
        let mut lines = reader.lines();

        let header = lines
            .next()
            .transpose()?
            .ok_or_else(|| malformed("missing header line"))?;
        let [height, degree, num_records, num_nodes] = parse_header(header.trim())?;
        check_header(height, degree, num_records, num_nodes)?;

        // grown from the input so a lying header cannot force a large allocation
        let mut nodes = Vec::new();
        for idx in 1..=num_nodes as usize {
            let line = lines
                .next()
                .transpose()?
                .ok_or_else(|| malformed(format!("missing line for node {}", idx)))?;
            nodes.push(parse_node(&line, idx + 1)?);
        }

        for line in lines {
            if !line?.trim().is_empty() {
                return Err(malformed("trailing data after the node array"));
            }
        }

        Self::from_snapshot(TreeSnapshot {
            height,
            degree,
            num_records,
            num_nodes,
            nodes,
        })
    }

    /// The text layout as a string.
    pub fn serialize(&self) -> String {
        let mut out = format!(
            "{},{},{},{}\n",
            self.height, self.degree, self.num_records, self.num_nodes
        );
        for node in &self.tree[1..] {
            out.push_str(&node_line(node));
            out.push('\n');
        }
        out
    }

    pub fn deserialize(text: &str) -> SpatialResult<Self> {
        Self::read_from(text.as_bytes())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> SpatialResult<()> {
        let file = File::create(path.as_ref())?;
        self.write_to(BufWriter::new(file))?;
        log::debug!(
            "Saved tree with {} nodes to {}",
            self.num_nodes,
            path.as_ref().display()
        );
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> SpatialResult<Self> {
        let file = File::open(path.as_ref())?;
        let tree = Self::read_from(BufReader::new(file))?;
        log::debug!(
            "Loaded tree with {} nodes from {}",
            tree.num_nodes,
            path.as_ref().display()
        );
        Ok(tree)
    }

    /// Header fields and node array, slot 0 excluded.
    pub fn snapshot(&self) -> TreeSnapshot {
        TreeSnapshot {
            height: self.height,
            degree: self.degree,
            num_records: self.num_records,
            num_nodes: self.num_nodes,
            nodes: self.tree[1..].to_vec(),
        }
    }

    /// Rebuilds a tree from a snapshot and verifies its integrity.
    ///
    /// The header is checked against the node count before anything is
    /// allocated for it.
    pub fn from_snapshot(snapshot: TreeSnapshot) -> SpatialResult<Self> {
        check_header(
            snapshot.height,
            snapshot.degree,
            snapshot.num_records,
            snapshot.num_nodes,
        )?;
        if snapshot.nodes.len() != snapshot.num_nodes as usize {
            return Err(malformed(format!(
                "snapshot holds {} nodes, header declares {}",
                snapshot.nodes.len(),
                snapshot.num_nodes
            )));
        }

        let mut tree = Self::with_shape(snapshot.height, snapshot.degree)
            .map_err(|e| malformed(e.to_string()))?;
        tree.num_records = snapshot.num_records;
        tree.tree[1..].copy_from_slice(&snapshot.nodes);
        tree.seal()
    }

    /// Checksummed bincode encoding of the snapshot.
    pub fn to_binary(&self) -> SpatialResult<Vec<u8>> {
        let wrapped = SnapshotWithChecksum::new(self.snapshot())?;
        bincode::serde::encode_to_vec(&wrapped, bincode::config::legacy())
            .map_err(|e| SpatialError::Serialization(e.to_string()))
    }

    pub fn from_binary(bytes: &[u8]) -> SpatialResult<Self> {
        let wrapped: SnapshotWithChecksum =
            bincode::serde::decode_from_slice(bytes, bincode::config::legacy())
                .map(|(wrapped, _)| wrapped)
                .map_err(|e| SpatialError::Serialization(e.to_string()))?;
        Self::from_snapshot(wrapped.into_snapshot()?)
    }

    fn seal(mut self) -> SpatialResult<Self> {
        let report = self.check_integrity();
        if !report.is_valid {
            log::warn!(
                "Rejected node array with {} inconsistent nodes",
                report.invalid_nodes.len()
            );
            return Err(malformed(format!(
                "inconsistent node array: {}",
                report.errors.join("; ")
            )));
        }

        self.rebuild_record_index();
        self.loaded = true;
        Ok(self)
    }

    /// Verifies the aggregate bookkeeping of the node array.
    ///
    /// Leaves must form one contiguous run of byte ranges starting at offset 0
    /// with no gaps between occupied slots, and their counts must add up to
    /// `num_records`. Every internal node must start where its first child
    /// starts, carry the sums of its children's sizes and counts, and cover
    /// every child MBR. A slot whose first child is empty must be empty too.
    pub fn check_integrity(&self) -> IntegrityReport {
        let mut report = IntegrityReport::new();

        if self.tree.first().is_some_and(Option::is_some) {
            report.record_error(0, "slot 0 must be empty".into());
        }

        let first_leaf = self.first_leaf_index();
        let mut next_offset = 0u64;
        let mut total = 0u64;
        let mut seen_gap = false;
        for idx in first_leaf..self.tree.len() {
            let Some(leaf) = self.node(idx) else {
                seen_gap = true;
                continue;
            };
            report.nodes_checked += 1;

            if seen_gap {
                report.record_error(idx, format!("leaf {} follows an empty leaf slot", idx));
            }
            if leaf.offset != next_offset {
                report.record_error(
                    idx,
                    format!("leaf {} starts at {}, expected {}", idx, leaf.offset, next_offset),
                );
            }
            if leaf.count == 0 || leaf.count > self.degree {
                report.record_error(idx, format!("leaf {} holds {} records", idx, leaf.count));
            }
            if !leaf.mbr.is_valid() {
                report.record_error(idx, format!("leaf {} has an invalid MBR", idx));
            }
            next_offset = leaf.offset.saturating_add(leaf.size);
            total += leaf.count as u64;
        }

        if total != self.num_records as u64 {
            report.record_error(
                0,
                format!(
                    "leaf counts sum to {}, header declares {} records",
                    total, self.num_records
                ),
            );
        }

        for idx in 1..first_leaf {
            let children = self.children(idx);
            let first_child = self.node(*children.start());

            let (node, first_child) = match (self.node(idx), first_child) {
                (None, None) => continue,
                (Some(_), None) => {
                    report.record_error(idx, format!("node {} has no first child", idx));
                    report.nodes_checked += 1;
                    continue;
                }
                (None, Some(_)) => {
                    report.record_error(idx, format!("node {} is empty but has children", idx));
                    continue;
                }
                (Some(node), Some(first)) => (node, first),
            };
            report.nodes_checked += 1;

            let mut size = 0u64;
            let mut count = 0u64;
            for child in children.filter_map(|c| self.node(c)) {
                size = size.saturating_add(child.size);
                count += child.count as u64;
                if !node.mbr.contains_rectangle(&child.mbr) {
                    report.record_error(idx, format!("node {} does not cover a child MBR", idx));
                }
            }

            if node.offset != first_child.offset {
                report.record_error(
                    idx,
                    format!(
                        "node {} starts at {}, first child at {}",
                        idx, node.offset, first_child.offset
                    ),
                );
            }
            if node.size != size {
                report.record_error(idx, format!("node {} size {} != {}", idx, node.size, size));
            }
            if node.count as u64 != count {
                report.record_error(idx, format!("node {} count {} != {}", idx, node.count, count));
            }
        }

        report
    }
}
