//! Median-split bounding-volume tree.
//!
//! A compact tree over a set of bounded items, built once and traversed
//! read-only. Items are referenced by index through a permutation array;
//! leaves hold small runs of that array. Construction splits on the
//! major axis of the item centroids at the median, giving a balanced
//! tree in O(n log n).

use tracing::debug;

use crate::Aabb;

const MAX_LEAF_SIZE: usize = 4;

/// A node of the tree: its bound and either a leaf run or two children.
#[derive(Debug)]
pub(crate) struct Node {
    pub bound: Aabb,
    pub kind: NodeKind,
}

/// Leaf runs index into the tree's permutation array.
#[derive(Debug, Clone, Copy)]
pub(crate) enum NodeKind {
    Leaf { first: usize, last: usize },
    Branch { low: usize, high: usize },
}

/// A bounding-volume tree over items `0..n`, where item `i` has bound
/// `bounds[i]` at construction time.
#[derive(Debug)]
pub(crate) struct BoundTree {
    nodes: Vec<Node>,
    perm: Vec<usize>,
    root: usize,
}

impl BoundTree {
    /// Build a tree over the given item bounds. An empty input yields a
    /// tree with no nodes; callers check for emptiness before querying.
    pub fn build(bounds: &[Aabb]) -> Self {
        let mut tree = Self {
            nodes: Vec::with_capacity(bounds.len() * 2),
            perm: (0..bounds.len()).collect(),
            root: 0,
        };
        if !bounds.is_empty() {
            tree.root = tree.build_range(bounds, 0, bounds.len());
        }
        debug!(
            items = bounds.len(),
            nodes = tree.nodes.len(),
            "built bound tree"
        );
        tree
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> usize {
        self.root
    }

    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    /// The item indices of a leaf run.
    pub fn items(&self, first: usize, last: usize) -> &[usize] {
        &self.perm[first..last]
    }

    fn build_range(&mut self, bounds: &[Aabb], first: usize, last: usize) -> usize {
        let mut bound = Aabb::empty();
        for &item in &self.perm[first..last] {
            bound.expand_to_include_box(&bounds[item]);
        }

        if last - first <= MAX_LEAF_SIZE {
            self.nodes.push(Node {
                bound,
                kind: NodeKind::Leaf { first, last },
            });
            return self.nodes.len() - 1;
        }

        let axis = major_axis(&self.perm[first..last], bounds);
        let mid = (last - first) / 2;
        self.perm[first..last].select_nth_unstable_by(mid, |&a, &b| {
            bounds[a].center()[axis].total_cmp(&bounds[b].center()[axis])
        });

        let low = self.build_range(bounds, first, first + mid);
        let high = self.build_range(bounds, first + mid, last);
        self.nodes.push(Node {
            bound,
            kind: NodeKind::Branch { low, high },
        });
        self.nodes.len() - 1
    }
}

/// The axis along which the item centroids spread the most.
fn major_axis(items: &[usize], bounds: &[Aabb]) -> usize {
    let mut extent = Aabb::empty();
    for &item in items {
        extent.expand_to_include(&bounds[item].center());
    }
    let size = extent.max - extent.min;
    let mut axis = 0;
    for candidate in 1..3 {
        if size[candidate] > size[axis] {
            axis = candidate;
        }
    }
    axis
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn point_bounds(n: usize) -> Vec<Aabb> {
        (0..n)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let p = Point3::new(i as f64, (i * 7 % 5) as f64, 0.0);
                let mut aabb = Aabb::empty();
                aabb.expand_to_include(&p);
                aabb
            })
            .collect()
    }

    fn collect_items(tree: &BoundTree, node: usize, out: &mut Vec<usize>) {
        match tree.node(node).kind {
            NodeKind::Leaf { first, last } => out.extend_from_slice(tree.items(first, last)),
            NodeKind::Branch { low, high } => {
                collect_items(tree, low, out);
                collect_items(tree, high, out);
            }
        }
    }

    #[test]
    fn tree_partitions_all_items() {
        let bounds = point_bounds(37);
        let tree = BoundTree::build(&bounds);
        let mut items = Vec::new();
        collect_items(&tree, tree.root(), &mut items);
        items.sort_unstable();
        assert_eq!(items, (0..37).collect::<Vec<_>>());
    }

    #[test]
    fn node_bounds_contain_children() {
        let bounds = point_bounds(50);
        let tree = BoundTree::build(&bounds);
        let mut items = Vec::new();
        collect_items(&tree, tree.root(), &mut items);
        let root_bound = tree.node(tree.root()).bound;
        for item in items {
            assert!(root_bound.distance_squared(&bounds[item].center()) == 0.0);
        }
    }

    #[test]
    fn empty_tree() {
        let tree = BoundTree::build(&[]);
        assert!(tree.is_empty());
    }
}
