use crate::error::TreecutError;
use crate::merge_tree::{MergeNode, MergeTree};
use num_traits::Float;
use std::collections::BTreeMap;

/// The boundary of a cut through the merge tree: the node ids whose subtrees
/// partition the covered leaves, their sizes, and the number of leaves
/// covered in total.
#[derive(Debug, Clone, PartialEq)]
pub struct Cut {
    pub boundary_ids: Vec<usize>,
    pub sizes: Vec<usize>,
    pub total_size: usize,
}

/// One output group: the subtree hanging off a boundary node, materialized
/// with its member leaves and the node table spanning exactly that subtree.
/// Groups are immutable once created; `id` and `parent` link them into the
/// final multi-way hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct Group<T> {
    pub id: usize,
    pub parent: Option<usize>,
    pub members: Vec<usize>,
    pub table: BTreeMap<usize, MergeNode<T>>,
    pub size: usize,
}

/// A completed partition of a tree's leaves into groups. Reaching the
/// extension budget while undersized groups remain is a normal outcome, not
/// an error; `budget_exhausted` flags it for the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition<T> {
    pub groups: Vec<Group<T>>,
    pub budget_exhausted: bool,
}

impl<T: Float> MergeTree<T> {
    /// Cuts the tree at its `k` most recent merges and returns the boundary
    /// of that cut.
    ///
    /// By the monotonic-id invariant the `k` highest ids are the `k` latest
    /// and broadest merges. The boundary is not those ids themselves but
    /// their direct children that fall outside the selected set: every leaf
    /// of the tree sits under exactly one such child, so the boundary
    /// subtrees are disjoint and exhaustive. Selected ids without children
    /// are dropped defensively, which matters for very small trees where
    /// `k` reaches into the leaves.
    ///
    /// # Examples
    /// ```
    ///use treecut::MergeTree;
    ///
    ///// Single linkage over the 1-D points [1001, 1000, 1, 10, 99, 100, 101]
    ///let tree = MergeTree::from_linkage(&[
    ///    (0, 1, 1.0, 2),
    ///    (5, 6, 1.0, 2),
    ///    (4, 8, 1.0, 3),
    ///    (2, 3, 9.0, 2),
    ///    (9, 10, 89.0, 5),
    ///    (7, 11, 899.0, 7),
    ///]).unwrap();
    ///let cut = tree.top_n_clusters(3);
    ///assert_eq!(vec![2, 3, 9, 7], cut.boundary_ids);
    ///assert_eq!(vec![1, 1, 3, 2], cut.sizes);
    ///assert_eq!(7, cut.total_size);
    /// ```
    pub fn top_n_clusters(&self, k: usize) -> Cut {
        let mut selected: Vec<usize> = self.nodes.keys().rev().take(k).copied().collect();
        selected.reverse();
        selected.retain(|id| !self.nodes[id].is_leaf());

        let mut boundary_ids = Vec::new();
        let mut sizes = Vec::new();
        let mut total_size = 0;
        for id in &selected {
            for child in self.nodes[id].children() {
                if selected.contains(&child) {
                    continue;
                }
                let size = self.nodes[&child].size;
                boundary_ids.push(child);
                sizes.push(size);
                total_size += size;
            }
        }
        Cut {
            boundary_ids,
            sizes,
            total_size,
        }
    }

    /// Partitions the tree's leaves into roughly `splits` groups, widening
    /// the cut while undersized groups remain and budget allows.
    ///
    /// Starting from `k = splits - 1` merges, the cut is re-run with `k`
    /// increased by the current count of groups smaller than `min_size`
    /// (as a fraction of the covered leaves), up to
    /// `max_k = floor(k * (1 + max_extension))`. The loop terminates
    /// unconditionally: `k` grows by at least one per iteration and is capped
    /// at `max_k`. There is no guarantee every final group meets `min_size`;
    /// when undersized groups survive at the budget cap the partition is
    /// returned with `budget_exhausted` set.
    ///
    /// Each boundary subtree is materialized into a [`Group`] whose `parent`
    /// is this tree's own parent tag. The sum of group sizes is checked
    /// against the cut's total; a shortfall means the tree is malformed and
    /// leaves were lost or double-counted.
    ///
    /// # Parameters
    /// * `splits` - the number of groups aimed for before any widening
    /// * `min_size` - minimal group size as a fraction of covered leaves
    /// * `max_extension` - how far past `splits - 1` the cut may widen,
    ///   proportionally; `1.0` allows the cut count to double
    pub fn top_n_good_clusters(
        &self,
        splits: usize,
        min_size: f64,
        max_extension: f64,
    ) -> Result<Partition<T>, TreecutError> {
        let mut k = splits.saturating_sub(1);
        let max_k = (k as f64 * (1.0 + max_extension)).floor() as usize;

        let mut cut = self.top_n_clusters(k);
        let mut n_tiny = count_tiny_groups(&cut, min_size);
        while n_tiny > 0 && k < max_k {
            k = (k + n_tiny).min(max_k);
            cut = self.top_n_clusters(k);
            n_tiny = count_tiny_groups(&cut, min_size);
        }
        let budget_exhausted = n_tiny > 0;

        let mut groups = Vec::with_capacity(cut.boundary_ids.len());
        let mut covered = 0;
        for &id in &cut.boundary_ids {
            let subtree = self.get_members(id)?;
            covered += subtree.members.len();
            groups.push(Group {
                id,
                parent: self.parent,
                size: subtree.members.len(),
                members: subtree.members,
                table: subtree.table,
            });
        }
        if covered != cut.total_size {
            return Err(TreecutError::MalformedTree(format!(
                "partition lost data: groups cover {covered} leaves but the cut spans {}",
                cut.total_size
            )));
        }
        Ok(Partition {
            groups,
            budget_exhausted,
        })
    }
}

fn count_tiny_groups(cut: &Cut, min_size: f64) -> usize {
    if cut.total_size == 0 {
        return 0;
    }
    let total = cut.total_size as f64;
    cut.sizes
        .iter()
        .filter(|&&size| (size as f64) / total < min_size)
        .count()
}
