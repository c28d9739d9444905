//! Hierarchical partition engine: turns the binary merge tree produced by
//! hierarchical agglomerative clustering ("HAC") into a bounded-depth,
//! size-balanced multi-way hierarchy suitable for treemap or sunburst charts,
//! with a representative label and cohesion score attached to every group.
//!
//! The pipeline has three stages, all pure functions of their inputs:
//!  1. A [`MergeTree`] normalizes a clustering result (or a restricted
//!     sub-table of one) into a read-only node table whose ids are assigned
//!     in merge-time order - the invariant the cut selection relies on;
//!  2. The [`TreeMapper`] repeatedly cuts each (sub)tree at its broadest
//!     merges, adaptively widening a cut while undersized groups remain,
//!     and stacks the resulting groups into layers linked by parent ids; and
//!  3. [`cluster_summary_simple`] ranks each group's members by cosine
//!     similarity to the group's embedding centroid to pick a label and
//!     score the group's tightness.
//!
//! Producing the merge tree, computing text embeddings and rendering the
//! output are external concerns; this crate only transforms merge tree in,
//! labeled hierarchy table out.
//!
//! # Examples
//! ```
//!use treecut::{MergeTree, TreeMapper};
//!
//!// Single-linkage merges over the 1-D points [1001, 1000, 1, 10, 99, 100, 101]
//!let linkage = vec![
//!    (0, 1, 1.0, 2),
//!    (5, 6, 1.0, 2),
//!    (4, 8, 1.0, 3),
//!    (2, 3, 9.0, 2),
//!    (9, 10, 89.0, 5),
//!    (7, 11, 899.0, 7),
//!];
//!let tree = MergeTree::from_linkage(&linkage).unwrap();
//!let groups = TreeMapper::default_params(&tree).build().unwrap();
//!
//!// The first layer splits the seven points into three groups
//!let layer_1: Vec<usize> = groups
//!    .iter()
//!    .filter(|group| group.parent.is_none())
//!    .map(|group| group.id)
//!    .collect();
//!assert_eq!(vec![9, 10, 7], layer_1);
//! ```

use num_traits::Float;

pub use crate::cut::{Cut, Group, Partition};
pub use crate::error::TreecutError;
pub use crate::hyper_parameters::{TreemapParams, TreemapParamsBuilder};
pub use crate::labeling::{cluster_summary_simple, ClusterSummary, LabeledGroup};
pub use crate::merge_tree::{LinkageRow, MergeNode, MergeTree, Subtree};

mod cut;
mod distance;
mod error;
mod hyper_parameters;
mod labeling;
mod merge_tree;

/// The layered partition builder. Borrows a merge tree and drives the
/// adaptive cut over it layer by layer: the first cut partitions the full
/// tree, then every resulting group's own sub-table is re-cut to produce the
/// next layer, down to the configured depth or until every group has
/// bottomed out to single leaves.
pub struct TreeMapper<'a, T> {
    tree: &'a MergeTree<T>,
    params: TreemapParams,
}

impl<'a, T: Float> TreeMapper<'a, T> {
    /// Creates a partition builder with a custom parameter configuration.
    ///
    /// # Parameters
    /// * `tree` - a reference to the merge tree to partition.
    /// * `params` - the partition parameter configuration.
    ///
    /// # Returns
    /// * The partition builder instance.
    ///
    /// # Examples
    /// ```
    ///use treecut::{MergeTree, TreemapParams, TreeMapper};
    ///
    ///let tree = MergeTree::from_linkage(&[(0, 1, 0.5, 2)]).unwrap();
    ///let params = TreemapParams::builder()
    ///    .depth(2)
    ///    .splits(4)
    ///    .min_size(0.05)
    ///    .build();
    ///let mapper = TreeMapper::new(&tree, params);
    /// ```
    pub fn new(tree: &'a MergeTree<T>, params: TreemapParams) -> Self {
        TreeMapper { tree, params }
    }

    /// Creates a partition builder with the default parameters: depth 3,
    /// 3-way splits, 10% minimal group size and a doubling widening budget.
    ///
    /// # Parameters
    /// * `tree` - a reference to the merge tree to partition.
    ///
    /// # Returns
    /// * The partition builder instance.
    pub fn default_params(tree: &'a MergeTree<T>) -> Self {
        TreeMapper::new(tree, TreemapParams::default())
    }

    /// Builds the layered hierarchy: the flat union of every layer's groups,
    /// first layer first, linked into a multi-way tree by their `parent` ids
    /// (`None` marks the synthetic root above the first layer).
    ///
    /// # Returns
    /// * A result that, if successful, contains the flat group table. An
    ///   error is returned if the tree turns out to be malformed while
    ///   walking it (inconsistent sizes, cycles, lost leaves).
    pub fn build(&self) -> Result<Vec<Group<T>>, TreecutError> {
        self.run(Self::expand_layer)
    }

    /// As [`TreeMapper::build`], fanning out over the groups of each layer
    /// in parallel. Sibling groups' sub-tables are disjoint by construction,
    /// so the fan-out needs no synchronization beyond the per-layer join,
    /// and the output is identical to the serial build.
    #[cfg(feature = "parallel")]
    pub fn build_par(&self) -> Result<Vec<Group<T>>, TreecutError>
    where
        T: Send + Sync,
    {
        self.run(Self::expand_layer_par)
    }

    fn run<F>(&self, expand: F) -> Result<Vec<Group<T>>, TreecutError>
    where
        F: Fn(&[Group<T>], &TreemapParams) -> Result<Vec<Group<T>>, TreecutError>,
    {
        if self.tree.is_empty() {
            return Err(TreecutError::EmptyTree);
        }
        let mut all_groups: Vec<Group<T>> = Vec::new();
        let mut current = self
            .tree
            .top_n_good_clusters(self.params.splits, self.params.min_size, self.params.max_extension)?
            .groups;

        for _ in 1..self.params.depth {
            if current.is_empty() {
                break;
            }
            let next = expand(&current, &self.params)?;
            all_groups.append(&mut current);
            current = next;
        }
        all_groups.append(&mut current);
        Ok(all_groups)
    }

    /// Runs [`TreeMapper::build`] and then labels every group via
    /// [`cluster_summary_simple`], pulling member texts and embeddings from
    /// the item-level parallel arrays (indexed by leaf id, so both must have
    /// one entry per original item, in input order).
    ///
    /// # Parameters
    /// * `texts` - one text per original item.
    /// * `embeddings` - one embedding vector per original item, parallel to
    ///   `texts`.
    ///
    /// # Returns
    /// * A result that, if successful, contains the labeled group table
    ///   consumed by the rendering layer. A length mismatch between the
    ///   arrays, or a leaf id outside them, is an error.
    pub fn build_labeled<S: AsRef<str>>(
        &self,
        texts: &[S],
        embeddings: &[Vec<T>],
    ) -> Result<Vec<LabeledGroup<T>>, TreecutError> {
        if texts.len() != embeddings.len() {
            return Err(TreecutError::LengthMismatch(format!(
                "{} item texts but {} embeddings",
                texts.len(),
                embeddings.len()
            )));
        }
        let groups = self.build()?;
        labeling::label_groups(groups, texts, embeddings, &self.params)
    }

    fn expand_layer(
        groups: &[Group<T>],
        params: &TreemapParams,
    ) -> Result<Vec<Group<T>>, TreecutError> {
        let mut next_layer = Vec::new();
        for group in groups {
            next_layer.extend(Self::expand_group(group, params)?);
        }
        Ok(next_layer)
    }

    #[cfg(feature = "parallel")]
    fn expand_layer_par(
        groups: &[Group<T>],
        params: &TreemapParams,
    ) -> Result<Vec<Group<T>>, TreecutError>
    where
        T: Send + Sync,
    {
        use rayon::prelude::*;

        let expanded = groups
            .par_iter()
            .map(|group| Self::expand_group(group, params))
            .collect::<Result<Vec<_>, TreecutError>>()?;
        Ok(expanded.into_iter().flatten().collect())
    }

    fn expand_group(
        group: &Group<T>,
        params: &TreemapParams,
    ) -> Result<Vec<Group<T>>, TreecutError> {
        // A single leaf has no further structure to cut
        if group.size <= 1 {
            return Ok(Vec::new());
        }
        let subtree = MergeTree::from_table(group.table.clone(), Some(group.id))?;
        let partition =
            subtree.top_n_good_clusters(params.splits, params.min_size, params.max_extension)?;
        Ok(partition.groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seven_point_linkage() -> Vec<LinkageRow<f64>> {
        vec![
            (0, 1, 1.0, 2),
            (5, 6, 1.0, 2),
            (4, 8, 1.0, 3),
            (2, 3, 9.0, 2),
            (9, 10, 89.0, 5),
            (7, 11, 899.0, 7),
        ]
    }

    #[test]
    fn build_stacks_layers_with_parent_links() {
        let tree = MergeTree::from_linkage(&seven_point_linkage()).unwrap();
        let groups = TreeMapper::default_params(&tree).build().unwrap();

        let layer_1: Vec<usize> = groups
            .iter()
            .filter(|g| g.parent.is_none())
            .map(|g| g.id)
            .collect();
        assert_eq!(vec![9, 10, 7], layer_1);

        // Group 9 = leaves {4, 5, 6} splits into three singletons
        let children_of_9: Vec<usize> = groups
            .iter()
            .filter(|g| g.parent == Some(9))
            .map(|g| g.id)
            .collect();
        assert_eq!(vec![5, 6, 4], children_of_9);

        // Every non-root parent is itself a group id
        let ids: Vec<usize> = groups.iter().map(|g| g.id).collect();
        for group in &groups {
            if let Some(parent) = group.parent {
                assert!(ids.contains(&parent));
            }
        }
    }

    #[test]
    fn depth_one_gives_a_single_layer() {
        let tree = MergeTree::from_linkage(&seven_point_linkage()).unwrap();
        let params = TreemapParams::builder().depth(1).build();
        let groups = TreeMapper::new(&tree, params).build().unwrap();
        assert!(groups.iter().all(|g| g.parent.is_none()));
        assert_eq!(3, groups.len());
    }

    #[test]
    fn deep_builds_bottom_out_without_error() {
        let tree = MergeTree::from_linkage(&seven_point_linkage()).unwrap();
        let params = TreemapParams::builder().depth(6).build();
        let groups = TreeMapper::new(&tree, params).build().unwrap();
        // Seven singleton leaves are the finest possible partition
        let singletons = groups.iter().filter(|g| g.size == 1).count();
        assert_eq!(7, singletons);
    }

    #[test]
    fn build_is_idempotent() {
        let tree = MergeTree::from_linkage(&seven_point_linkage()).unwrap();
        let mapper = TreeMapper::default_params(&tree);
        assert_eq!(mapper.build().unwrap(), mapper.build().unwrap());
    }

    #[test]
    fn build_labeled_rejects_mismatched_arrays() {
        let tree = MergeTree::from_linkage(&seven_point_linkage()).unwrap();
        let texts = vec!["a"; 7];
        let embeddings: Vec<Vec<f64>> = vec![vec![0.0, 1.0]; 6];
        let result = TreeMapper::default_params(&tree).build_labeled(&texts, &embeddings);
        assert!(matches!(result, Err(TreecutError::LengthMismatch(..))));
    }
}
