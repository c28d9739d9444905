use crate::error::TreecutError;
use num_traits::Float;
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

/// One row of a linkage table produced by hierarchical agglomerative
/// clustering: `(left_child, right_child, distance, size)`. Rows must be in
/// merge-time order; row `i` of an N-leaf problem defines node `N + i`.
pub type LinkageRow<T> = (usize, usize, T, usize);

/// One node of the merge tree. Leaves have no children and a size of one;
/// internal nodes record the two merged children, the merge distance and the
/// number of original leaves underneath them.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeNode<T> {
    pub left_child: Option<usize>,
    pub right_child: Option<usize>,
    pub distance: T,
    pub size: usize,
}

impl<T: Float> MergeNode<T> {
    pub(crate) fn leaf() -> Self {
        MergeNode {
            left_child: None,
            right_child: None,
            distance: T::zero(),
            size: 1,
        }
    }

    /// Whether this node is an original data point rather than a merge.
    /// Leaves are identified by having no children, never by id range, so
    /// restricted sub-tables behave the same as full trees.
    pub fn is_leaf(&self) -> bool {
        self.left_child.is_none() && self.right_child.is_none()
    }

    pub(crate) fn children(&self) -> impl Iterator<Item = usize> + '_ {
        [self.left_child, self.right_child].into_iter().flatten()
    }
}

/// The leaves, internal nodes and restricted node table spanning one subtree,
/// as returned by [`MergeTree::get_members`].
#[derive(Debug, Clone, PartialEq)]
pub struct Subtree<T> {
    /// Sorted leaf ids in the subtree.
    pub members: Vec<usize>,
    /// Sorted internal node ids in the subtree, including the queried node
    /// itself when it is not a leaf.
    pub clusters: Vec<usize>,
    /// The node table restricted to exactly the subtree's ids.
    pub table: BTreeMap<usize, MergeNode<T>>,
}

/// A normalized view of a hierarchical clustering result: a read-only table
/// of nodes keyed by id. Node ids are assigned in merge-time order by the
/// upstream clustering, so a higher id always means a later, larger-or-equal
/// merge. The cut selection in this crate relies on that ordering.
///
/// A tree is built either from a raw linkage table
/// ([`MergeTree::from_linkage`]) or from a restricted sub-table of a larger
/// tree ([`MergeTree::from_table`]), which is how recursion over groups
/// descends without re-clustering.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeTree<T> {
    pub(crate) nodes: BTreeMap<usize, MergeNode<T>>,
    pub(crate) parent: Option<usize>,
}

impl<T: Float> MergeTree<T> {
    /// Builds a merge tree from a raw linkage table.
    ///
    /// # Parameters
    /// * `linkage` - merge records in merge-time order. For N original items
    ///   there must be N - 1 records, and record `i` defines node `N + i`.
    ///
    /// # Returns
    /// * The merge tree, or an error if the table is empty or inconsistent
    ///   (a child id that does not exist yet, a child merged twice, or a
    ///   record whose size is not the sum of its children's sizes).
    ///
    /// # Examples
    /// ```
    ///use treecut::MergeTree;
    ///
    ///// Two leaves merged into a single root, node 2.
    ///let tree = MergeTree::from_linkage(&[(0, 1, 0.5, 2)]).unwrap();
    ///assert_eq!(2, tree.root());
    /// ```
    pub fn from_linkage(linkage: &[LinkageRow<T>]) -> Result<Self, TreecutError> {
        if linkage.is_empty() {
            return Err(TreecutError::EmptyTree);
        }
        let n_leaves = linkage.len() + 1;
        let mut nodes: BTreeMap<usize, MergeNode<T>> =
            (0..n_leaves).map(|id| (id, MergeNode::leaf())).collect();
        let mut merged_away: HashSet<usize> = HashSet::new();

        for (n, &(left, right, distance, size)) in linkage.iter().enumerate() {
            let id = n_leaves + n;
            if !distance.is_finite() || distance < T::zero() {
                return Err(TreecutError::MalformedTree(format!(
                    "merge {id} has a negative or non-finite distance"
                )));
            }
            let mut child_size_sum = 0;
            for child in [left, right] {
                let child_node = nodes.get(&child).ok_or_else(|| {
                    TreecutError::MalformedTree(format!(
                        "merge {id} references child {child} which does not exist yet"
                    ))
                })?;
                child_size_sum += child_node.size;
                if !merged_away.insert(child) {
                    return Err(TreecutError::MalformedTree(format!(
                        "node {child} is merged more than once"
                    )));
                }
            }
            if size != child_size_sum {
                return Err(TreecutError::MalformedTree(format!(
                    "merge {id} has size {size} but its children sum to {child_size_sum}"
                )));
            }
            nodes.insert(
                id,
                MergeNode {
                    left_child: Some(left),
                    right_child: Some(right),
                    distance,
                    size,
                },
            );
        }
        Ok(MergeTree {
            nodes,
            parent: None,
        })
    }

    /// Builds a merge tree from a pre-restricted node table, typically the
    /// `table` of a [`crate::Group`] produced by an earlier cut.
    ///
    /// # Parameters
    /// * `table` - the node table. It must span one complete subtree: every
    ///   child referenced must be present, sizes must be consistent, and
    ///   exactly one node (the one with the highest id) must have no parent.
    /// * `parent` - the id recorded as the parent of groups cut from this
    ///   tree, or `None` for the synthetic root.
    pub fn from_table(
        table: BTreeMap<usize, MergeNode<T>>,
        parent: Option<usize>,
    ) -> Result<Self, TreecutError> {
        if table.is_empty() {
            return Err(TreecutError::EmptyTree);
        }
        let mut referenced: HashSet<usize> = HashSet::new();
        for (id, node) in &table {
            if node.is_leaf() {
                continue;
            }
            let (left, right) = match (node.left_child, node.right_child) {
                (Some(left), Some(right)) => (left, right),
                _ => {
                    return Err(TreecutError::MalformedTree(format!(
                        "node {id} has exactly one child"
                    )))
                }
            };
            let mut child_size_sum = 0;
            for child in [left, right] {
                let child_node = table.get(&child).ok_or_else(|| {
                    TreecutError::MalformedTree(format!(
                        "node {id} references child {child} which is not in the table"
                    ))
                })?;
                child_size_sum += child_node.size;
                if !referenced.insert(child) {
                    return Err(TreecutError::MalformedTree(format!(
                        "node {child} has more than one parent"
                    )));
                }
            }
            if node.size != child_size_sum {
                return Err(TreecutError::MalformedTree(format!(
                    "node {id} has size {} but its children sum to {child_size_sum}",
                    node.size
                )));
            }
        }
        let roots: Vec<usize> = table
            .keys()
            .filter(|id| !referenced.contains(id))
            .copied()
            .collect();
        // The highest id is the latest merge and must be the single root
        match roots.as_slice() {
            [root] if Some(root) == table.keys().last() => {}
            [root] => {
                return Err(TreecutError::MalformedTree(format!(
                    "root {root} is not the highest id in the table"
                )))
            }
            _ => {
                return Err(TreecutError::MalformedTree(format!(
                    "expected exactly one root, found {}",
                    roots.len()
                )))
            }
        }
        Ok(MergeTree {
            nodes: table,
            parent,
        })
    }

    /// The id of the tree's root, which is always the highest id present.
    pub fn root(&self) -> usize {
        // Construction guarantees a non-empty table
        *self.nodes.keys().last().expect("tree cannot be empty")
    }

    /// The parent tag recorded for groups cut from this tree. `None` is the
    /// synthetic top-level root.
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Looks up a node by id.
    pub fn node(&self, id: usize) -> Option<&MergeNode<T>> {
        self.nodes.get(&id)
    }

    /// The sorted ids of every node in the tree.
    pub fn ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes.keys().copied()
    }

    /// The number of nodes (leaves and merges) in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Recovers the subtree rooted at `id`: its sorted leaf ids, its internal
    /// node ids and the node table restricted to exactly those ids.
    ///
    /// The walk is a breadth-first descent visiting each node once; a repeat
    /// visit means the table contains a cycle and is reported as an error.
    ///
    /// # Examples
    /// ```
    ///use treecut::MergeTree;
    ///
    ///let tree = MergeTree::from_linkage(&[(0, 1, 0.5, 2)]).unwrap();
    ///let subtree = tree.get_members(2).unwrap();
    ///assert_eq!(vec![0, 1], subtree.members);
    ///assert_eq!(vec![2], subtree.clusters);
    ///assert_eq!(3, subtree.table.len());
    /// ```
    pub fn get_members(&self, id: usize) -> Result<Subtree<T>, TreecutError> {
        let mut visited: BTreeSet<usize> = BTreeSet::new();
        let mut frontier = VecDeque::from([id]);

        while let Some(current) = frontier.pop_front() {
            if !visited.insert(current) {
                return Err(TreecutError::MalformedTree(format!(
                    "cycle detected at node {current}"
                )));
            }
            let node = self.nodes.get(&current).ok_or_else(|| {
                TreecutError::MalformedTree(format!("node {current} is not in the table"))
            })?;
            for child in node.children() {
                frontier.push_back(child);
            }
        }

        let mut members = Vec::new();
        let mut clusters = Vec::new();
        let mut table = BTreeMap::new();
        for &visited_id in &visited {
            let node = &self.nodes[&visited_id];
            if node.is_leaf() {
                members.push(visited_id);
            } else {
                clusters.push(visited_id);
            }
            table.insert(visited_id, node.clone());
        }
        Ok(Subtree {
            members,
            clusters,
            table,
        })
    }
}
