use crate::cut::Group;
use crate::distance::{centroid, cosine_similarity};
use crate::error::TreecutError;
use crate::hyper_parameters::TreemapParams;
use crate::merge_tree::MergeNode;
use num_traits::Float;
use std::collections::BTreeMap;

/// A representative label and cohesion score for one group of members.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSummary<T> {
    /// The title-cased text of the member closest to the group centroid, or
    /// the configured placeholder for an empty group.
    pub label: String,
    /// The raw-cased texts of the top-n members by centroid similarity.
    pub top_members: Vec<String>,
    /// Mean rescaled centroid similarity across all members, in `[0, 1]`.
    /// Higher means a tighter group.
    pub score: T,
}

/// A [`Group`] with its label and cohesion score attached, one row of the
/// final hierarchy table handed to the rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledGroup<T> {
    pub id: usize,
    pub parent: Option<usize>,
    pub members: Vec<usize>,
    pub table: BTreeMap<usize, MergeNode<T>>,
    pub size: usize,
    pub label: String,
    pub top_members: Vec<String>,
    pub score: T,
}

/// Picks a representative label and cohesion score for one group.
///
/// Every member embedding is compared to the group centroid by cosine
/// similarity, rescaled from `[-1, 1]` to `[0, 1]` as `0.5 * (1 + c)`.
/// Members are ranked descending by that value; ties keep input order. The
/// score is the mean rescaled similarity across all members, so a
/// single-member group scores exactly 1. An empty group gets the placeholder
/// label and a score of 1.
///
/// # Parameters
/// * `texts` - the member texts
/// * `embeddings` - the member embedding vectors, parallel to `texts`
/// * `top_n` - how many top-ranked texts to keep in `top_members`
/// * `empty_label` - the label used when the group has no members
///
/// # Returns
/// * The summary, or an error if `texts` and `embeddings` differ in length.
///
/// # Examples
/// ```
///use treecut::cluster_summary_simple;
///
///let texts = ["a", "b"];
///let embeddings = vec![vec![1.0, 2.0], vec![4.0, 5.0]];
///let summary = cluster_summary_simple(&texts, &embeddings, 1, "all").unwrap();
///assert_eq!("B", summary.label);
///assert!(summary.score > 0.5 && summary.score < 1.0);
/// ```
pub fn cluster_summary_simple<T: Float, S: AsRef<str>>(
    texts: &[S],
    embeddings: &[Vec<T>],
    top_n: usize,
    empty_label: &str,
) -> Result<ClusterSummary<T>, TreecutError> {
    if texts.len() != embeddings.len() {
        return Err(TreecutError::LengthMismatch(format!(
            "{} member texts but {} embeddings",
            texts.len(),
            embeddings.len()
        )));
    }
    if texts.is_empty() {
        return Ok(ClusterSummary {
            label: empty_label.to_string(),
            top_members: Vec::new(),
            score: T::one(),
        });
    }

    let center = centroid(embeddings);
    let half = T::from(0.5).unwrap();
    let mut ranked: Vec<(usize, T)> = embeddings
        .iter()
        .map(|embedding| half * (T::one() + cosine_similarity(embedding, &center)))
        .enumerate()
        .collect();
    // Stable sort: equal similarities keep first-seen member order
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let count = T::from(texts.len()).unwrap_or(T::one());
    let score = ranked
        .iter()
        .map(|(_, similarity)| *similarity)
        .fold(T::zero(), std::ops::Add::add)
        / count;

    let top_members: Vec<String> = ranked
        .iter()
        .take(top_n)
        .map(|(n, _)| texts[*n].as_ref().to_string())
        .collect();
    let label = title_case(texts[ranked[0].0].as_ref());

    Ok(ClusterSummary {
        label,
        top_members,
        score,
    })
}

/// Attaches a label and score to every group, pulling each group's member
/// texts and embeddings out of the item-level parallel arrays by leaf id.
pub(crate) fn label_groups<T: Float, S: AsRef<str>>(
    groups: Vec<Group<T>>,
    texts: &[S],
    embeddings: &[Vec<T>],
    params: &TreemapParams,
) -> Result<Vec<LabeledGroup<T>>, TreecutError> {
    groups
        .into_iter()
        .map(|group| {
            let mut member_texts = Vec::with_capacity(group.members.len());
            let mut member_embeddings = Vec::with_capacity(group.members.len());
            for &member in &group.members {
                let text = texts.get(member).ok_or_else(|| {
                    TreecutError::LengthMismatch(format!(
                        "member {member} is outside the {}-item text/embedding arrays",
                        texts.len()
                    ))
                })?;
                member_texts.push(text.as_ref());
                member_embeddings.push(embeddings[member].clone());
            }
            let summary = cluster_summary_simple(
                &member_texts,
                &member_embeddings,
                params.label_top_n,
                &params.empty_label,
            )?;
            Ok(LabeledGroup {
                id: group.id,
                parent: group.parent,
                members: group.members,
                table: group.table,
                size: group.size,
                label: summary.label,
                top_members: summary.top_members,
                score: summary.score,
            })
        })
        .collect()
}

/// Python-style title casing: the first alphabetic character of every word is
/// uppercased and the rest lowercased, with any non-alphabetic character
/// acting as a word boundary.
pub(crate) fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for character in text.chars() {
        if character.is_alphabetic() {
            if at_word_start {
                out.extend(character.to_uppercase());
            } else {
                out.extend(character.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(character);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_group_gets_placeholder_and_perfect_score() {
        let texts: Vec<&str> = Vec::new();
        let embeddings: Vec<Vec<f64>> = Vec::new();
        let summary = cluster_summary_simple(&texts, &embeddings, 1, "blank").unwrap();
        assert_eq!("blank", summary.label);
        assert!(summary.top_members.is_empty());
        assert_eq!(1.0, summary.score);
    }

    #[test]
    fn single_member_scores_exactly_one() {
        let summary =
            cluster_summary_simple(&["only one"], &[vec![0.3_f64, 0.4]], 1, "all").unwrap();
        assert_eq!("Only One", summary.label);
        assert!((summary.score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn closest_to_centroid_wins() {
        // The centroid of [1, 2] and [4, 5] points closer to [4, 5]
        let summary = cluster_summary_simple(
            &["a", "b"],
            &[vec![1.0_f64, 2.0], vec![4.0, 5.0]],
            1,
            "all",
        )
        .unwrap();
        assert_eq!("B", summary.label);
        assert!(summary.score > 0.5);
        assert!(summary.score < 1.0);
    }

    #[test]
    fn top_n_keeps_raw_case_and_rank_order() {
        let summary = cluster_summary_simple(
            &["far OUT", "near centroid", "also near"],
            &[vec![-1.0_f64, 0.0], vec![1.0, 1.0], vec![1.0, 0.9]],
            3,
            "all",
        )
        .unwrap();
        assert_eq!(3, summary.top_members.len());
        assert_eq!("far OUT", summary.top_members[2]);
        assert_eq!(summary.label, title_case(&summary.top_members[0]));
    }

    #[test]
    fn ties_keep_input_order() {
        // Identical embeddings rank equally; the first member must win
        let summary = cluster_summary_simple(
            &["first", "second"],
            &[vec![1.0_f64, 1.0], vec![1.0, 1.0]],
            2,
            "all",
        )
        .unwrap();
        assert_eq!("First", summary.label);
        assert_eq!(vec!["first", "second"], summary.top_members);
    }

    #[test]
    fn mismatched_lengths() {
        let result = cluster_summary_simple(&["a"], &[] as &[Vec<f64>], 1, "all");
        assert!(matches!(result, Err(TreecutError::LengthMismatch(..))));
    }

    #[test]
    fn title_casing_matches_python() {
        assert_eq!("Hello World", title_case("hello world"));
        assert_eq!("Foobar Baz", title_case("fooBAR baz"));
        assert_eq!("Abc1Def", title_case("abc1def"));
        assert_eq!("", title_case(""));
    }
}
