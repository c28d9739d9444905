use num_traits::Float;

/// Cosine similarity between two vectors. If either vector has zero norm the
/// similarity is defined as zero.
pub(crate) fn cosine_similarity<T: Float>(a: &[T], b: &[T]) -> T {
    let dot = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x) * (*y))
        .fold(T::zero(), std::ops::Add::add);
    let norm_a = a
        .iter()
        .map(|x| (*x) * (*x))
        .fold(T::zero(), std::ops::Add::add)
        .sqrt();
    let norm_b = b
        .iter()
        .map(|x| (*x) * (*x))
        .fold(T::zero(), std::ops::Add::add)
        .sqrt();
    if norm_a == T::zero() || norm_b == T::zero() {
        T::zero()
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Element-wise mean of a non-empty collection of equal-length vectors.
pub(crate) fn centroid<T: Float>(vectors: &[Vec<T>]) -> Vec<T> {
    let n_dims = vectors[0].len();
    let count = T::from(vectors.len()).unwrap_or(T::one());
    let mut element_wise_mean = vec![T::zero(); n_dims];
    for vector in vectors {
        element_wise_mean = vector
            .iter()
            .zip(element_wise_mean.iter())
            .map(|(&element, &sum)| element + sum)
            .collect();
    }
    for element in element_wise_mean.iter_mut() {
        *element = *element / count;
    }
    element_wise_mean
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = vec![1.0_f64, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        let a = vec![1.0_f64, 0.0];
        let b = vec![0.0_f64, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-12);
    }

    #[test]
    fn cosine_of_opposite_vectors_is_minus_one() {
        let a = vec![1.0_f64, 1.0];
        let b = vec![-1.0_f64, -1.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_norm_operand_gives_zero() {
        let a = vec![0.0_f64, 0.0];
        let b = vec![1.0_f64, 2.0];
        assert_eq!(0.0, cosine_similarity(&a, &b));
    }

    #[test]
    fn centroid_is_element_wise_mean() {
        let vectors = vec![vec![1.0_f32, 2.0], vec![4.0, 5.0]];
        assert_eq!(vec![2.5, 3.5], centroid(&vectors));
    }
}
