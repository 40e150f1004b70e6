//! Reverse discounted running sums.
//!
//! This is the primitive under both GAE advantages and returns-to-go:
//! the advantage sequence is the discounted cumsum of TD residuals with
//! factor `gamma * lambda`, and the return sequence is the discounted
//! cumsum of rewards (plus bootstrap) with factor `gamma`.

/// Computes `out[i] = xs[i] + discount * out[i + 1]` over `xs`, with
/// `out[n] = 0`. Equivalently `out[i] = sum_j discount^j * xs[i + j]`.
///
/// Single backward pass, O(n). Returns an empty vector for empty input.
pub fn discount_cumsum(xs: &[f32], discount: f32) -> Vec<f32> {
    let mut out = vec![0.0; xs.len()];
    let mut running = 0.0;
    for (o, &x) in out.iter_mut().zip(xs).rev() {
        running = x + discount * running;
        *o = running;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(discount_cumsum(&[], 0.99).is_empty());
    }

    #[test]
    fn test_single_element_is_identity() {
        assert_eq!(discount_cumsum(&[3.5], 0.99), vec![3.5]);
    }

    #[test]
    fn test_zero_discount_is_identity() {
        let xs = [1.0, -2.0, 3.0, 0.5];
        assert_eq!(discount_cumsum(&xs, 0.0), xs.to_vec());
    }

    #[test]
    fn test_unit_discount_is_reverse_cumsum() {
        let xs = [1.0, 2.0, 3.0];
        assert_eq!(discount_cumsum(&xs, 1.0), vec![6.0, 5.0, 3.0]);
    }

    #[test]
    fn test_half_discount() {
        // out[2] = 1, out[1] = 1 + 0.5 * 1 = 1.5, out[0] = 1 + 0.5 * 1.5 = 1.75
        let out = discount_cumsum(&[1.0, 1.0, 1.0], 0.5);
        assert_eq!(out, vec![1.75, 1.5, 1.0]);
    }

    #[test]
    fn test_matches_recurrence_definition() {
        let xs = [0.3, -1.2, 4.0, 0.0, 2.5];
        let discount = 0.97;
        let out = discount_cumsum(&xs, discount);
        for i in 0..xs.len() {
            let next = if i + 1 < xs.len() { out[i + 1] } else { 0.0 };
            let expected = xs[i] + discount * next;
            assert!((out[i] - expected).abs() < 1e-6, "index {i}");
        }
    }
}
