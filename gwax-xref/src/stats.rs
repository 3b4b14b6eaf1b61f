//! Significance stratification over the p-values of matched variants.

use gwax_core::SignificanceThresholds;
use serde::Serialize;

/// Aggregate over the non-missing p-values of the matched rows.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SignificanceStats {
    pub total_with_pvalue: usize,
    pub significant_005: usize,
    pub significant_001: usize,
    pub genome_wide_significant: usize,
    pub min_pvalue: Option<f64>,
    pub median_pvalue: Option<f64>,
}

/// Compute threshold counts, minimum and median. Missing p-values are
/// excluded from every count and from min/median.
pub fn significance_stats(
    p_values: &[Option<f64>],
    thresholds: &SignificanceThresholds,
) -> SignificanceStats {
    let mut present: Vec<f64> = p_values.iter().filter_map(|p| *p).collect();

    // Thresholds are inclusive: a p-value sitting exactly on a cutoff counts.
    let significant_005 = present.iter().filter(|&&p| p <= thresholds.nominal).count();
    let significant_001 = present.iter().filter(|&&p| p <= thresholds.strong).count();
    let genome_wide_significant = present
        .iter()
        .filter(|&&p| p <= thresholds.genome_wide)
        .count();

    present.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let min_pvalue = present.first().copied();
    let median_pvalue = median_of_sorted(&present);

    SignificanceStats {
        total_with_pvalue: present.len(),
        significant_005,
        significant_001,
        genome_wide_significant,
        min_pvalue,
        median_pvalue,
    }
}

fn median_of_sorted(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

/// Indices of the `k` rows with the smallest p-values, ascending. Rows
/// without a p-value are skipped; ties keep original row order (stable sort).
pub fn top_k_indices(p_values: &[Option<f64>], k: usize) -> Vec<usize> {
    let mut indexed: Vec<(usize, f64)> = p_values
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.map(|v| (i, v)))
        .collect();
    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    indexed.truncate(k);
    indexed.into_iter().map(|(i, _)| i).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> SignificanceThresholds {
        SignificanceThresholds::default()
    }

    #[test]
    fn counts_thresholds_and_excludes_missing() {
        let p = vec![Some(0.2), Some(0.04), Some(5e-9), Some(0.001), None];
        let stats = significance_stats(&p, &thresholds());
        assert_eq!(stats.total_with_pvalue, 4);
        assert_eq!(stats.significant_005, 3);
        assert_eq!(stats.significant_001, 2);
        assert_eq!(stats.genome_wide_significant, 1);
        assert_eq!(stats.min_pvalue, Some(5e-9));
        // Median of [5e-9, 0.001, 0.04, 0.2] = (0.001 + 0.04) / 2.
        assert_eq!(stats.median_pvalue, Some((0.001 + 0.04) / 2.0));
    }

    #[test]
    fn values_on_a_cutoff_are_counted() {
        let p = vec![Some(0.05), Some(0.001), Some(5e-8)];
        let stats = significance_stats(&p, &thresholds());
        assert_eq!(stats.significant_005, 3);
        assert_eq!(stats.significant_001, 2);
        assert_eq!(stats.genome_wide_significant, 1);
    }

    #[test]
    fn empty_input_has_no_min_or_median() {
        let stats = significance_stats(&[], &thresholds());
        assert_eq!(stats.total_with_pvalue, 0);
        assert_eq!(stats.min_pvalue, None);
        assert_eq!(stats.median_pvalue, None);
    }

    #[test]
    fn odd_count_median_is_middle_value() {
        let p = vec![Some(0.3), Some(0.1), Some(0.2)];
        let stats = significance_stats(&p, &thresholds());
        assert_eq!(stats.median_pvalue, Some(0.2));
    }

    #[test]
    fn top_k_is_capped_and_ascending() {
        let p = vec![Some(0.5), Some(1e-9), None, Some(0.01)];
        assert_eq!(top_k_indices(&p, 10), vec![1, 3, 0]);
        assert_eq!(top_k_indices(&p, 2), vec![1, 3]);
    }

    #[test]
    fn top_k_ties_keep_row_order() {
        let p = vec![Some(0.01), Some(0.01), Some(0.001), Some(0.01)];
        assert_eq!(top_k_indices(&p, 4), vec![2, 0, 1, 3]);
    }
}
