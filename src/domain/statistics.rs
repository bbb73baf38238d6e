// Summary statistics over sensor series
use serde::Serialize;

/// Average, maximum and minimum of the measured values in a series.
///
/// An empty series yields `0.0` for every statistic with `samples == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub average: f64,
    pub max: f64,
    pub min: f64,
    pub samples: usize,
}

impl Summary {
    pub const EMPTY: Summary = Summary {
        average: 0.0,
        max: 0.0,
        min: 0.0,
        samples: 0,
    };

    /// Summarizes a series where `None` marks a missing reading.
    pub fn of_readings<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut sum = 0.0;
        let mut max = f64::NEG_INFINITY;
        let mut min = f64::INFINITY;
        let mut samples = 0usize;

        for value in values.into_iter().flatten().filter(|v| v.is_finite()) {
            sum += value;
            max = max.max(value);
            min = min.min(value);
            samples += 1;
        }

        if samples == 0 {
            return Self::EMPTY;
        }

        // Float rounding can push the mean a hair outside the observed range.
        let average = (sum / samples as f64).clamp(min, max);
        Self {
            average,
            max,
            min,
            samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn of(values: impl IntoIterator<Item = f64>) -> Summary {
        Summary::of_readings(values.into_iter().map(Some))
    }

    #[test]
    fn test_summary_of_values() {
        let summary = of([18.0, 22.0, 20.0]);
        assert_eq!(summary.average, 20.0);
        assert_eq!(summary.max, 22.0);
        assert_eq!(summary.min, 18.0);
        assert_eq!(summary.samples, 3);
    }

    #[test]
    fn test_missing_values_are_skipped() {
        let summary = Summary::of_readings([None, Some(4.0), None, Some(-2.0)]);
        assert_eq!(summary.average, 1.0);
        assert_eq!(summary.max, 4.0);
        assert_eq!(summary.min, -2.0);
        assert_eq!(summary.samples, 2);
    }

    #[test]
    fn test_empty_input_yields_sentinel() {
        assert_eq!(of(Vec::new()), Summary::EMPTY);
        let all_missing = Summary::of_readings([None, None]);
        assert_eq!(all_missing.samples, 0);
        assert_eq!(all_missing.average, 0.0);
    }

    #[test]
    fn test_zero_readings_are_not_empty() {
        let summary = of([0.0, 0.0]);
        assert_eq!(summary.samples, 2);
        assert_eq!(summary.average, 0.0);
    }

    #[test]
    fn test_average_stays_between_min_and_max() {
        let series: Vec<Vec<f64>> = vec![
            vec![0.1, 0.1, 0.1],
            vec![1e-12, 1e12, -3.5],
            vec![7.0],
            vec![-0.3, -0.3, -0.3, -0.3, -0.3, -0.3, -0.3],
            (0..100).map(|i| (i as f64) * 0.37 - 12.0).collect(),
        ];
        for values in series {
            let summary = of(values.clone());
            assert!(
                summary.min <= summary.average && summary.average <= summary.max,
                "{values:?} -> {summary:?}"
            );
        }
    }
}
