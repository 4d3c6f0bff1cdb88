//! Pairwise correlation between the numeric columns of the track table
//!
//! Builds the Pearson correlation matrix charted as a heatmap and picks out
//! the strongest relationships for the report text.

use crate::common::data_structures::{Measure, Track};

/// Coefficients beyond this magnitude are reported as strong correlations
pub const CORRELATION_THRESHOLD: f64 = 0.7;

/// Maximum number of findings reported per sign
pub const FINDINGS_PER_SIGN: usize = 3;

/// Symmetric correlation matrix over a set of measures
///
/// Undefined coefficients (constant columns) are stored as NaN.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub measures: Vec<Measure>,
    pub values: Vec<Vec<f64>>,
}

/// A single strongly correlated pair of measures
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationFinding {
    pub first: &'static str,
    pub second: &'static str,
    pub coefficient: f64,
}

/// Strong correlations, each list in ascending order of coefficient
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrongCorrelations {
    pub negative: Vec<CorrelationFinding>,
    pub positive: Vec<CorrelationFinding>,
}

impl StrongCorrelations {
    pub fn is_empty(&self) -> bool {
        self.negative.is_empty() && self.positive.is_empty()
    }
}

/// Pearson correlation coefficient of two equally long samples
///
/// Pairs where either side is not finite are left out. Returns `None` when fewer
/// than two complete pairs remain or when either side is constant.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(&x, &y)| (x, y))
        .collect();
    let n = pairs.len();
    if n < 2 {
        return None;
    }

    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n as f64;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n as f64;

    let mut covariance = 0.0;
    let mut variance_x = 0.0;
    let mut variance_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        variance_x += dx * dx;
        variance_y += dy * dy;
    }

    if variance_x == 0.0 || variance_y == 0.0 {
        return None;
    }

    Some((covariance / (variance_x.sqrt() * variance_y.sqrt())).clamp(-1.0, 1.0))
}

impl CorrelationMatrix {
    /// Computes the correlation of every pair of `measures` over `tracks`
    pub fn compute(tracks: &[Track], measures: &[Measure]) -> Self {
        let columns: Vec<Vec<f64>> = measures
            .iter()
            .map(|measure| tracks.iter().map(|track| measure.value(track)).collect())
            .collect();

        let size = measures.len();
        let mut values = vec![vec![f64::NAN; size]; size];
        for i in 0..size {
            for j in i..size {
                let coefficient = pearson(&columns[i], &columns[j]).unwrap_or(f64::NAN);
                values[i][j] = coefficient;
                values[j][i] = coefficient;
            }
        }

        Self {
            measures: measures.to_vec(),
            values,
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.measures.iter().map(|measure| measure.name()).collect()
    }

    /// Selects the strongest negative and positive relationships
    ///
    /// Only distinct off-diagonal pairs are considered. Negative findings are the
    /// most negative coefficients below `-threshold`; positive findings are the
    /// largest above `threshold`. Both lists are kept in ascending order.
    pub fn strong_correlations(&self, threshold: f64, limit: usize) -> StrongCorrelations {
        let mut pairs: Vec<CorrelationFinding> = Vec::new();
        for i in 0..self.measures.len() {
            for j in (i + 1)..self.measures.len() {
                let coefficient = self.values[i][j];
                if coefficient.is_nan() {
                    continue;
                }
                pairs.push(CorrelationFinding {
                    first: self.measures[i].name(),
                    second: self.measures[j].name(),
                    coefficient,
                });
            }
        }
        pairs.sort_by(|a, b| a.coefficient.total_cmp(&b.coefficient));

        let negative: Vec<CorrelationFinding> = pairs
            .iter()
            .filter(|pair| pair.coefficient < -threshold)
            .take(limit)
            .cloned()
            .collect();

        let positive_all: Vec<&CorrelationFinding> = pairs
            .iter()
            .filter(|pair| pair.coefficient > threshold)
            .collect();
        let skip = positive_all.len().saturating_sub(limit);
        let positive = positive_all.into_iter().skip(skip).cloned().collect();

        StrongCorrelations { negative, positive }
    }
}

/// Rounds to three decimals for display, dropping trailing zeros
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Renders the findings as an HTML fragment, one sentence per finding
pub fn describe_findings(findings: &StrongCorrelations) -> String {
    let negative = findings.negative.iter().map(|finding| {
        format!(
            "<b>Negative correlation</b> that equals {} has been detected <b>between {} and {}</b>.",
            round3(finding.coefficient),
            finding.first,
            finding.second
        )
    });
    let positive = findings.positive.iter().map(|finding| {
        format!(
            "<b>Correlation</b> that equals {} has been detected <b>between {} and {}</b>.",
            round3(finding.coefficient),
            finding.first,
            finding.second
        )
    });

    negative.chain(positive).collect::<Vec<_>>().join("<br>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::data_structures::{test_track, Category};

    fn matrix_from(values: Vec<Vec<f64>>) -> CorrelationMatrix {
        let measures = vec![
            Measure::Year,
            Measure::Explicit,
            Measure::Feature(Category::Energy),
            Measure::Feature(Category::Loudness),
        ];
        CorrelationMatrix { measures, values }
    }

    #[test]
    fn test_pearson_perfect_relations() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [2.0, 4.0, 6.0, 8.0];
        let zs = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&xs, &ys).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&xs, &zs).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_skips_incomplete_pairs() {
        let xs = [1.0, 2.0, f64::NAN, 3.0, 4.0];
        let ys = [2.0, 4.0, 100.0, 6.0, f64::NAN];
        assert!((pearson(&xs, &ys).unwrap() - 1.0).abs() < 1e-12);

        assert_eq!(pearson(&[1.0, f64::NAN], &[f64::NAN, 2.0]), None);
    }

    #[test]
    fn test_pearson_undefined() {
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]), None);
        assert_eq!(pearson(&[1.0], &[1.0]), None);
    }

    #[test]
    fn test_compute_matrix_is_symmetric() {
        let mut tracks = Vec::new();
        for (index, year) in (2000..2010).enumerate() {
            let mut track = test_track("A", year, index % 2 == 0, index as f64);
            track.energy = index as f64 / 10.0;
            track.loudness = -(index as f64);
            tracks.push(track);
        }
        let measures = vec![
            Measure::Year,
            Measure::Feature(Category::Energy),
            Measure::Feature(Category::Loudness),
            Measure::Feature(Category::Tempo),
        ];
        let matrix = CorrelationMatrix::compute(&tracks, &measures);

        assert!((matrix.values[0][1] - 1.0).abs() < 1e-9);
        assert!((matrix.values[1][2] + 1.0).abs() < 1e-9);
        assert_eq!(matrix.values[1][2], matrix.values[2][1]);
        // Tempo is constant in the fixture
        assert!(matrix.values[3][0].is_nan());
        assert_eq!(matrix.names(), vec!["year", "energy", "loudness", "tempo"]);
    }

    #[test]
    fn test_strong_correlations_threshold_and_order() {
        let matrix = matrix_from(vec![
            vec![1.0, -0.9, 0.75, 0.2],
            vec![-0.9, 1.0, -0.71, 0.95],
            vec![0.75, -0.71, 1.0, 0.7],
            vec![0.2, 0.95, 0.7, 1.0],
        ]);
        let findings = matrix.strong_correlations(CORRELATION_THRESHOLD, FINDINGS_PER_SIGN);

        assert_eq!(findings.negative.len(), 2);
        assert_eq!(findings.negative[0].coefficient, -0.9);
        assert_eq!(findings.negative[0].first, "year");
        assert_eq!(findings.negative[0].second, "explicit");
        assert_eq!(findings.negative[1].coefficient, -0.71);

        // 0.7 itself is not strictly above the threshold
        assert_eq!(findings.positive.len(), 2);
        assert_eq!(findings.positive[0].coefficient, 0.75);
        assert_eq!(findings.positive[1].coefficient, 0.95);
    }

    #[test]
    fn test_strong_correlations_limit_keeps_extremes() {
        let matrix = matrix_from(vec![
            vec![1.0, 0.71, 0.8, 0.9],
            vec![0.71, 1.0, 0.85, 0.99],
            vec![0.8, 0.85, 1.0, 0.1],
            vec![0.9, 0.99, 0.1, 1.0],
        ]);
        let findings = matrix.strong_correlations(CORRELATION_THRESHOLD, FINDINGS_PER_SIGN);

        let coefficients: Vec<f64> = findings.positive.iter().map(|f| f.coefficient).collect();
        assert_eq!(coefficients, vec![0.85, 0.9, 0.99]);
        assert!(findings.negative.is_empty());
    }

    #[test]
    fn test_describe_findings() {
        let findings = StrongCorrelations {
            negative: vec![CorrelationFinding {
                first: "energy",
                second: "acousticness",
                coefficient: -0.81234,
            }],
            positive: vec![CorrelationFinding {
                first: "loudness",
                second: "energy",
                coefficient: 0.78,
            }],
        };

        assert_eq!(
            describe_findings(&findings),
            "<b>Negative correlation</b> that equals -0.812 has been detected <b>between energy and acousticness</b>.\
             <br><b>Correlation</b> that equals 0.78 has been detected <b>between loudness and energy</b>."
        );
        assert_eq!(describe_findings(&StrongCorrelations::default()), "");
    }
}
