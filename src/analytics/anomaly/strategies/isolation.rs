//! 局所密度戦略（簡易Isolation Forest）
//!
//! 本物のIsolation Forestではない。各点の前後最大5点（自身を含む）の
//! 近傍平均・標準偏差からの乖離をスコアとし、降順で
//! `floor(n * contamination)`位のスコアを閾値として異常を判定する。
//! 木ベースの実装に置き換えるとスコア分布と意味が変わる点に注意。

use super::stats::{mean_std, z_distance};
use super::{PointScore, ScoreKind};

/// 近傍の片側幅
pub const NEIGHBORHOOD_RADIUS: usize = 5;

/// 局所密度スコアで系列全体を採点
pub fn score(values: &[f64], contamination: f64) -> Vec<PointScore> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }

    let raw: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let start = i.saturating_sub(NEIGHBORHOOD_RADIUS);
            let end = (i + NEIGHBORHOOD_RADIUS + 1).min(n);
            let (mean, std_dev) = mean_std(&values[start..end]);
            (z_distance(values[i], mean, std_dev), mean)
        })
        .collect();

    let mut ranked: Vec<f64> = raw.iter().map(|(s, _)| *s).collect();
    ranked.sort_by(|a, b| b.total_cmp(a));

    let rank = ((n as f64 * contamination).floor() as usize).min(n - 1);
    let cutoff = ranked[rank];

    raw.into_iter()
        .map(|(s, neighborhood_mean)| {
            PointScore::new(s, s >= cutoff, ScoreKind::LocalDensity)
                .with_meta("neighborhood_mean", neighborhood_mean)
                .with_meta("cutoff", cutoff)
                .with_meta("contamination", contamination)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isolated_spike_scores_highest() {
        let mut values: Vec<f64> = (0..30).map(|i| 10.0 + (i % 3) as f64).collect();
        values[15] = 80.0;

        let scores = score(&values, 0.05);
        let max_index = scores
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.score.total_cmp(&b.1.score))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(max_index, 15);
        assert!(scores[15].is_anomaly);
        // floor(30 * 0.05) = 1 → 上位2件のスコア以上が異常
        assert!(scores.iter().filter(|s| s.is_anomaly).count() >= 2);
    }

    #[test]
    fn test_contamination_controls_cutoff_rank() {
        let values: Vec<f64> = (0..20).map(|i| ((i * 7) % 11) as f64).collect();
        let strict = score(&values, 0.0).iter().filter(|s| s.is_anomaly).count();
        let loose = score(&values, 0.5).iter().filter(|s| s.is_anomaly).count();
        assert!(strict >= 1);
        assert!(loose >= strict);
    }

    #[test]
    fn test_contamination_above_one_is_clamped() {
        let values = [1.0, 2.0, 3.0, 4.0];
        let scores = score(&values, 2.0);
        assert!(scores.iter().all(|s| s.is_anomaly));
    }

    #[test]
    fn test_constant_series_scores_zero() {
        let scores = score(&[3.0; 8], 0.5);
        assert!(scores.iter().all(|s| s.score == 0.0));
    }

    #[test]
    fn test_empty_series() {
        assert!(score(&[], 0.5).is_empty());
    }
}
