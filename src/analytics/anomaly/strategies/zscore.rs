//! Z-スコア戦略
//!
//! グローバルモードは系列全体の平均・標準偏差を一度だけ計算する。
//! ローリングモードは各位置で末尾`window`点（その位置を含む）を使う。

use super::stats::{mean_std, z_distance};
use super::{PointScore, ScoreKind};

/// ローリングウィンドウで判定に必要な最小点数
pub const MIN_WINDOW_POINTS: usize = 3;

/// Z-スコアで系列全体を採点
///
/// `window`が系列長以上の場合はグローバルモードと同一の結果になる。
pub fn score(values: &[f64], threshold: f64, window: Option<usize>) -> Vec<PointScore> {
    match window {
        Some(w) if w > 0 && w < values.len() => score_rolling(values, threshold, w),
        _ => score_global(values, threshold),
    }
}

/// 系列全体の統計によるZ-スコア
pub fn score_global(values: &[f64], threshold: f64) -> Vec<PointScore> {
    let (mean, std_dev) = mean_std(values);

    values
        .iter()
        .map(|&v| build(v, mean, std_dev, values.len(), threshold, ScoreKind::GlobalZScore))
        .collect()
}

/// 末尾ウィンドウの統計によるZ-スコア
pub fn score_rolling(values: &[f64], threshold: f64, window: usize) -> Vec<PointScore> {
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            score_window(&values[start..=i], threshold)
        })
        .collect()
}

/// 系列の最終点のみを採点（`score(values, ..)`の最終要素と一致）
pub fn score_last(values: &[f64], threshold: f64, window: Option<usize>) -> Option<PointScore> {
    let last = *values.last()?;
    match window {
        Some(w) if w > 0 && w < values.len() => {
            Some(score_window(&values[values.len() - w..], threshold))
        }
        _ => {
            let (mean, std_dev) = mean_std(values);
            Some(build(
                last,
                mean,
                std_dev,
                values.len(),
                threshold,
                ScoreKind::GlobalZScore,
            ))
        }
    }
}

fn score_window(window: &[f64], threshold: f64) -> PointScore {
    let Some(&current) = window.last() else {
        return PointScore::normal(ScoreKind::RollingZScore);
    };

    if window.len() < MIN_WINDOW_POINTS {
        return PointScore::normal(ScoreKind::RollingZScore)
            .with_meta("window_len", window.len())
            .with_meta("insufficient_data", true);
    }

    let (mean, std_dev) = mean_std(window);
    build(
        current,
        mean,
        std_dev,
        window.len(),
        threshold,
        ScoreKind::RollingZScore,
    )
}

fn build(
    value: f64,
    mean: f64,
    std_dev: f64,
    window_len: usize,
    threshold: f64,
    kind: ScoreKind,
) -> PointScore {
    let z = z_distance(value, mean, std_dev);
    PointScore::new(z, z > threshold, kind)
        .with_meta("mean", mean)
        .with_meta("std_dev", std_dev)
        .with_meta("window_len", window_len)
        .with_meta("threshold", threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spike_series(len: usize) -> Vec<f64> {
        let mut values = vec![1.0; len - 1];
        values.push(100.0);
        values
    }

    #[test]
    fn test_global_flags_spike() {
        // 定数列中の単一外れ値のZ-スコアは sqrt(n - 1)
        let scores = score_global(&spike_series(20), 3.0);
        assert_eq!(scores.len(), 20);
        assert!(scores[19].is_anomaly);
        assert!((scores[19].score - 19f64.sqrt()).abs() < 1e-9);
        assert!(scores[..19].iter().all(|s| !s.is_anomaly));
    }

    #[test]
    fn test_ten_point_spike_sits_on_threshold() {
        let scores = score_global(&spike_series(10), 3.0);
        assert!((scores[9].score - 3.0).abs() < 1e-9);
        assert!(score_global(&spike_series(10), 2.5)[9].is_anomaly);
    }

    #[test]
    fn test_constant_series_has_no_anomalies() {
        let scores = score_global(&[5.0; 20], 3.0);
        assert!(scores.iter().all(|s| s.score == 0.0 && !s.is_anomaly));

        let scores = score_rolling(&[5.0; 20], 3.0, 5);
        assert!(scores.iter().all(|s| s.score == 0.0 && !s.is_anomaly));
    }

    #[test]
    fn test_rolling_insufficient_window() {
        let values = [1.0, 50.0, 1.0, 2.0, 1.0];
        let scores = score_rolling(&values, 1.0, 4);
        assert_eq!(scores[0].score, 0.0);
        assert_eq!(scores[1].score, 0.0);
        assert!(!scores[1].is_anomaly);
        assert!(scores[2].score > 0.0);
    }

    #[test]
    fn test_rolling_window_uses_trailing_points() {
        let values = [10.0, 10.0, 10.0, 10.0, 1.0, 2.0, 3.0];
        let scores = score_rolling(&values, 3.0, 3);
        // 最終ウィンドウは [1, 2, 3]
        assert_eq!(scores[6].meta_f64("mean"), Some(2.0));
    }

    #[test]
    fn test_large_window_matches_global() {
        let values = [3.0, 4.0, 8.0, 1.0, 2.0, 30.0, 5.0];
        let global = score_global(&values, 2.0);
        assert_eq!(score(&values, 2.0, Some(values.len())), global);
        assert_eq!(score(&values, 2.0, Some(100)), global);
        assert_eq!(score(&values, 2.0, None), global);
    }

    #[test]
    fn test_score_last_matches_full_scoring() {
        let values = [3.0, 4.0, 8.0, 1.0, 2.0, 30.0, 5.0, 6.0, 40.0];
        for window in [None, Some(3), Some(5), Some(50)] {
            let full = score(&values, 2.0, window);
            let last = score_last(&values, 2.0, window).unwrap();
            assert_eq!(full.last().unwrap().score, last.score);
            assert_eq!(full.last().unwrap().is_anomaly, last.is_anomaly);
        }
        assert!(score_last(&[], 2.0, None).is_none());
    }
}
