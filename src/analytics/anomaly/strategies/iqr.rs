//! IQR戦略（Tukeyフェンス）
//!
//! 四分位数は常に系列全体から計算する。IQRが0の系列は判定しない。

use super::stats::{half_gap, quartiles, saturate};
use super::{PointScore, ScoreKind};

/// IQRフェンスで系列全体を採点
pub fn score(values: &[f64], multiplier: f64) -> Vec<PointScore> {
    let Some((q1, q3)) = quartiles(values) else {
        return Vec::new();
    };

    // 半分のスケールで保持し、極端な値域でも有限に保つ
    let half_iqr = half_gap(q3, q1);
    let lower_bound = q1 - multiplier * 2.0 * half_iqr;
    let upper_bound = q3 + multiplier * 2.0 * half_iqr;

    values
        .iter()
        .map(|&v| {
            let base = if half_iqr <= 0.0 {
                PointScore::normal(ScoreKind::Iqr).with_meta("degenerate_iqr", true)
            } else {
                let half_distance = if v < lower_bound {
                    half_gap(lower_bound, v)
                } else if v > upper_bound {
                    half_gap(v, upper_bound)
                } else {
                    0.0
                };
                let is_anomaly = v < lower_bound || v > upper_bound;
                PointScore::new(saturate(half_distance / half_iqr), is_anomaly, ScoreKind::Iqr)
            };

            base.with_meta("q1", q1)
                .with_meta("q3", q3)
                .with_meta("lower_bound", lower_bound)
                .with_meta("upper_bound", upper_bound)
        })
        .collect()
}

/// 系列の最終点のみを採点
pub fn score_last(values: &[f64], multiplier: f64) -> Option<PointScore> {
    score(values, multiplier).pop()
}
