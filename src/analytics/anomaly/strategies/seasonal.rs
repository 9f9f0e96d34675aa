//! 季節残差戦略
//!
//! 値から季節成分（同位相の平均）とトレンド成分（中心移動平均）を
//! 差し引いた残差系列に対してZ-スコア判定を行う。

use super::stats::mean;
use super::{zscore, PointScore, ScoreKind};

/// デフォルトの季節長
pub const DEFAULT_SEASON_LENGTH: usize = 12;

/// 加法分解の結果
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    pub seasonal: Vec<f64>,
    pub trend: Vec<f64>,
    pub residual: Vec<f64>,
}

/// 系列を季節・トレンド・残差に分解
///
/// `values.len() < 2 * season_length`の場合は`None`。
pub fn decompose(values: &[f64], season_length: usize) -> Option<Decomposition> {
    let n = values.len();
    if season_length == 0 || n < 2 * season_length {
        return None;
    }

    let phase_means: Vec<f64> = (0..season_length)
        .map(|phase| {
            let same_phase: Vec<f64> = values
                .iter()
                .skip(phase)
                .step_by(season_length)
                .copied()
                .collect();
            mean(&same_phase)
        })
        .collect();

    let half = season_length / 2;
    let tail = season_length - half;

    let seasonal: Vec<f64> = (0..n).map(|i| phase_means[i % season_length]).collect();
    let trend: Vec<f64> = (0..n)
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + tail).min(n);
            mean(&values[start..end])
        })
        .collect();
    let residual: Vec<f64> = (0..n)
        .map(|i| values[i] - seasonal[i] - trend[i])
        .collect();

    Some(Decomposition {
        seasonal,
        trend,
        residual,
    })
}

/// 季節残差で系列全体を採点
///
/// データが2季節分に満たない場合や、残差が有限値に収まらない場合は
/// グローバルZ-スコアにフォールバックする。
pub fn score(values: &[f64], threshold: f64, season_length: usize) -> Vec<PointScore> {
    let Some(decomposition) = decompose(values, season_length)
        .filter(|d| d.residual.iter().all(|r| r.is_finite()))
    else {
        return zscore::score_global(values, threshold);
    };

    zscore::score_global(&decomposition.residual, threshold)
        .into_iter()
        .enumerate()
        .map(|(i, point)| {
            let mut point = point
                .with_meta("seasonal", decomposition.seasonal[i])
                .with_meta("trend", decomposition.trend[i])
                .with_meta("residual", decomposition.residual[i])
                .with_meta("season_length", season_length);
            point.kind = ScoreKind::SeasonalResidual;
            point.metadata.insert(
                "strategy".to_string(),
                ScoreKind::SeasonalResidual.as_str().into(),
            );
            point
        })
        .collect()
}
