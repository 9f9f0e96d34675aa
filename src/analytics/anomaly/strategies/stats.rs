//! 記述統計ヘルパー
//!
//! 有限値のみの系列でも和や偏差の二乗は`f64::MAX`を超えうるため、
//! オーバーフロー時は縮小したスケールで計算し直す。結果は常に有限。

/// 平均値（空の場合は0）
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let sum = values.iter().sum::<f64>();
    if sum.is_finite() {
        sum / n
    } else {
        values
            .iter()
            .map(|v| v / n)
            .sum::<f64>()
            .clamp(-f64::MAX, f64::MAX)
    }
}

/// 母標準偏差（空の場合は0）
pub fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() || !mean.is_finite() {
        return 0.0;
    }
    let n = values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    if variance.is_finite() {
        return variance.sqrt();
    }

    // 最大偏差で正規化して再計算
    let halves: Vec<f64> = values.iter().map(|&v| half_gap(v, mean)).collect();
    let scale = halves.iter().fold(0.0_f64, |acc, d| acc.max(d.abs()));
    if scale == 0.0 {
        return 0.0;
    }
    let normalized = halves.iter().map(|d| (d / scale).powi(2)).sum::<f64>() / n;
    (scale * normalized.sqrt() * 2.0).min(f64::MAX)
}

/// 平均と標準偏差をまとめて計算
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    let m = mean(values);
    (m, std_dev(values, m))
}

/// 平均からの乖離をσ単位で返す（σが0なら0）
pub fn z_distance(value: f64, mean: f64, std_dev: f64) -> f64 {
    if !mean.is_finite() || !std_dev.is_finite() || std_dev < f64::EPSILON {
        return 0.0;
    }
    let gap = value - mean;
    let z = if gap.is_finite() {
        gap / std_dev
    } else {
        half_gap(value, mean) / (std_dev * 0.5)
    };
    saturate(z.abs())
}

/// `(a - b) / 2`をオーバーフローなしで計算
pub fn half_gap(a: f64, b: f64) -> f64 {
    a * 0.5 - b * 0.5
}

/// 非負スコアを有限範囲に収める（NaNは0）
pub fn saturate(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, f64::MAX)
    }
}

/// 第1・第3四分位数（最近傍順位法）
pub fn quartiles(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    let q1 = sorted[n / 4];
    let q3 = sorted[((3 * n) / 4).min(n - 1)];
    Some((q1, q3))
}
