//! 重大度と説明文の生成

use super::strategies::{PointScore, ScoreKind};
use super::types::{AnomalyResult, Severity};

/// 生スコアを重大度・説明付きの結果に変換
pub fn to_result(value: f64, point: PointScore) -> AnomalyResult {
    let severity = Severity::from_score(point.score);
    let explanation = explain(value, &point, severity);

    AnomalyResult {
        is_anomaly: point.is_anomaly,
        score: point.score,
        severity,
        explanation,
        metadata: point.metadata,
    }
}

/// 説明文を生成
pub fn explain(value: f64, point: &PointScore, severity: Severity) -> String {
    if !point.is_anomaly {
        return format!("Value {:.2} is within the expected range", value);
    }

    let prefix = match severity {
        Severity::Critical => "Critical anomaly",
        Severity::High => "High deviation",
        Severity::Medium => "Moderate deviation",
        Severity::Low => "Minor deviation",
    };

    let detail = match point.kind {
        ScoreKind::GlobalZScore | ScoreKind::RollingZScore => {
            let scope = if point.kind == ScoreKind::RollingZScore {
                "rolling mean"
            } else {
                "mean"
            };
            format!(
                "value {:.2} is {:.2} standard deviations from the {} {:.2}",
                value,
                point.score,
                scope,
                point.meta_f64("mean").unwrap_or_default()
            )
        }
        ScoreKind::Iqr => format!(
            "value {:.2} lies outside the IQR fences [{:.2}, {:.2}]",
            value,
            point.meta_f64("lower_bound").unwrap_or_default(),
            point.meta_f64("upper_bound").unwrap_or_default()
        ),
        ScoreKind::LocalDensity => format!(
            "value {:.2} is isolated from its neighborhood mean {:.2} (density score {:.2})",
            value,
            point.meta_f64("neighborhood_mean").unwrap_or_default(),
            point.score
        ),
        ScoreKind::SeasonalResidual => format!(
            "value {:.2} departs from the seasonal pattern (residual {:.2}, {:.2} standard deviations)",
            value,
            point.meta_f64("residual").unwrap_or_default(),
            point.score
        ),
        ScoreKind::Ai => match point.metadata.get("model_explanation").and_then(|v| v.as_str()) {
            Some(reason) => format!("value {:.2} flagged by AI model: {}", value, reason),
            None => format!(
                "value {:.2} flagged by AI model with score {:.2}",
                value, point.score
            ),
        },
    };

    format!("{}: {}", prefix, detail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zscore_explanation() {
        let point = PointScore::new(4.2, true, ScoreKind::GlobalZScore).with_meta("mean", 10.0);
        let result = to_result(52.0, point);
        assert_eq!(result.severity, Severity::High);
        assert_eq!(
            result.explanation,
            "High deviation: value 52.00 is 4.20 standard deviations from the mean 10.00"
        );
    }

    #[test]
    fn test_normal_point_explanation() {
        let result = to_result(3.0, PointScore::normal(ScoreKind::Iqr));
        assert!(!result.is_anomaly);
        assert_eq!(result.severity, Severity::Low);
        assert!(result.explanation.contains("within the expected range"));
    }

    #[test]
    fn test_ai_explanation_uses_model_reason() {
        let point = PointScore::new(0.9, true, ScoreKind::Ai)
            .with_meta("model_explanation", "sudden drop");
        let result = to_result(1.0, point);
        assert!(result.explanation.ends_with("flagged by AI model: sudden drop"));
        assert!(result.explanation.starts_with("Minor deviation"));
    }

    #[test]
    fn test_iqr_explanation_contains_bounds() {
        let point = PointScore::new(6.0, true, ScoreKind::Iqr)
            .with_meta("lower_bound", 1.0)
            .with_meta("upper_bound", 9.0);
        let result = to_result(69.0, point);
        assert_eq!(result.severity, Severity::Critical);
        assert!(result.explanation.contains("[1.00, 9.00]"));
    }
}
