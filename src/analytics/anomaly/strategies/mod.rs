//! Detection Strategies
//!
//! 各戦略はポイントごとの生スコアと異常フラグを返す。
//! 入力の順序は保持され、出力は常に入力と同じ長さになる。

pub mod ai;
pub mod iqr;
pub mod isolation;
pub mod seasonal;
pub mod stats;
pub mod zscore;

use super::types::Metadata;
use serde_json::Value;

/// スコアを生成した戦略の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreKind {
    /// 系列全体のZ-スコア
    GlobalZScore,
    /// ローリングウィンドウのZ-スコア
    RollingZScore,
    /// IQRフェンス
    Iqr,
    /// 局所密度
    LocalDensity,
    /// 季節残差
    SeasonalResidual,
    /// AIモデル
    Ai,
}

impl ScoreKind {
    /// メタデータ用の名前
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreKind::GlobalZScore => "zscore",
            ScoreKind::RollingZScore => "rolling_zscore",
            ScoreKind::Iqr => "iqr",
            ScoreKind::LocalDensity => "local_density",
            ScoreKind::SeasonalResidual => "seasonal_residual",
            ScoreKind::Ai => "ai",
        }
    }
}

/// ポイント単位の生スコア
#[derive(Debug, Clone, PartialEq)]
pub struct PointScore {
    /// 異常スコア（0以上）
    pub score: f64,
    /// 戦略による異常判定
    pub is_anomaly: bool,
    /// スコアの出所
    pub kind: ScoreKind,
    /// 戦略が使用した統計値
    pub metadata: Metadata,
}

impl PointScore {
    /// 新しいスコアを作成
    pub fn new(score: f64, is_anomaly: bool, kind: ScoreKind) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert("strategy".to_string(), Value::from(kind.as_str()));
        Self {
            score,
            is_anomaly,
            kind,
            metadata,
        }
    }

    /// 判定不能（データ不足・分散ゼロ）を表すスコア
    pub fn normal(kind: ScoreKind) -> Self {
        Self::new(0.0, false, kind)
    }

    /// メタデータを追加
    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// メタデータの数値を取得
    pub fn meta_f64(&self, key: &str) -> Option<f64> {
        self.metadata.get(key).and_then(Value::as_f64)
    }

    /// 2つの戦略の結果を統合（フラグは論理和、スコアは最大値）
    ///
    /// メタデータはスコアの大きい側を採用する。
    pub fn merge(self, other: PointScore) -> PointScore {
        let is_anomaly = self.is_anomaly || other.is_anomaly;
        let mut merged = if other.score > self.score { other } else { self };
        merged.is_anomaly = is_anomaly;
        merged
    }
}

/// 2つのスコア列を位置ごとに統合
pub fn merge_scores(primary: Vec<PointScore>, secondary: Vec<PointScore>) -> Vec<PointScore> {
    debug_assert_eq!(primary.len(), secondary.len());
    primary
        .into_iter()
        .zip(secondary)
        .map(|(a, b)| a.merge(b))
        .collect()
}
