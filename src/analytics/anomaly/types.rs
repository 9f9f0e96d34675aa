//! Anomaly Detection Types
//!
//! 異常検知用の型定義

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// メタデータ（戦略ごとの統計値など）
pub type Metadata = Map<String, Value>;

/// 時系列データポイント
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// タイムスタンプ
    pub timestamp: DateTime<Utc>,
    /// 値
    pub value: f64,
}

impl TimeSeriesPoint {
    /// 新しいデータポイントを作成
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// 異常検知手法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DetectionMethod {
    /// Z-スコア法（グローバル / ローリングウィンドウ）
    ZScore,
    /// IQR法（Tukeyフェンス）
    Iqr,
    /// 局所密度による簡易Isolation Forest
    IsolationForest,
    /// 予約済み（未実装、Z-スコアで代替）
    Lstm,
    /// 外部テキスト生成モデルによる検知
    AiDetection,
}

impl DetectionMethod {
    /// ワイヤ上の名前
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::ZScore => "zscore",
            DetectionMethod::Iqr => "iqr",
            DetectionMethod::IsolationForest => "isolation_forest",
            DetectionMethod::Lstm => "lstm",
            DetectionMethod::AiDetection => "ai_detection",
        }
    }

    /// 手法ごとの基本信頼度
    pub fn base_confidence(&self) -> f64 {
        match self {
            DetectionMethod::ZScore => 0.8,
            DetectionMethod::Iqr => 0.75,
            DetectionMethod::IsolationForest => 0.85,
            DetectionMethod::AiDetection => 0.9,
            DetectionMethod::Lstm => 0.7,
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetectionMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "zscore" => Ok(DetectionMethod::ZScore),
            "iqr" => Ok(DetectionMethod::Iqr),
            "isolation_forest" => Ok(DetectionMethod::IsolationForest),
            "lstm" => Ok(DetectionMethod::Lstm),
            "ai_detection" => Ok(DetectionMethod::AiDetection),
            other => Err(Error::UnsupportedMethod(other.to_string())),
        }
    }
}

impl TryFrom<String> for DetectionMethod {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<DetectionMethod> for String {
    fn from(method: DetectionMethod) -> Self {
        method.as_str().to_string()
    }
}

/// 感度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    /// 低感度（閾値 ×1.5）
    Low,
    /// 標準（閾値 ×1.0）
    Medium,
    /// 高感度（閾値 ×0.7）
    High,
}

impl Sensitivity {
    /// 閾値への乗数
    pub fn multiplier(&self) -> f64 {
        match self {
            Sensitivity::Low => 1.5,
            Sensitivity::Medium => 1.0,
            Sensitivity::High => 0.7,
        }
    }
}

impl FromStr for Sensitivity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "low" => Ok(Sensitivity::Low),
            "medium" => Ok(Sensitivity::Medium),
            "high" => Ok(Sensitivity::High),
            other => Err(Error::InvalidConfiguration(format!(
                "unknown sensitivity: {}",
                other
            ))),
        }
    }
}

/// 重大度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// 低
    Low,
    /// 中
    Medium,
    /// 高
    High,
    /// 致命的
    Critical,
}

impl Severity {
    /// スコアから重大度を決定（手法・閾値には依存しない）
    pub fn from_score(score: f64) -> Self {
        if score >= 5.0 {
            Severity::Critical
        } else if score >= 3.0 {
            Severity::High
        } else if score >= 2.0 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    /// 表示名
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 検知オプション
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionOptions {
    /// 検知手法
    pub method: DetectionMethod,
    /// 基本閾値（zscoreではσ倍数、iqrではIQR乗数）
    pub threshold: f64,
    /// ローリングウィンドウサイズ（zscoreのみ）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_size: Option<usize>,
    /// 感度
    pub sensitivity: Sensitivity,
    /// 季節調整を重ねるかどうか
    pub seasonal_adjustment: bool,
    /// 最小異常スコア（isolation_forestでは汚染率としても使用）
    pub min_anomaly_score: f64,
    /// AI検知に渡す補足コンテキスト
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            method: DetectionMethod::ZScore,
            threshold: 3.0,
            window_size: None,
            sensitivity: Sensitivity::Medium,
            seasonal_adjustment: false,
            min_anomaly_score: 0.5,
            context: None,
        }
    }
}

impl DetectionOptions {
    /// 手法を指定してオプションを作成
    pub fn new(method: DetectionMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// 閾値を設定
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// ウィンドウサイズを設定
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = Some(window_size);
        self
    }

    /// 感度を設定
    pub fn with_sensitivity(mut self, sensitivity: Sensitivity) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    /// 季節調整を設定
    pub fn with_seasonal_adjustment(mut self, enabled: bool) -> Self {
        self.seasonal_adjustment = enabled;
        self
    }

    /// 最小異常スコアを設定
    pub fn with_min_anomaly_score(mut self, min_anomaly_score: f64) -> Self {
        self.min_anomaly_score = min_anomaly_score;
        self
    }

    /// AI検知用のコンテキストを設定
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// 感度を反映した実効閾値
    ///
    /// 手法によって閾値の意味は異なるが、乗数はすべての手法に一律で適用する。
    pub fn adjusted_threshold(&self) -> f64 {
        self.threshold * self.sensitivity.multiplier()
    }

    /// オプションを検証
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "threshold must be a positive finite number, got {}",
                self.threshold
            )));
        }

        if self.window_size == Some(0) {
            return Err(Error::InvalidConfiguration(
                "window_size must be greater than 0".to_string(),
            ));
        }

        if !self.min_anomaly_score.is_finite() || self.min_anomaly_score < 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "min_anomaly_score must be a non-negative finite number, got {}",
                self.min_anomaly_score
            )));
        }

        Ok(())
    }
}

/// ポイント単位の異常検知結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyResult {
    /// 異常フラグ
    pub is_anomaly: bool,
    /// 異常スコア（0以上）
    pub score: f64,
    /// 重大度
    pub severity: Severity,
    /// 説明
    pub explanation: String,
    /// メタデータ
    #[serde(default)]
    pub metadata: Metadata,
}

/// 検出された異常
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedAnomaly {
    /// 入力系列上の位置（0始まり）
    pub index: usize,
    /// タイムスタンプ
    pub timestamp: DateTime<Utc>,
    /// 値
    pub value: f64,
    /// 判定結果
    pub result: AnomalyResult,
}

/// 検知実行のサマリー
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSummary {
    /// 異常の総数
    pub total_anomalies: usize,
    /// 異常率（入力長に対する百分率）
    pub anomaly_rate: f64,
    /// 重大度ごとの件数
    pub severity_distribution: BTreeMap<Severity, usize>,
    /// 使用した手法
    pub method_used: DetectionMethod,
    /// 信頼度（0.0-1.0）
    pub confidence: f64,
}

/// 検知実行の結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyDetectionResult {
    /// 検出された異常（入力順）
    pub anomalies: Vec<DetectedAnomaly>,
    /// サマリー
    pub summary: DetectionSummary,
    /// 推奨事項
    pub recommendations: Vec<String>,
}

impl AnomalyDetectionResult {
    /// 処理に失敗したデータセット用の縮退結果を作成
    pub fn degraded(method: DetectionMethod, reason: impl fmt::Display) -> Self {
        Self {
            anomalies: Vec::new(),
            summary: DetectionSummary {
                total_anomalies: 0,
                anomaly_rate: 0.0,
                severity_distribution: BTreeMap::new(),
                method_used: method,
                confidence: 0.0,
            },
            recommendations: vec![format!("Error processing dataset: {}", reason)],
        }
    }
}
