//! Anomaly Detection Module
//!
//! 時系列に対する異常検知。戦略・重大度判定・サマリー算出と、
//! それらを束ねるサービス（一括・リアルタイム・バッチ）から成る。

mod batch;
mod detector;
mod realtime;
mod severity;
pub mod strategies;
mod summary;
mod types;

pub use batch::{BatchDataset, BatchResult};
pub use detector::AnomalyDetectionService;
pub use summary::{anomaly_rate, build_summary, confidence, recommendations};
pub use types::{
    AnomalyDetectionResult, AnomalyResult, DetectedAnomaly, DetectionMethod, DetectionOptions,
    DetectionSummary, Metadata, Sensitivity, Severity, TimeSeriesPoint,
};
