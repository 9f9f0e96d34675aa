//! # anomaly-rs
//!
//! Time-series anomaly detection service.
//!
//! This crate provides a pluggable multi-method detector over time-stamped numeric
//! sequences: global and rolling Z-score, IQR fences, a local-density surrogate of an
//! isolation forest, seasonal-residual decomposition and an AI-backed strategy that
//! delegates scoring to an external text-completion model. On top of the strategies it
//! offers severity classification, confidence scoring, real-time single-point
//! evaluation, fault-isolated batch runs and pure analytics over detection results.

pub mod analytics;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod storage;

pub use analytics::anomaly::{
    AnomalyDetectionResult, AnomalyDetectionService, AnomalyResult, BatchDataset, BatchResult,
    DetectedAnomaly, DetectionMethod, DetectionOptions, DetectionSummary, Sensitivity, Severity,
    TimeSeriesPoint,
};
pub use analytics::insights::{
    calculate_anomaly_trends, filter_anomalies, generate_alerts, AnomalyAlert, AnomalyFilter,
    AnomalyTrend, TrendDirection,
};
pub use crate::config::ServiceConfig;
pub use error::{Error, Result};
