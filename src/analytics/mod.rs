//! Analytics Module
//!
//! 時系列の異常検知と、検知結果の分析ユーティリティ

pub mod anomaly;
pub mod insights;

pub use anomaly::{AnomalyDetectionService, BatchDataset, BatchResult};
pub use insights::{
    calculate_anomaly_trends, filter_anomalies, generate_alerts, AnomalyAlert, AnomalyFilter,
    AnomalyTrend, TrendDirection,
};
