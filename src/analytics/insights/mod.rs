//! 検知結果の分析ユーティリティ
//!
//! いずれも検知結果に対する副作用のない関数。

mod alerts;
mod filter;
mod trend;

pub use alerts::{generate_alerts, AnomalyAlert};
pub use filter::{filter_anomalies, AnomalyFilter};
pub use trend::{calculate_anomaly_trends, AnomalyTrend, TrendDirection};
