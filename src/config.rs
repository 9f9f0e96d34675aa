//! サービス設定
//!
//! デフォルト値 → 設定ファイル → 環境変数（`ANOMALY_`プレフィックス）の順に上書きする。

use crate::analytics::anomaly::DetectionOptions;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 設定ファイルの探索順
const CONFIG_PATHS: [&str; 2] = ["anomaly-config.toml", "config/anomaly.toml"];

/// サービス全体の設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// ログレベル
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    /// 呼び出し側が指定しない場合の検知オプション
    pub detection: DetectionOptions,
    /// AI検知の設定
    pub ai: AiDetectionConfig,
    /// 季節分解の設定
    pub seasonal: SeasonalConfig,
    /// リアルタイム検知の設定
    pub realtime: RealtimeConfig,
    /// バッチ実行の設定
    pub batch: BatchConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            detection: DetectionOptions::default(),
            ai: AiDetectionConfig::default(),
            seasonal: SeasonalConfig::default(),
            realtime: RealtimeConfig::default(),
            batch: BatchConfig::default(),
        }
    }
}

/// AI検知の設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiDetectionConfig {
    /// 使用するモデルID
    pub model_id: String,
    /// プロンプトに含める末尾の最大点数
    pub max_points: usize,
    /// 最大トークン数
    pub max_tokens: usize,
    /// 温度
    pub temperature: f32,
    /// モデルのスコアをこの値より大きい場合に異常とみなす
    pub score_threshold: f64,
    /// フォールバック時のZ-スコア閾値
    pub fallback_threshold: f64,
    /// テキスト生成呼び出し全体のタイムアウト（秒）。AI検知で唯一の制限時間
    pub timeout_secs: u64,
}

impl Default for AiDetectionConfig {
    fn default() -> Self {
        Self {
            model_id: "gpt-4o-mini".to_string(),
            max_points: 50,
            max_tokens: 1000,
            temperature: 0.1,
            score_threshold: 0.7,
            fallback_threshold: 2.5,
            timeout_secs: 30,
        }
    }
}

impl AiDetectionConfig {
    /// タイムアウトを取得
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 季節分解の設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonalConfig {
    /// 季節長
    pub season_length: usize,
}

impl Default for SeasonalConfig {
    fn default() -> Self {
        Self { season_length: 12 }
    }
}

/// リアルタイム検知の設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    /// 参照する履歴の点数
    pub window_size: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self { window_size: 50 }
    }
}

/// バッチ実行の設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// 同時に処理するデータセット数
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: num_cpus::get().max(1),
        }
    }
}

impl ServiceConfig {
    /// 設定ファイルから読み込み、環境変数で上書き
    pub fn load() -> Result<Self> {
        let path = CONFIG_PATHS.iter().map(Path::new).find(|p| p.exists());
        Self::build(path)
    }

    /// 指定した設定ファイルから読み込み、環境変数で上書き
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::InvalidConfiguration(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        Self::build(Some(path))
    }

    fn build(path: Option<&Path>) -> Result<Self> {
        let defaults = ::config::Config::try_from(&ServiceConfig::default()).map_err(config_err)?;
        let mut settings = ::config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            tracing::debug!("Loading configuration from {}", path.display());
            settings = settings.add_source(::config::File::from(path));
        }

        settings = settings.add_source(
            ::config::Environment::with_prefix("ANOMALY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: ServiceConfig = settings
            .build()
            .map_err(config_err)?
            .try_deserialize()
            .map_err(config_err)?;

        config.validate()?;
        Ok(config)
    }

    /// 設定を検証
    pub fn validate(&self) -> Result<()> {
        self.detection.validate()?;

        if self.realtime.window_size == 0 {
            return Err(Error::InvalidConfiguration(
                "realtime.window_size must be greater than 0".to_string(),
            ));
        }
        if self.seasonal.season_length == 0 {
            return Err(Error::InvalidConfiguration(
                "seasonal.season_length must be greater than 0".to_string(),
            ));
        }
        if self.batch.concurrency == 0 {
            return Err(Error::InvalidConfiguration(
                "batch.concurrency must be greater than 0".to_string(),
            ));
        }
        if self.ai.timeout_secs == 0 {
            return Err(Error::InvalidConfiguration(
                "ai.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.ai.max_points == 0 {
            return Err(Error::InvalidConfiguration(
                "ai.max_points must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.ai.score_threshold) {
            return Err(Error::InvalidConfiguration(
                "ai.score_threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !self.ai.fallback_threshold.is_finite() || self.ai.fallback_threshold <= 0.0 {
            return Err(Error::InvalidConfiguration(
                "ai.fallback_threshold must be a positive number".to_string(),
            ));
        }

        Ok(())
    }

    /// サンプル設定ファイルの内容を生成
    pub fn sample_toml() -> Result<String> {
        let body = toml::to_string_pretty(&ServiceConfig::default())
            .map_err(|e| Error::Internal(e.to_string()))?;

        Ok(format!(
            r#"# anomaly-rs configuration
#
# anomaly-config.toml として保存してください
# 環境変数での上書きも可能です (例: ANOMALY_DETECTION__THRESHOLD=2.5)

{}"#,
            body
        ))
    }
}

fn config_err(e: ::config::ConfigError) -> Error {
    Error::InvalidConfiguration(e.to_string())
}
