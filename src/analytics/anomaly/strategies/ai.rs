//! AI検知戦略
//!
//! 末尾の最大`max_points`点をテキスト生成モデルに送り、JSONで返された
//! スコアを採用する。呼び出し失敗・タイムアウト・不正なJSONはすべて
//! 固定閾値のグローバルZ-スコアにフォールバックし、呼び出し元にはエラーを返さない。

use super::{zscore, PointScore, ScoreKind};
use crate::config::AiDetectionConfig;
use crate::llm::{GenerationOptions, LlmError, LlmResult, TextCompletion};
use serde::Deserialize;
use std::fmt::Write as _;
use tracing::{debug, warn};

/// モデルのレスポンス
#[derive(Debug, Deserialize)]
struct AiResponse {
    anomalies: Vec<AiAnomaly>,
}

#[derive(Debug, Deserialize)]
struct AiAnomaly {
    index: usize,
    score: f64,
    #[serde(default)]
    explanation: Option<String>,
}

/// AI検知で系列全体を採点
pub async fn score(
    client: Option<&dyn TextCompletion>,
    config: &AiDetectionConfig,
    values: &[f64],
    context: Option<&str>,
) -> Vec<PointScore> {
    if values.is_empty() {
        return Vec::new();
    }

    let Some(client) = client else {
        warn!("AI detection requested without a text-completion client, falling back to Z-score");
        return fallback(values, config, "no text-completion client configured");
    };

    match request_scores(client, config, values, context).await {
        Ok(scores) => scores,
        Err(e) => {
            warn!("AI detection failed, falling back to Z-score: {}", e);
            fallback(values, config, &e.to_string())
        }
    }
}

async fn request_scores(
    client: &dyn TextCompletion,
    config: &AiDetectionConfig,
    values: &[f64],
    context: Option<&str>,
) -> LlmResult<Vec<PointScore>> {
    let prompt = build_prompt(values, config.max_points, context);
    let options = GenerationOptions {
        max_tokens: config.max_tokens,
        temperature: config.temperature,
    };

    let text = tokio::time::timeout(
        config.timeout(),
        client.generate_text(&config.model_id, &prompt, &options),
    )
    .await
    .map_err(|_| LlmError::Timeout(config.timeout_secs))??;

    parse_response(&text, values.len(), config.score_threshold)
}

/// プロンプトを構築
///
/// 各値は元の系列上のインデックス付きで列挙するため、
/// レスポンスのインデックスはそのまま元の位置を指す。
pub fn build_prompt(values: &[f64], max_points: usize, context: Option<&str>) -> String {
    let start = values.len().saturating_sub(max_points);

    let mut listing = String::new();
    for (i, v) in values.iter().enumerate().skip(start) {
        let _ = writeln!(listing, "{}: {}", i, v);
    }

    let mut prompt = format!(
        "Analyze the following time series for anomalies. Each line is `index: value`.\n\n{}",
        listing
    );

    if let Some(context) = context.filter(|c| !c.trim().is_empty()) {
        let _ = write!(prompt, "\nContext: {}\n", context.trim());
    }

    prompt.push_str(
        "\nRespond with JSON only, in exactly this shape:\n\
         {\"anomalies\": [{\"index\": <int>, \"score\": <number between 0 and 1>, \"explanation\": \"<string>\"}]}\n\
         Only include points you consider anomalous.",
    );
    prompt
}

/// レスポンスを検証してスコア列に変換
///
/// 形の不正・非有限スコア・負のスコアはエラー。範囲外のインデックスは無視する。
pub fn parse_response(text: &str, len: usize, score_threshold: f64) -> LlmResult<Vec<PointScore>> {
    let json = extract_json_object(text)
        .ok_or_else(|| LlmError::InvalidResponse("no JSON object in response".to_string()))?;

    let response: AiResponse = serde_json::from_str(json)?;

    let mut scores: Vec<PointScore> = (0..len)
        .map(|_| PointScore::normal(ScoreKind::Ai).with_meta("source", "model"))
        .collect();

    for entry in response.anomalies {
        if !entry.score.is_finite() || entry.score < 0.0 {
            return Err(LlmError::InvalidResponse(format!(
                "invalid score {} for index {}",
                entry.score, entry.index
            )));
        }

        let Some(slot) = scores.get_mut(entry.index) else {
            debug!("Ignoring AI anomaly with out-of-range index {}", entry.index);
            continue;
        };

        let mut point = PointScore::new(entry.score, entry.score > score_threshold, ScoreKind::Ai)
            .with_meta("source", "model");
        if let Some(explanation) = entry.explanation.filter(|e| !e.is_empty()) {
            point = point.with_meta("model_explanation", explanation);
        }
        *slot = point;
    }

    Ok(scores)
}

/// 最初の`{`から最後の`}`までを切り出す（コードフェンス対策）
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn fallback(values: &[f64], config: &AiDetectionConfig, reason: &str) -> Vec<PointScore> {
    zscore::score_global(values, config.fallback_threshold)
        .into_iter()
        .map(|point| {
            point
                .with_meta("source", "fallback")
                .with_meta("fallback_reason", reason)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedReply(String);

    #[async_trait]
    impl TextCompletion for FixedReply {
        async fn generate_text(
            &self,
            _model_id: &str,
            _prompt: &str,
            _options: &GenerationOptions,
        ) -> LlmResult<String> {
            Ok(self.0.clone())
        }
    }

    struct Failing;

    #[async_trait]
    impl TextCompletion for Failing {
        async fn generate_text(
            &self,
            _model_id: &str,
            _prompt: &str,
            _options: &GenerationOptions,
        ) -> LlmResult<String> {
            Err(LlmError::ApiError("service unavailable".to_string()))
        }
    }

    struct Stalled;

    #[async_trait]
    impl TextCompletion for Stalled {
        async fn generate_text(
            &self,
            _model_id: &str,
            _prompt: &str,
            _options: &GenerationOptions,
        ) -> LlmResult<String> {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            Ok(String::new())
        }
    }

    fn series() -> Vec<f64> {
        let mut values = vec![10.0; 20];
        values[7] = 95.0;
        values
    }

    #[test]
    fn test_prompt_uses_original_indices() {
        let values: Vec<f64> = (0..60).map(f64::from).collect();
        let prompt = build_prompt(&values, 50, Some("cpu usage"));
        assert!(!prompt.contains("\n9: 9\n"));
        assert!(prompt.contains("10: 10\n"));
        assert!(prompt.contains("59: 59\n"));
        assert!(prompt.contains("Context: cpu usage"));
    }

    #[test]
    fn test_parse_fenced_response() {
        let text = "```json\n{\"anomalies\": [{\"index\": 2, \"score\": 0.9, \"explanation\": \"spike\"}, {\"index\": 3, \"score\": 0.5}]}\n```";
        let scores = parse_response(text, 5, 0.7).unwrap();
        assert_eq!(scores.len(), 5);
        assert!(scores[2].is_anomaly);
        assert_eq!(scores[2].metadata["model_explanation"], "spike");
        assert!(!scores[3].is_anomaly);
        assert_eq!(scores[3].score, 0.5);
        assert_eq!(scores[0].score, 0.0);
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert!(parse_response("no json here", 5, 0.7).is_err());
        assert!(parse_response("{\"items\": []}", 5, 0.7).is_err());
        assert!(parse_response("{\"anomalies\": [{\"index\": -1, \"score\": 0.9}]}", 5, 0.7).is_err());
        assert!(parse_response("{\"anomalies\": [{\"index\": 1, \"score\": \"high\"}]}", 5, 0.7).is_err());
        assert!(parse_response("{\"anomalies\": [{\"index\": 1, \"score\": -0.2}]}", 5, 0.7).is_err());
    }

    #[test]
    fn test_parse_ignores_out_of_range_index() {
        let scores =
            parse_response("{\"anomalies\": [{\"index\": 99, \"score\": 0.9}]}", 5, 0.7).unwrap();
        assert!(scores.iter().all(|s| !s.is_anomaly));
    }

    #[tokio::test]
    async fn test_model_scores_are_used() {
        let client = FixedReply("{\"anomalies\": [{\"index\": 7, \"score\": 0.95}]}".to_string());
        let scores = score(Some(&client), &AiDetectionConfig::default(), &series(), None).await;
        assert!(scores[7].is_anomaly);
        assert_eq!(scores[7].metadata["source"], "model");
        assert_eq!(scores.iter().filter(|s| s.is_anomaly).count(), 1);
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_zscore() {
        let scores = score(Some(&Failing), &AiDetectionConfig::default(), &series(), None).await;
        assert_eq!(scores.len(), 20);
        assert!(scores[7].is_anomaly);
        assert_eq!(scores[7].kind, ScoreKind::GlobalZScore);
        assert_eq!(scores[7].metadata["source"], "fallback");
    }

    #[tokio::test]
    async fn test_malformed_json_falls_back() {
        let client = FixedReply("{\"anomalies\": [oops]}".to_string());
        let scores = score(Some(&client), &AiDetectionConfig::default(), &series(), None).await;
        assert_eq!(scores[7].metadata["source"], "fallback");
    }

    #[tokio::test]
    async fn test_missing_client_falls_back() {
        let scores = score(None, &AiDetectionConfig::default(), &series(), None).await;
        assert_eq!(scores[0].metadata["source"], "fallback");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back() {
        let config = AiDetectionConfig {
            timeout_secs: 1,
            ..AiDetectionConfig::default()
        };
        let scores = score(Some(&Stalled), &config, &series(), None).await;
        assert!(scores[7].is_anomaly);
        assert_eq!(scores[7].metadata["source"], "fallback");
    }
}
