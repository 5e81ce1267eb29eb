//! 结果存储服务 - 业务能力层
//!
//! 结果以 JSON 数组的形式保存，按产品名去重；
//! 同一个文件里的历史文案同时作为唯一性评分的语料库。

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::error::{CorpusError, FileError};
use crate::models::ResultRecord;
use crate::services::capabilities::CorpusSource;

/// 语料读取只关心文案字段，兼容旧格式的记录
#[derive(Debug, Deserialize)]
struct StoredDescription {
    #[serde(default)]
    generated_description: String,
}

/// JSON 结果文件
#[derive(Debug, Clone)]
pub struct JsonResultStore {
    path: PathBuf,
}

impl JsonResultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    /// 读取文件中的原始条目，文件不存在或为空时返回空列表
    async fn load_entries(&self) -> Result<Vec<Value>, FileError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|source| FileError::ReadFailed {
                path: self.display_path(),
                source,
            })?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|source| FileError::SerializeFailed {
            path: self.display_path(),
            source,
        })
    }

    /// 读取全部完整记录；缺字段的旧格式条目被跳过
    pub async fn load_records(&self) -> Result<Vec<ResultRecord>, FileError> {
        let entries = self.load_entries().await?;
        let total = entries.len();
        let records: Vec<ResultRecord> = entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect();
        if records.len() < total {
            debug!("跳过 {} 条旧格式记录: {}", total - records.len(), self.display_path());
        }
        Ok(records)
    }

    /// 合并保存：同名产品的旧条目被新记录替换，其余条目原样保留
    ///
    /// 合并在 JSON 值层面进行，旧格式条目不会因缺字段而导致保存失败。
    /// 先写临时文件再重命名，避免中途失败留下半个文件。
    pub async fn save_records(&self, new_records: &[ResultRecord]) -> Result<usize, FileError> {
        let mut entries = self.load_entries().await?;

        for record in new_records {
            let value = serde_json::to_value(record).map_err(|source| {
                FileError::SerializeFailed {
                    path: self.display_path(),
                    source,
                }
            })?;
            match entries.iter_mut().find(|entry| {
                entry.get("product_name").and_then(Value::as_str)
                    == Some(record.product_name.as_str())
            }) {
                Some(existing) => *existing = value,
                None => entries.push(value),
            }
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|source| FileError::WriteFailed {
                        path: parent.display().to_string(),
                        source,
                    })?;
            }
        }

        let json = serde_json::to_string_pretty(&entries).map_err(|source| {
            FileError::SerializeFailed {
                path: self.display_path(),
                source,
            }
        })?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .await
            .map_err(|source| FileError::WriteFailed {
                path: tmp_path.display().to_string(),
                source,
            })?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|source| FileError::WriteFailed {
                path: self.display_path(),
                source,
            })?;

        info!("💾 已保存 {} 条结果到 {}", entries.len(), self.display_path());
        Ok(entries.len())
    }
}

#[async_trait]
impl CorpusSource for JsonResultStore {
    async fn load_corpus(&self) -> Result<Vec<String>, CorpusError> {
        if !self.path.exists() {
            debug!("语料文件不存在，使用空语料: {}", self.display_path());
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| CorpusError::Unavailable {
                path: self.display_path(),
                source: Box::new(e),
            })?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let stored: Vec<StoredDescription> =
            serde_json::from_str(&content).map_err(|source| CorpusError::Malformed {
                path: self.display_path(),
                source,
            })?;

        Ok(stored
            .into_iter()
            .map(|d| d.generated_description)
            .filter(|d| !d.trim().is_empty())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateVersion, RefinementSummary, ScoreBreakdown, StopReason};

    fn temp_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("seo_refiner_store_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let _ = std::fs::remove_file(&path);
        path
    }

    fn record(name: &str, description: &str) -> ResultRecord {
        ResultRecord {
            product_name: name.to_string(),
            features: vec![],
            target_audience: String::new(),
            used_keywords: Default::default(),
            description_a: description.to_string(),
            score_a: 1.0,
            detailed_scores_a: ScoreBreakdown::default(),
            description_b: String::new(),
            score_b: 0.0,
            detailed_scores_b: ScoreBreakdown::default(),
            selected_version: CandidateVersion::A,
            generated_description: description.to_string(),
            seo_score: 1.0,
            detailed_seo_scores: ScoreBreakdown::default(),
            refinement: RefinementSummary {
                rounds_attempted: 0,
                rounds_accepted: 0,
                stop_reason: StopReason::Disabled,
                round_scores: vec![],
            },
            generated_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn missing_file_is_an_empty_corpus() {
        let store = JsonResultStore::new(temp_file("missing.json"));
        let corpus = store.load_corpus().await.unwrap();
        assert!(corpus.is_empty());
    }

    #[tokio::test]
    async fn save_upserts_by_product_name() {
        let path = temp_file("upsert.json");
        let store = JsonResultStore::new(&path);

        store
            .save_records(&[record("Lamp", "old lamp"), record("Mug", "mug text")])
            .await
            .unwrap();
        let total = store.save_records(&[record("Lamp", "new lamp")]).await.unwrap();
        assert_eq!(total, 2);

        let records = store.load_records().await.unwrap();
        assert_eq!(records[0].product_name, "Lamp");
        assert_eq!(records[0].generated_description, "new lamp");

        let corpus = store.load_corpus().await.unwrap();
        assert_eq!(corpus, ["new lamp", "mug text"]);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn corpus_reads_legacy_records() {
        let path = temp_file("legacy.json");
        std::fs::write(
            &path,
            r#"[{"product_name": "Old", "generated_description": "legacy text", "seo_score": 50}]"#,
        )
        .unwrap();

        let store = JsonResultStore::new(&path);
        assert_eq!(store.load_corpus().await.unwrap(), ["legacy text"]);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn save_keeps_legacy_entries() {
        let path = temp_file("legacy_save.json");
        std::fs::write(
            &path,
            r#"[{"product_name": "Old", "generated_description": "legacy text", "seo_score": 50}]"#,
        )
        .unwrap();

        let store = JsonResultStore::new(&path);
        let total = store.save_records(&[record("Lamp", "lamp text")]).await.unwrap();
        assert_eq!(total, 2);

        // 旧条目原样保留，新记录追加在后面
        let raw: Vec<Value> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(
            raw[0],
            serde_json::json!({
                "product_name": "Old",
                "generated_description": "legacy text",
                "seo_score": 50
            })
        );
        assert_eq!(raw[1]["product_name"], "Lamp");

        // 完整记录只包含新格式条目，语料同时包含两者
        let records = store.load_records().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].product_name, "Lamp");
        assert_eq!(store.load_corpus().await.unwrap(), ["legacy text", "lamp text"]);

        // 同名记录覆盖旧格式条目
        store.save_records(&[record("Old", "fresh text")]).await.unwrap();
        let records = store.load_records().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].product_name, "Old");
        assert_eq!(records[0].generated_description, "fresh text");

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn malformed_corpus_is_reported() {
        let path = temp_file("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonResultStore::new(&path);
        let err = store.load_corpus().await.unwrap_err();
        assert!(matches!(err, CorpusError::Malformed { .. }));

        let _ = std::fs::remove_file(&path);
    }
}
