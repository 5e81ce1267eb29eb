use crate::error::ExtractionError;
use crate::models::keywords::KeywordSet;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// 预先提取好的关键词条目（extracted_keywords.json 中的一项）
#[derive(Debug, Clone, Deserialize)]
struct IndexEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    keywords: Vec<String>,
}

/// 按产品名查找关键词的索引
#[derive(Debug, Clone, Default)]
pub struct KeywordIndex {
    by_name: HashMap<String, Vec<String>>,
    limit: usize,
}

impl KeywordIndex {
    pub fn new(limit: usize) -> Self {
        Self {
            by_name: HashMap::new(),
            limit,
        }
    }

    /// 从 JSON 文件加载，文件不存在时返回空索引
    pub async fn load(path: impl AsRef<Path>, limit: usize) -> Result<Self, ExtractionError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("关键词索引不存在: {}", path.display());
            return Ok(Self::new(limit));
        }

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            ExtractionError::IndexUnreadable {
                path: path.display().to_string(),
                message: e.to_string(),
            }
        })?;
        Self::from_json(&content, limit).map_err(|e| ExtractionError::IndexUnreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    pub fn from_json(content: &str, limit: usize) -> Result<Self, serde_json::Error> {
        let entries: Vec<IndexEntry> = serde_json::from_str(content)?;
        let mut index = Self::new(limit);
        for entry in entries {
            if entry.name.trim().is_empty() {
                continue;
            }
            // 同名条目以第一次出现为准
            index
                .by_name
                .entry(entry.name.trim().to_lowercase())
                .or_insert(entry.keywords);
        }
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// 按名称（忽略大小写）查找，返回前 `limit` 个关键词
    pub fn lookup(&self, product_name: &str) -> KeywordSet {
        self.by_name
            .get(&product_name.trim().to_lowercase())
            .map(|keywords| keywords.iter().collect::<KeywordSet>().truncated(self.limit))
            .unwrap_or_default()
    }
}
