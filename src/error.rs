use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 文案生成错误
#[derive(Debug, Error)]
pub enum GenerationError {
    /// API 调用失败
    #[error("LLM API调用失败 (后端: {backend}, 模型: {model}): {source}")]
    ApiCallFailed {
        backend: String,
        model: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 生成或改写结果去除空白后为空
    #[error("{stage} 返回空白文本")]
    BlankOutput { stage: String },
    /// 单次调用超时
    #[error("{stage} 调用超时 ({timeout_secs} 秒)")]
    Timeout { stage: String, timeout_secs: u64 },
    /// 构造请求失败
    #[error("构造请求失败: {message}")]
    InvalidRequest { message: String },
}

/// 关键词提取错误
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// 特征文本为空或无可用词
    #[error("无法从特征文本中提取关键词")]
    NoUsableTerms,
    /// 关键词索引文件读取失败
    #[error("关键词索引读取失败 ({path}): {message}")]
    IndexUnreadable { path: String, message: String },
}

/// 语料库错误
#[derive(Debug, Error)]
pub enum CorpusError {
    /// 语料文件无法读取
    #[error("语料库不可用 ({path}): {source}")]
    Unavailable {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 语料文件格式错误
    #[error("语料库格式错误 ({path}): {source}")]
    Malformed {
        path: String,
        source: serde_json::Error,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        source: std::io::Error,
    },
    /// 序列化失败
    #[error("序列化失败 ({path}): {source}")]
    SerializeFailed {
        path: String,
        source: serde_json::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 权重非法
    #[error("评分权重之和必须为 1 (当前: {sum:.4})")]
    WeightSum { sum: f64 },
    /// 权重为负
    #[error("评分权重不能为负: {name} = {value}")]
    NegativeWeight { name: &'static str, value: f64 },
    /// 区间非法
    #[error("区间配置非法: {name} = [{min}, {max}]")]
    InvalidBand {
        name: &'static str,
        min: f64,
        max: f64,
    },
    /// 阈值非法（非有限数或为负）
    #[error("阈值配置非法: {name} = {value} (必须为非负有限数)")]
    InvalidThreshold { name: &'static str, value: f64 },
    /// 并发数为 0
    #[error("MAX_CONCURRENT_PRODUCTS 必须为正整数")]
    ZeroConcurrency,
}

// ========== 便捷构造函数 ==========

impl GenerationError {
    /// 创建 LLM API 调用错误
    pub fn api_failed(
        backend: impl Into<String>,
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        GenerationError::ApiCallFailed {
            backend: backend.into(),
            model: model.into(),
            source: Box::new(source),
        }
    }
}

// ========== 对外错误结果 ==========

/// 错误状态码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorStatus {
    /// 初始候选文案生成失败
    GenerationFailed,
    /// 评分配置非法
    InvalidConfig,
}

impl std::fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorStatus::GenerationFailed => write!(f, "GENERATION_FAILED"),
            ErrorStatus::InvalidConfig => write!(f, "INVALID_CONFIG"),
        }
    }
}

/// 结构化错误结果
///
/// 调用方要么拿到完整的 `ResultRecord`，要么拿到这个结构，不存在中间状态。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("[{status}] {message}")]
pub struct ErrorResult {
    pub status: ErrorStatus,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub product_name: String,
    pub message: String,
}

impl ErrorResult {
    pub fn generation_failed(product_name: impl Into<String>, err: &GenerationError) -> Self {
        Self {
            status: ErrorStatus::GenerationFailed,
            product_name: product_name.into(),
            message: format!("初始文案生成失败: {}", err),
        }
    }

    pub fn invalid_config(err: &ConfigError) -> Self {
        Self {
            status: ErrorStatus::InvalidConfig,
            product_name: String::new(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_result_serializes_status_in_screaming_case() {
        let err = GenerationError::EmptyContent {
            model: "llama3".to_string(),
        };
        let result = ErrorResult::generation_failed("Desk Lamp", &err);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "GENERATION_FAILED");
        assert_eq!(json["product_name"], "Desk Lamp");
        assert!(json["message"].as_str().unwrap().contains("llama3"));
    }

    #[test]
    fn config_error_keeps_its_message() {
        let result = ErrorResult::invalid_config(&ConfigError::WeightSum { sum: 1.2 });
        assert_eq!(result.status, ErrorStatus::InvalidConfig);
        assert!(result.message.contains("1.2000"));
    }

    #[test]
    fn blank_output_names_the_stage() {
        let err = GenerationError::BlankOutput {
            stage: "generate".to_string(),
        };
        assert_eq!(err.to_string(), "generate 返回空白文本");
    }
}
