//! 警告写入服务 - 业务能力层
//!
//! 只负责"写 warn.txt"能力，不关心流程

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

use crate::error::ErrorResult;

/// 警告写入服务
///
/// 职责：
/// - 将生成失败的产品写入 warn.txt
/// - 只追加，不覆盖历史记录
pub struct WarnWriter {
    warn_file_path: String,
}

impl WarnWriter {
    pub fn new() -> Self {
        Self {
            warn_file_path: "warn.txt".to_string(),
        }
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            warn_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.warn_file_path
    }

    /// 追加一条失败记录
    ///
    /// 格式：`时间 | 产品 名称 | 状态 | 原因`，原因中的换行被压成空格
    pub fn write(&self, failure: &ErrorResult) -> Result<()> {
        debug!("写入警告: 产品 {} | {}", failure.product_name, failure.status);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.warn_file_path)
            .with_context(|| format!("无法打开警告文件: {}", self.warn_file_path))?;

        let reason = failure.message.replace(['\r', '\n'], " ");
        let warn_msg = format!(
            "{} | 产品 {} | {} | {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            failure.product_name,
            failure.status,
            reason
        );

        file.write_all(warn_msg.as_bytes())
            .with_context(|| format!("写入警告文件失败: {}", self.warn_file_path))?;

        Ok(())
    }
}

impl Default for WarnWriter {
    fn default() -> Self {
        Self::new()
    }
}
