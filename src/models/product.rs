use serde::{Deserialize, Serialize};

use crate::models::keywords::KeywordSet;

/// 产品上下文
///
/// 一次处理的不可变输入。名称为空不会报错，只影响评分结果。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductContext {
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_features")]
    pub features: Vec<String>,
    #[serde(default)]
    pub target_audience: String,
    /// 为空表示"未提供"，由编排器自行推导
    #[serde(default)]
    pub keywords: KeywordSet,
}

impl ProductContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features = features.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.target_audience = audience.into();
        self
    }

    pub fn with_keywords(mut self, keywords: KeywordSet) -> Self {
        self.keywords = keywords;
        self
    }

    /// 特征列表拼接成一段文本（用于关键词提取和提示词）
    pub fn feature_text(&self) -> String {
        self.features.join(", ")
    }
}

/// 一个 TOML 产品文件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductFile {
    #[serde(default)]
    pub products: Vec<ProductContext>,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

// 特征既可以写成列表，也可以写成逗号分隔的字符串
fn deserialize_features<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{SeqAccess, Visitor};
    use std::fmt;

    struct FeaturesVisitor;

    impl<'de> Visitor<'de> for FeaturesVisitor {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a list of features or a comma separated string")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect())
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut features = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                let item = item.trim();
                if !item.is_empty() {
                    features.push(item.to_string());
                }
            }
            Ok(features)
        }
    }

    deserializer.deserialize_any(FeaturesVisitor)
}
