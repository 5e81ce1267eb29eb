use serde::{Deserialize, Serialize};

/// 关键词集合
///
/// 保持插入顺序，按小写去重，忽略空白项。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct KeywordSet {
    items: Vec<String>,
}

impl KeywordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入关键词，返回是否为新词
    pub fn insert(&mut self, keyword: impl AsRef<str>) -> bool {
        let keyword = keyword.as_ref().trim();
        if keyword.is_empty() {
            return false;
        }
        let lowered = keyword.to_lowercase();
        if self.items.iter().any(|k| k.to_lowercase() == lowered) {
            return false;
        }
        self.items.push(keyword.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    /// 只保留前 `limit` 个
    pub fn truncated(mut self, limit: usize) -> Self {
        self.items.truncate(limit);
        self
    }
}

impl From<Vec<String>> for KeywordSet {
    fn from(items: Vec<String>) -> Self {
        items.into_iter().collect()
    }
}

impl From<KeywordSet> for Vec<String> {
    fn from(set: KeywordSet) -> Self {
        set.items
    }
}

impl<S: AsRef<str>> FromIterator<S> for KeywordSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = KeywordSet::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}

impl std::fmt::Display for KeywordSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.items.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedups_case_insensitively_and_keeps_order() {
        let set: KeywordSet = ["Wireless", "charger", "wireless", "  ", "Fast Charge"]
            .into_iter()
            .collect();
        assert_eq!(set.as_slice(), ["Wireless", "charger", "Fast Charge"]);
    }

    #[test]
    fn deserializes_from_plain_list() {
        let set: KeywordSet = serde_json::from_str(r#"["a", "A", "b"]"#).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["a","b"]"#);
    }
}
