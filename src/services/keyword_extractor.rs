//! 关键词提取服务 - 业务能力层
//!
//! 基于 TF-IDF 的轻量提取：小写化、去停用词、复数归一，统计一元和二元词组。
//! 可选地用历史文案拟合 IDF，让常见营销套话的权重降低。

use phf::phf_set;
use std::collections::HashMap;

use crate::error::ExtractionError;
use crate::models::KeywordSet;
use crate::services::capabilities::KeywordExtractor;

/// 英文停用词 + 领域停用词
static STOPWORDS: phf::Set<&'static str> = phf_set! {
    "a", "about", "above", "after", "again", "all", "also", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "every",
    "few", "for", "from", "further", "get", "had", "has", "have", "having", "he", "her",
    "here", "hers", "him", "his", "how", "if", "in", "into", "is", "it", "its", "itself",
    "just", "like", "make", "makes", "many", "me", "more", "most", "much", "my", "new", "no",
    "nor", "not", "now", "of", "off", "on", "once", "one", "only", "or", "other", "our",
    "ours", "out", "over", "own", "per", "same", "she", "should", "so", "some", "such",
    "than", "that", "the", "their", "theirs", "them", "then", "there", "these", "they",
    "this", "those", "through", "to", "too", "under", "until", "up", "use", "used", "very",
    "was", "we", "well", "were", "what", "when", "where", "which", "while", "who", "whom",
    "why", "will", "with", "would", "you", "your", "yours",
    // 领域停用词
    "item", "sku", "brandx", "product",
};

/// 二元词组相对一元词的权重加成
const BIGRAM_BOOST: f64 = 1.5;

/// TF-IDF 关键词提取器
#[derive(Debug, Clone)]
pub struct TfIdfKeywordExtractor {
    top_n: usize,
    idf: HashMap<String, f64>,
    documents: usize,
}

impl TfIdfKeywordExtractor {
    pub fn new(top_n: usize) -> Self {
        Self {
            top_n,
            idf: HashMap::new(),
            documents: 0,
        }
    }

    /// 用一组文档拟合 IDF（平滑形式：ln((1 + N) / (1 + df)) + 1）
    pub fn fit<S: AsRef<str>>(mut self, documents: &[S]) -> Self {
        let mut df: HashMap<String, usize> = HashMap::new();
        for doc in documents {
            let mut terms = terms(doc.as_ref());
            terms.sort();
            terms.dedup();
            for term in terms {
                *df.entry(term).or_default() += 1;
            }
        }

        let n = documents.len() as f64;
        self.idf = df
            .into_iter()
            .map(|(term, count)| (term, ((1.0 + n) / (1.0 + count as f64)).ln() + 1.0))
            .collect();
        self.documents = documents.len();
        self
    }

    fn idf(&self, term: &str) -> f64 {
        if self.documents == 0 {
            return 1.0;
        }
        self.idf
            .get(term)
            .copied()
            // 从未出现过的词视为 df = 0
            .unwrap_or_else(|| (1.0 + self.documents as f64).ln() + 1.0)
    }
}

impl KeywordExtractor for TfIdfKeywordExtractor {
    fn extract(&self, feature_text: &str) -> Result<KeywordSet, ExtractionError> {
        let terms = terms(feature_text);
        if terms.is_empty() {
            return Err(ExtractionError::NoUsableTerms);
        }

        let mut tf: HashMap<String, f64> = HashMap::new();
        for term in terms {
            let boost = if term.contains(' ') { BIGRAM_BOOST } else { 1.0 };
            *tf.entry(term).or_default() += boost;
        }

        let mut ranked: Vec<(String, f64)> = tf
            .into_iter()
            .map(|(term, freq)| {
                let weight = freq * self.idf(&term);
                (term, weight)
            })
            .collect();
        // 权重相同时按字母序，保证结果稳定
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        Ok(ranked
            .into_iter()
            .take(self.top_n)
            .map(|(term, _)| term)
            .collect())
    }
}

/// 预处理后的词项：一元词 + 相邻一元词构成的二元词组
fn terms(text: &str) -> Vec<String> {
    let mut terms = Vec::new();
    // 以标点切分成片段，二元词组不跨片段
    for segment in text.split(|c: char| matches!(c, ',' | ';' | '.' | '\n' | '|' | '/')) {
        let tokens: Vec<String> = segment
            .split(|c: char| !c.is_alphabetic() && c != '-')
            .map(|t| t.trim_matches('-').to_lowercase())
            .filter(|t| t.chars().count() > 1 && !STOPWORDS.contains(t.as_str()))
            .map(|t| singularize(&t))
            .collect();

        for pair in tokens.windows(2) {
            terms.push(format!("{} {}", pair[0], pair[1]));
        }
        terms.extend(tokens);
    }
    terms
}

/// 朴素的复数归一
fn singularize(word: &str) -> String {
    if word.len() > 4 && word.ends_with("ies") {
        format!("{}y", &word[..word.len() - 3])
    } else if word.len() > 3
        && word.ends_with('s')
        && !word.ends_with("ss")
        && !word.ends_with("us")
        && !word.ends_with("is")
    {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_repeated_terms_without_stopwords() {
        let extractor = TfIdfKeywordExtractor::new(5);
        let keywords = extractor
            .extract("wireless charging, fast wireless charging, the charging pad for phones")
            .unwrap();

        assert!(keywords.iter().any(|k| k == "wireless charging"));
        assert!(keywords.iter().all(|k| k != "the" && k != "for"));
        assert!(keywords.len() <= 5);
    }

    #[test]
    fn plural_forms_are_folded() {
        assert_eq!(singularize("batteries"), "battery");
        assert_eq!(singularize("lamps"), "lamp");
        assert_eq!(singularize("glass"), "glass");
        assert_eq!(singularize("cactus"), "cactus");
    }

    #[test]
    fn empty_or_stopword_text_is_reported() {
        let extractor = TfIdfKeywordExtractor::new(5);
        assert!(matches!(extractor.extract(""), Err(ExtractionError::NoUsableTerms)));
        assert!(matches!(
            extractor.extract("the and of it"),
            Err(ExtractionError::NoUsableTerms)
        ));
    }

    #[test]
    fn fitted_idf_demotes_common_terms() {
        let corpus = [
            "premium quality lamp",
            "premium quality mug",
            "premium quality chair",
        ];
        let extractor = TfIdfKeywordExtractor::new(1).fit(&corpus);
        let keywords = extractor.extract("premium, ergonomic").unwrap();
        assert_eq!(keywords.as_slice(), ["ergonomic"]);
    }

    #[test]
    fn extraction_is_deterministic() {
        let extractor = TfIdfKeywordExtractor::new(4);
        let text = "solid oak, hand finished, solid oak legs";
        assert_eq!(extractor.extract(text).unwrap(), extractor.extract(text).unwrap());
    }
}
