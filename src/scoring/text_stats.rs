//! 文本统计工具
//!
//! 分词、分句、音节计数，供评分器各维度复用。

use regex::Regex;
use std::sync::LazyLock;

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9]+(?:['’][A-Za-z]+)*").expect("word pattern"));

static SENTENCE_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+|\n").expect("sentence pattern"));

/// 小写化的词元序列（只含字母数字）
pub fn tokenize(text: &str) -> Vec<String> {
    WORD_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase().replace('’', "'"))
        .collect()
}

/// 按空白切分的词数，与"字数"的直观理解一致
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// 句子数：以句末标点或换行切分，只统计含有词的片段
pub fn sentence_count(text: &str) -> usize {
    SENTENCE_END_RE
        .split(text)
        .filter(|segment| WORD_RE.is_match(segment))
        .count()
}

/// 估算一个英文单词的音节数
///
/// 元音组计数，去掉词尾不发音的 e / es / ed，最少为 1。
pub fn syllable_count(word: &str) -> usize {
    let word: String = word
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    if word.is_empty() {
        return 0;
    }
    if word.len() <= 3 {
        return 1;
    }

    let trimmed = if word.ends_with("es") || word.ends_with("ed") {
        &word[..word.len() - 2]
    } else if word.ends_with('e') && !word.ends_with("le") {
        &word[..word.len() - 1]
    } else {
        word.as_str()
    };

    let mut count = 0;
    let mut prev_vowel = false;
    for c in trimmed.chars() {
        let vowel = matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }

    count.max(1)
}

/// 词级 n-gram 集合（n >= 1）
pub fn ngrams(tokens: &[String], n: usize) -> std::collections::HashSet<String> {
    if n == 0 || tokens.len() < n {
        return std::collections::HashSet::new();
    }
    tokens.windows(n).map(|w| w.join(" ")).collect()
}
