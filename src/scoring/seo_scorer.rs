//! SEO 评分器
//!
//! 纯函数：输入文本、关键词集合、历史文案语料，输出可解释的评分明细。
//! 不访问网络或文件系统，不保留任何跨调用状态。
//!
//! 各维度先在 [0, 1] 内计算，再乘以 100 并保留两位小数；
//! 总分由五个已取整的分项按固定权重加权得到。

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::config::ScoringConfig;
use crate::error::ConfigError;
use crate::models::{KeywordSet, ScoreBreakdown};
use crate::scoring::text_stats::{ngrams, sentence_count, syllable_count, tokenize, word_count};

static PARAGRAPH_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n").expect("paragraph pattern"));

static LIST_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*•]|\d+[.)])\s+\S").expect("list pattern"));

/// 标题行中允许小写的虚词
const TITLE_SMALL_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "by", "for", "in", "of", "on", "or", "the", "to", "with",
];

// Flesch Reading Ease 目标区间（"plain English"）以及区间外每多少分扣完
const FRE_TARGET: (f64, f64) = (60.0, 70.0);
const FRE_SPAN: f64 = 60.0;
// Flesch-Kincaid 年级目标区间
const GRADE_TARGET: (f64, f64) = (7.0, 9.0);
const GRADE_SPAN: f64 = 8.0;

// 唯一性：最相似的一篇占主导，平均相似度作为补充
const UNIQUENESS_MAX_WEIGHT: f64 = 0.7;
const UNIQUENESS_MEAN_WEIGHT: f64 = 0.3;

/// SEO 评分器
#[derive(Debug, Clone)]
pub struct SeoScorer {
    config: ScoringConfig,
}

impl Default for SeoScorer {
    fn default() -> Self {
        Self {
            config: ScoringConfig::default(),
        }
    }
}

impl SeoScorer {
    /// 创建评分器，配置非法时拒绝
    pub fn new(config: ScoringConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// 计算完整评分
    ///
    /// 空文本、空关键词集合、空语料都是合法输入，不会失败。
    pub fn score(&self, text: &str, keywords: &KeywordSet, corpus: &[String]) -> ScoreBreakdown {
        let tokens = tokenize(text);

        let keyword_score = to_percent(self.keyword_score(&tokens, keywords));
        let readability_score = to_percent(readability_score(text, &tokens));
        let length_score = to_percent(self.length_score(word_count(text)));
        let structure_score = to_percent(structure_score(text));
        let uniqueness_score = to_percent(uniqueness_score(&tokens, corpus));

        let w = &self.config.weights;
        let overall = keyword_score * w.keyword
            + readability_score * w.readability
            + length_score * w.length
            + structure_score * w.structure
            + uniqueness_score * w.uniqueness;

        ScoreBreakdown {
            keyword_score,
            readability_score,
            length_score,
            structure_score,
            uniqueness_score,
            overall_score: round2(overall.clamp(0.0, 100.0)),
        }
    }

    /// 关键词得分：覆盖率 × (0.5 + 0.5 × 平均密度质量)
    ///
    /// 一个关键词都没出现时为 0。
    fn keyword_score(&self, tokens: &[String], keywords: &KeywordSet) -> f64 {
        if keywords.is_empty() || tokens.is_empty() {
            return 0.0;
        }

        let total_words = tokens.len() as f64;
        let mut counted = 0usize;
        let mut present = 0usize;
        let mut quality_sum = 0.0;

        // 分词后为空的关键词（如纯标点）不参与计分
        for keyword in keywords.iter() {
            let phrase = tokenize(keyword);
            if phrase.is_empty() {
                continue;
            }
            counted += 1;
            let occurrences = count_phrase(tokens, &phrase);
            if occurrences > 0 {
                present += 1;
            }
            let density = occurrences as f64 * phrase.len() as f64 / total_words * 100.0;
            quality_sum += self.density_quality(density);
        }

        if counted == 0 {
            return 0.0;
        }
        let n = counted as f64;
        let coverage = present as f64 / n;
        let mean_quality = quality_sum / n;

        coverage * (0.5 + 0.5 * mean_quality)
    }

    /// 单个关键词密度的质量：区间内为 1，过低线性下降，过高在两倍上限处降为 0
    fn density_quality(&self, density_pct: f64) -> f64 {
        let (min, max) = (self.config.density_min_pct, self.config.density_max_pct);
        if density_pct <= 0.0 {
            0.0
        } else if density_pct < min {
            density_pct / min
        } else if density_pct <= max {
            1.0
        } else {
            (1.0 - (density_pct - max) / max).max(0.0)
        }
    }

    /// 长度得分：理想区间内满分，离区间越远越低
    fn length_score(&self, words: usize) -> f64 {
        let (min, max) = (self.config.ideal_min_words, self.config.ideal_max_words);
        if words == 0 {
            0.0
        } else if words < min {
            words as f64 / min as f64
        } else if words <= max {
            1.0
        } else {
            (1.0 - (words - max) as f64 / max as f64).max(0.0)
        }
    }
}

/// 可读性：Flesch Reading Ease 与 Flesch-Kincaid 年级各占一半
fn readability_score(text: &str, tokens: &[String]) -> f64 {
    let words: Vec<&String> = tokens
        .iter()
        .filter(|t| t.chars().any(|c| c.is_ascii_alphabetic()))
        .collect();
    if words.is_empty() {
        return 0.0;
    }

    let word_total = words.len() as f64;
    let sentences = sentence_count(text).max(1) as f64;
    let syllables: usize = words.iter().map(|w| syllable_count(w)).sum();

    let words_per_sentence = word_total / sentences;
    let syllables_per_word = syllables as f64 / word_total;

    let reading_ease = 206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word;
    let grade = 0.39 * words_per_sentence + 11.8 * syllables_per_word - 15.59;

    let ease_score = band_score(reading_ease, FRE_TARGET, FRE_SPAN);
    let grade_score = band_score(grade, GRADE_TARGET, GRADE_SPAN);

    (ease_score + grade_score) / 2.0
}

/// 结构得分：分段、列表、标题、标点
fn structure_score(text: &str) -> f64 {
    let mut score: f64 = 0.0;

    let paragraphs = PARAGRAPH_BREAK_RE
        .split(text)
        .filter(|p| !p.trim().is_empty())
        .count();
    if paragraphs >= 2 {
        score += 0.3;
    }

    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.iter().any(|l| LIST_LINE_RE.is_match(l)) {
        score += 0.2;
    }

    // 单行文本没有"标题"可言
    if lines.len() >= 2 && lines.iter().any(|l| is_heading_like(l)) {
        score += 0.2;
    }

    let terminators = text.chars().filter(|c| matches!(c, '.' | '!' | '?')).count();
    let commas = text.chars().filter(|&c| c == ',').count();
    if terminators >= 3 && commas >= 2 {
        score += 0.3;
    }

    score.min(1.0)
}

fn is_heading_like(line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() || LIST_LINE_RE.is_match(line) {
        return false;
    }
    if line.starts_with('#') {
        return true;
    }
    if line.len() > 4 && line.starts_with("**") && line.ends_with("**") {
        return true;
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    if line.ends_with(':') {
        return words.len() <= 8;
    }
    if words.is_empty() || words.len() > 6 || line.ends_with(['.', '!', '?', ',', ';']) {
        return false;
    }

    words.iter().enumerate().all(|(i, word)| {
        let first = match word.chars().next() {
            Some(c) => c,
            None => return false,
        };
        if !first.is_alphabetic() {
            return first.is_ascii_digit() || first == '&';
        }
        first.is_uppercase() || (i > 0 && TITLE_SMALL_WORDS.contains(&word.to_lowercase().as_str()))
    })
}

/// 唯一性：与语料中每篇文本比较，相似度越高得分越低；空语料满分
fn uniqueness_score(tokens: &[String], corpus: &[String]) -> f64 {
    if corpus.is_empty() {
        return 1.0;
    }

    let unigrams: HashSet<String> = tokens.iter().cloned().collect();
    let bigrams = ngrams(tokens, 2);

    let similarities: Vec<f64> = corpus
        .iter()
        .map(|other| {
            let other_tokens = tokenize(other);
            let other_unigrams: HashSet<String> = other_tokens.iter().cloned().collect();
            let other_bigrams = ngrams(&other_tokens, 2);

            let uni = jaccard(&unigrams, &other_unigrams);
            if bigrams.is_empty() && other_bigrams.is_empty() {
                uni
            } else {
                (uni + jaccard(&bigrams, &other_bigrams)) / 2.0
            }
        })
        .collect();

    let max = similarities.iter().cloned().fold(0.0_f64, f64::max);
    let mean = similarities.iter().sum::<f64>() / similarities.len() as f64;

    (1.0 - (UNIQUENESS_MAX_WEIGHT * max + UNIQUENESS_MEAN_WEIGHT * mean)).clamp(0.0, 1.0)
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// 统计短语（词元序列）在文本中出现的次数
fn count_phrase(tokens: &[String], phrase: &[String]) -> usize {
    if phrase.is_empty() || tokens.len() < phrase.len() {
        return 0;
    }
    tokens.windows(phrase.len()).filter(|w| *w == phrase).count()
}

fn band_score(value: f64, (low, high): (f64, f64), span: f64) -> f64 {
    if value < low {
        (1.0 - (low - value) / span).max(0.0)
    } else if value > high {
        (1.0 - (value - high) / span).max(0.0)
    } else {
        1.0
    }
}

fn to_percent(unit: f64) -> f64 {
    round2((unit * 100.0).clamp(0.0, 100.0))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
