use serde::{Deserialize, Serialize};

/// 评分明细
///
/// 所有分项与总分都在 [0, 100] 内，保留两位小数。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub keyword_score: f64,
    pub readability_score: f64,
    pub length_score: f64,
    pub structure_score: f64,
    pub uniqueness_score: f64,
    pub overall_score: f64,
}

impl ScoreBreakdown {
    /// 分项名称与得分，按固定顺序
    pub fn dimensions(&self) -> [(&'static str, f64); 5] {
        [
            ("keyword", self.keyword_score),
            ("readability", self.readability_score),
            ("length", self.length_score),
            ("structure", self.structure_score),
            ("uniqueness", self.uniqueness_score),
        ]
    }

    /// 得分最低的分项
    pub fn weakest_dimension(&self) -> (&'static str, f64) {
        self.dimensions()
            .into_iter()
            .fold(("keyword", f64::INFINITY), |acc, cur| if cur.1 < acc.1 { cur } else { acc })
    }
}

/// 候选版本标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateVersion {
    A,
    B,
}

impl std::fmt::Display for CandidateVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CandidateVersion::A => write!(f, "A"),
            CandidateVersion::B => write!(f, "B"),
        }
    }
}

/// 候选文案（文本 + 评分），只在一次选择中存在
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub text: String,
    pub score: ScoreBreakdown,
}

impl Candidate {
    pub fn new(text: impl Into<String>, score: ScoreBreakdown) -> Self {
        Self {
            text: text.into(),
            score,
        }
    }

    pub fn overall(&self) -> f64 {
        self.score.overall_score
    }
}

/// 在两个候选之间选择：总分严格更高者胜出，平分时固定选 A
pub fn select_candidate<'a>(
    a: &'a Candidate,
    b: &'a Candidate,
) -> (CandidateVersion, &'a Candidate) {
    if b.overall() > a.overall() {
        (CandidateVersion::B, b)
    } else {
        (CandidateVersion::A, a)
    }
}
