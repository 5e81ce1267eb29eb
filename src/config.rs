use crate::error::ConfigError;

/// 评分维度权重
///
/// 五个权重之和必须为 1，整个部署期间保持不变。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreWeights {
    pub keyword: f64,
    pub readability: f64,
    pub length: f64,
    pub structure: f64,
    pub uniqueness: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            keyword: 0.30,
            readability: 0.20,
            length: 0.15,
            structure: 0.20,
            uniqueness: 0.15,
        }
    }
}

impl ScoreWeights {
    pub fn sum(&self) -> f64 {
        self.keyword + self.readability + self.length + self.structure + self.uniqueness
    }

    fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("keyword", self.keyword),
            ("readability", self.readability),
            ("length", self.length),
            ("structure", self.structure),
            ("uniqueness", self.uniqueness),
        ]
    }
}

/// 评分器配置
#[derive(Clone, Debug, PartialEq)]
pub struct ScoringConfig {
    pub weights: ScoreWeights,
    /// 理想字数区间（含两端）
    pub ideal_min_words: usize,
    pub ideal_max_words: usize,
    /// 单个关键词的理想密度区间（百分比）
    pub density_min_pct: f64,
    pub density_max_pct: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            ideal_min_words: 100,
            ideal_max_words: 150,
            density_min_pct: 1.0,
            density_max_pct: 3.0,
        }
    }
}

impl ScoringConfig {
    /// 校验配置，非法配置不允许进入评分流程
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in self.weights.named() {
            if value < 0.0 || !value.is_finite() {
                return Err(ConfigError::NegativeWeight { name, value });
            }
        }

        let sum = self.weights.sum();
        if (sum - 1.0).abs() > 1e-3 {
            return Err(ConfigError::WeightSum { sum });
        }

        if self.ideal_min_words == 0 || self.ideal_min_words > self.ideal_max_words {
            return Err(ConfigError::InvalidBand {
                name: "ideal_words",
                min: self.ideal_min_words as f64,
                max: self.ideal_max_words as f64,
            });
        }

        if self.density_min_pct <= 0.0 || self.density_min_pct > self.density_max_pct {
            return Err(ConfigError::InvalidBand {
                name: "keyword_density",
                min: self.density_min_pct,
                max: self.density_max_pct,
            });
        }

        Ok(())
    }
}

/// 迭代优化配置
#[derive(Clone, Debug, PartialEq)]
pub struct RefinementConfig {
    /// 最多改写轮数，0 表示不改写
    pub max_iterations: usize,
    /// 每轮至少提升的分数，否则视为进入平台期
    pub min_improvement: f64,
    /// 回退到产品特征作为关键词时的数量上限
    pub keyword_limit: usize,
    /// 单次外部调用（生成 / 改写）超时时间
    pub generation_timeout_secs: u64,
}

impl RefinementConfig {
    /// 提升阈值必须是非负的有限数，否则改写循环可能接受更差的文案
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_improvement.is_finite() || self.min_improvement < 0.0 {
            return Err(ConfigError::InvalidThreshold {
                name: "min_improvement",
                value: self.min_improvement,
            });
        }
        Ok(())
    }
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            max_iterations: 3,
            min_improvement: 0.5,
            keyword_limit: 5,
            generation_timeout_secs: 120,
        }
    }
}

/// 文案生成后端
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LlmBackend {
    /// 兼容 OpenAI API 的服务
    OpenAi,
    /// 本地 Ollama 服务
    Ollama,
}

impl LlmBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" | "open_ai" => Some(LlmBackend::OpenAi),
            "ollama" => Some(LlmBackend::Ollama),
            _ => None,
        }
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时处理的产品数量
    pub max_concurrent_products: usize,
    /// 产品 TOML 文件存放目录
    pub product_folder: String,
    /// 预先提取的关键词索引文件
    pub keyword_index_file: String,
    /// 结果文件（同时作为唯一性评分的语料库）
    pub results_file: String,
    /// 失败产品记录文件
    pub warn_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 运行日志文件
    pub output_log_file: String,
    // --- LLM 配置 ---
    pub llm_backend: LlmBackend,
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    // --- Ollama 配置 ---
    pub ollama_base_url: String,
    pub ollama_model_name: String,
    // --- 评分与迭代 ---
    pub scoring: ScoringConfig,
    pub refinement: RefinementConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_products: 4,
            product_folder: "products".to_string(),
            keyword_index_file: "ExtractedData/extracted_keywords.json".to_string(),
            results_file: "GeneratedDescriptions/generated_descriptions.json".to_string(),
            warn_file: "warn.txt".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            llm_backend: LlmBackend::Ollama,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            llm_temperature: 0.7,
            ollama_base_url: "http://localhost:11434".to_string(),
            ollama_model_name: "llama3".to_string(),
            scoring: ScoringConfig::default(),
            refinement: RefinementConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        let scoring = ScoringConfig {
            weights: ScoreWeights {
                keyword: env_parse("WEIGHT_KEYWORD").unwrap_or(default.scoring.weights.keyword),
                readability: env_parse("WEIGHT_READABILITY")
                    .unwrap_or(default.scoring.weights.readability),
                length: env_parse("WEIGHT_LENGTH").unwrap_or(default.scoring.weights.length),
                structure: env_parse("WEIGHT_STRUCTURE")
                    .unwrap_or(default.scoring.weights.structure),
                uniqueness: env_parse("WEIGHT_UNIQUENESS")
                    .unwrap_or(default.scoring.weights.uniqueness),
            },
            ideal_min_words: env_parse("IDEAL_MIN_WORDS")
                .unwrap_or(default.scoring.ideal_min_words),
            ideal_max_words: env_parse("IDEAL_MAX_WORDS")
                .unwrap_or(default.scoring.ideal_max_words),
            ..default.scoring.clone()
        };
        let refinement = RefinementConfig {
            max_iterations: env_parse("MAX_ITERATIONS")
                .unwrap_or(default.refinement.max_iterations),
            min_improvement: env_parse("MIN_IMPROVEMENT")
                .unwrap_or(default.refinement.min_improvement),
            keyword_limit: env_parse("KEYWORD_LIMIT").unwrap_or(default.refinement.keyword_limit),
            generation_timeout_secs: env_parse("GENERATION_TIMEOUT_SECS")
                .unwrap_or(default.refinement.generation_timeout_secs),
        };

        Self {
            max_concurrent_products: env_parse("MAX_CONCURRENT_PRODUCTS")
                .unwrap_or(default.max_concurrent_products),
            product_folder: std::env::var("PRODUCT_FOLDER").unwrap_or(default.product_folder),
            keyword_index_file: std::env::var("KEYWORD_INDEX_FILE")
                .unwrap_or(default.keyword_index_file),
            results_file: std::env::var("RESULTS_FILE").unwrap_or(default.results_file),
            warn_file: std::env::var("WARN_FILE").unwrap_or(default.warn_file),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            llm_backend: std::env::var("LLM_BACKEND")
                .ok()
                .and_then(|v| LlmBackend::parse(&v))
                .unwrap_or(default.llm_backend),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_temperature: env_parse("LLM_TEMPERATURE").unwrap_or(default.llm_temperature),
            ollama_base_url: std::env::var("OLLAMA_BASE_URL").unwrap_or(default.ollama_base_url),
            ollama_model_name: std::env::var("OLLAMA_MODEL_NAME")
                .unwrap_or(default.ollama_model_name),
            scoring,
            refinement,
        }
    }

    /// 启动前校验
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring.validate()?;
        self.refinement.validate()?;
        if self.max_concurrent_products == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
