//! Ordered strategy fallback over one PNG buffer.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::chunks::scan_text_chunks;
use super::harvest::{harvest_base64, DEFAULT_MIN_BASE64_RUN};
use super::has_png_signature;
use super::locate::locate_json;

/// `tEXt` keywords that may carry a card.
pub const DEFAULT_KEYWORDS: [&str; 4] = ["chara", "ccv3", "ccv2", "Comment"];

/// Extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// `tEXt` keywords whose payload is tried as card JSON.
    pub keywords: Vec<String>,
    /// Minimum length of a base64 run for the harvester.
    pub min_base64_run: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            min_base64_run: DEFAULT_MIN_BASE64_RUN,
        }
    }
}

impl ExtractorConfig {
    /// Whether `keyword` names a card-carrying chunk.
    pub fn is_card_keyword(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k == keyword)
    }
}

/// A recovery strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    ChunkScan,
    PatternLocate,
    Base64Harvest,
}

impl Strategy {
    /// Priority order; the first strategy to produce an object wins.
    pub const ORDER: [Strategy; 3] = [
        Strategy::ChunkScan,
        Strategy::PatternLocate,
        Strategy::Base64Harvest,
    ];

    /// Run this strategy alone.
    pub fn run(self, buf: &[u8], config: &ExtractorConfig) -> Option<Value> {
        match self {
            Strategy::ChunkScan => scan_text_chunks(buf, config),
            Strategy::PatternLocate => locate_json(buf),
            Strategy::Base64Harvest => harvest_base64(buf, config),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::ChunkScan => write!(f, "text chunk"),
            Strategy::PatternLocate => write!(f, "JSON pattern"),
            Strategy::Base64Harvest => write!(f, "base64 run"),
        }
    }
}

/// Card JSON recovered from a PNG, with the strategy that found it.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub value: Value,
    pub strategy: Strategy,
}

/// Runs the recovery strategies in order.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractorConfig,
}

impl Extractor {
    /// Create an extractor with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor with custom configuration.
    pub fn with_config(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// First successful strategy's result, or `None` once all are exhausted.
    pub fn extract(&self, buf: &[u8]) -> Option<Extraction> {
        if !has_png_signature(buf) {
            warn!(len = buf.len(), "buffer does not start with a PNG signature");
        }

        Strategy::ORDER.iter().find_map(|&strategy| {
            debug!(%strategy, "running recovery strategy");
            strategy
                .run(buf, &self.config)
                .map(|value| Extraction { value, strategy })
        })
    }
}
