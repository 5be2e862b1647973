// ABOUTME: Token counting: tiktoken BPE encoders plus a byte heuristic for offline use.
// ABOUTME: The session's encoder is chosen by name at initialization.

use std::fmt;
use std::sync::Arc;

use tiktoken_rs::CoreBPE;

/// Counts how many tokens a piece of text encodes to.
pub trait TokenEncoder: Send + Sync {
    fn count_tokens(&self, text: &str) -> usize;

    fn name(&self) -> &str;
}

/// Exact counting with a tiktoken BPE.
pub struct TiktokenEncoder {
    name: String,
    bpe: CoreBPE,
}

impl TiktokenEncoder {
    /// Load the named tiktoken encoding.
    pub fn new(name: &str) -> anyhow::Result<Self> {
        let bpe = match name {
            "cl100k_base" => tiktoken_rs::cl100k_base()?,
            "o200k_base" => tiktoken_rs::o200k_base()?,
            "p50k_base" => tiktoken_rs::p50k_base()?,
            "r50k_base" => tiktoken_rs::r50k_base()?,
            other => anyhow::bail!(
                "Unknown token encoding: '{}'. Expected: cl100k_base, o200k_base, p50k_base, r50k_base, approx",
                other
            ),
        };
        Ok(Self {
            name: name.to_string(),
            bpe,
        })
    }
}

impl TokenEncoder for TiktokenEncoder {
    fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for TiktokenEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TiktokenEncoder")
            .field("name", &self.name)
            .finish()
    }
}

/// Heuristic token count: bytes / 4.
#[derive(Debug, Default, Clone, Copy)]
pub struct ApproxEncoder;

impl TokenEncoder for ApproxEncoder {
    fn count_tokens(&self, text: &str) -> usize {
        text.len() / 4
    }

    fn name(&self) -> &str {
        "approx"
    }
}

/// Build the encoder named in the budget config.
pub fn encoder_for(name: &str) -> anyhow::Result<Arc<dyn TokenEncoder>> {
    if name == "approx" {
        return Ok(Arc::new(ApproxEncoder));
    }
    Ok(Arc::new(TiktokenEncoder::new(name)?))
}
