//! Uniform-random prompt sampler

use std::fs;
use std::path::Path;

use rand::seq::SliceRandom;
use streambench_core::{Sampler, SamplerError};
use tracing::{info, warn};

use crate::corpus::{LONG_CONTEXT_PAIRS, SHORT_PROMPTS};

/// Picks one prompt per request, uniformly at random
#[derive(Debug, Clone)]
pub struct PromptSampler {
    name: String,
    prompts: Vec<String>,
}

impl PromptSampler {
    /// Sampler over an explicit prompt list
    ///
    /// # Errors
    /// Returns [`SamplerError::EmptyCorpus`] if no prompt is non-blank.
    pub fn from_prompts(
        name: impl Into<String>,
        prompts: impl IntoIterator<Item = String>,
    ) -> Result<Self, SamplerError> {
        let prompts: Vec<String> = prompts
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect();
        if prompts.is_empty() {
            return Err(SamplerError::EmptyCorpus);
        }
        Ok(Self {
            name: name.into(),
            prompts,
        })
    }

    /// The bundled short prompts
    pub fn short() -> Self {
        Self {
            name: "short".to_string(),
            prompts: SHORT_PROMPTS.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// The bundled long-context pairs, rendered as `context + "\n\n" + prompt`
    pub fn long_context() -> Self {
        Self {
            name: "long_context".to_string(),
            prompts: LONG_CONTEXT_PAIRS.iter().map(|pair| pair.render()).collect(),
        }
    }

    /// Load prompts from a file, one per line
    ///
    /// Blank lines are skipped and surrounding whitespace is trimmed.
    pub fn from_file(path: &Path) -> Result<Self, SamplerError> {
        let content = fs::read_to_string(path)?;
        let prompts = content.lines().map(|line| line.trim().to_string());
        let sampler = Self::from_prompts(format!("file:{}", path.display()), prompts)?;
        info!(path = %path.display(), prompts = sampler.len(), "Loaded prompt file");
        Ok(sampler)
    }

    /// Sampler for a run
    ///
    /// Long-context mode always uses the bundled pairs; otherwise a prompt
    /// file, when given, replaces the bundled short prompts.
    pub fn for_config(use_long_context: bool, prompt_file: Option<&Path>) -> Result<Self, SamplerError> {
        match (use_long_context, prompt_file) {
            (true, Some(path)) => {
                warn!(
                    path = %path.display(),
                    "Prompt file ignored in long-context mode"
                );
                Ok(Self::long_context())
            }
            (true, None) => Ok(Self::long_context()),
            (false, Some(path)) => Self::from_file(path),
            (false, None) => Ok(Self::short()),
        }
    }

    /// Number of prompts
    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    /// Whether there are no prompts; never true for a constructed sampler
    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    /// All prompts
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl Sampler for PromptSampler {
    fn name(&self) -> &str {
        &self.name
    }

    fn sample(&self) -> String {
        let mut rng = rand::thread_rng();
        self.prompts.choose(&mut rng).cloned().unwrap_or_default()
    }
}
