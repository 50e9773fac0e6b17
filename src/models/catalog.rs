//! Model Catalog
//!
//! Identifiers of the models served by the DeepSeek API.

use crate::error::{DeepSeekError, Result};
use std::str::FromStr;

/// A model served by the DeepSeek API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeepSeekModel {
    /// General chat model
    Chat,

    /// Code-oriented model
    Coder,

    /// Reasoning model (returns `reasoning_content`)
    Reasoner,
}

impl DeepSeekModel {
    pub const ALL: [DeepSeekModel; 3] = [
        DeepSeekModel::Chat,
        DeepSeekModel::Coder,
        DeepSeekModel::Reasoner,
    ];

    /// Wire identifier used in the `model` field
    pub fn as_str(&self) -> &'static str {
        match self {
            DeepSeekModel::Chat => "deepseek-chat",
            DeepSeekModel::Coder => "deepseek-coder",
            DeepSeekModel::Reasoner => "deepseek-reasoner",
        }
    }
}

impl FromStr for DeepSeekModel {
    type Err = DeepSeekError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|model| model.as_str() == s)
            .ok_or_else(|| DeepSeekError::InvalidModel(s.to_string()))
    }
}

impl std::fmt::Display for DeepSeekModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DeepSeekModel> for String {
    fn from(model: DeepSeekModel) -> Self {
        model.as_str().to_string()
    }
}
