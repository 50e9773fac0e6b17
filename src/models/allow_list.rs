//! Model Allow-List
//!
//! The set of model identifiers a client is willing to send. Configurable so
//! that newly released models are not silently rejected.

use crate::error::{DeepSeekError, Result};
use crate::models::DeepSeekModel;
use std::collections::BTreeSet;

/// Model identifiers accepted by request validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelAllowList {
    models: BTreeSet<String>,
}

impl ModelAllowList {
    /// Allow exactly the given identifiers
    pub fn new<I, S>(models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            models: models
                .into_iter()
                .map(|m| {
                    let m: String = m.into();
                    m.trim().to_string()
                })
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    /// Allow every model in the catalog
    pub fn all_known() -> Self {
        Self::new(DeepSeekModel::ALL.iter().map(DeepSeekModel::as_str))
    }

    /// Parse a comma separated list such as `deepseek-chat,deepseek-reasoner`
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    /// Add one identifier; surrounding whitespace is trimmed and blanks are ignored
    pub fn allow(&mut self, model: impl Into<String>) {
        let model: String = model.into();
        let model = model.trim();
        if !model.is_empty() {
            self.models.insert(model.to_string());
        }
    }

    pub fn contains(&self, model: &str) -> bool {
        self.models.contains(model)
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(String::as_str)
    }

    /// Fail with [`DeepSeekError::InvalidModel`] unless `model` is allowed
    pub fn validate(&self, model: &str) -> Result<()> {
        if self.contains(model) {
            Ok(())
        } else {
            Err(DeepSeekError::InvalidModel(model.to_string()))
        }
    }
}

impl Default for ModelAllowList {
    fn default() -> Self {
        Self::new([DeepSeekModel::Chat.as_str(), DeepSeekModel::Coder.as_str()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allows_chat_and_coder() {
        let allowed = ModelAllowList::default();
        assert!(allowed.validate("deepseek-chat").is_ok());
        assert!(allowed.validate("deepseek-coder").is_ok());
        assert!(allowed.validate("deepseek-reasoner").is_err());
    }

    #[test]
    fn test_all_known_includes_reasoner() {
        assert!(ModelAllowList::all_known().contains("deepseek-reasoner"));
    }

    #[test]
    fn test_parse_trims_and_skips_empty_entries() {
        let allowed = ModelAllowList::parse(" deepseek-chat , ,deepseek-v4 ");
        assert_eq!(
            allowed.iter().collect::<Vec<_>>(),
            vec!["deepseek-chat", "deepseek-v4"]
        );
    }

    #[test]
    fn test_allow_extends_list() {
        let mut allowed = ModelAllowList::default();
        allowed.allow("deepseek-reasoner");
        assert!(allowed.validate("deepseek-reasoner").is_ok());
    }

    #[test]
    fn test_validation_is_exact_match() {
        let allowed = ModelAllowList::default();
        let err = allowed.validate("DeepSeek-Chat").unwrap_err();
        assert!(matches!(err, DeepSeekError::InvalidModel(_)));
    }

    #[test]
    fn test_allow_trims_and_skips_blank() {
        let mut list = ModelAllowList::new(Vec::<String>::new());
        list.allow("  deepseek-reasoner ");
        list.allow("   ");
        list.allow("");

        assert_eq!(list.iter().collect::<Vec<_>>(), vec!["deepseek-reasoner"]);
        assert!(list.validate("deepseek-reasoner").is_ok());
    }
}
