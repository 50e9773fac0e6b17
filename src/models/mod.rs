//! Models Module
//!
//! Known DeepSeek model identifiers and the allow-list checked before a
//! request is sent.

pub mod allow_list;
pub mod catalog;

pub use allow_list::ModelAllowList;
pub use catalog::DeepSeekModel;
