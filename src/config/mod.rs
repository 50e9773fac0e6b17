//! Configuration Module
//!
//! Client settings and their environment variable sources.

pub mod settings;

pub use settings::{
    ClientConfig, ALLOWED_MODELS_ENV, API_KEY_ENV, BASE_URL_ENV, DEFAULT_BASE_URL,
    DEFAULT_TIMEOUT, TIMEOUT_ENV,
};
