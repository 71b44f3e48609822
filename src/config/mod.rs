//! Runtime settings for Configurate (`configurate.toml`).

pub mod settings;

pub use settings::Settings;
