pub mod settings;

pub use settings::{Config, ConfigError, DaemonConfig, LLMConfig, Provider, SearchConfig, ShellConfig};
