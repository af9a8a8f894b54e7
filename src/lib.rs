pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{DocxTemplate, LocalStorage, SofficeConverter};
pub use config::toml_config::AppConfig;
pub use core::{etl::EtlEngine, Delivery, GenerationRequest, Generator, Outcome, RunOptions};
pub use domain::model::InputFile;
pub use domain::workflow::Workflow;
pub use utils::error::{DocsError, Result};
