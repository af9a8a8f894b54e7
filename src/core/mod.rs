pub mod etl;
pub mod generator;
pub mod join;
pub mod request;
pub mod transform;

pub use crate::domain::model::{Record, Table};
pub use crate::domain::ports::{Converter, Pipeline, Storage, TemplateEngine};
pub use crate::utils::error::Result;
pub use generator::{Delivery, Generator, Outcome, RunOptions};
pub use request::{GenerationRequest, ValidatedRequest};
