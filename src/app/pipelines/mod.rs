pub mod letter_pipeline;
pub mod merge_pipeline;

pub use letter_pipeline::LetterPipeline;
pub use merge_pipeline::MergePipeline;
