pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

#[cfg(feature = "cli")]
mod cli {
    use crate::domain::workflow::Workflow;
    use crate::utils::error::{DocsError, Result};
    use crate::utils::validation::{validate_file_extension, validate_path, Validate};
    use chrono::NaiveDate;
    use clap::Parser;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "intern-docs")]
    #[command(about = "Generates internship letters and merged finance reports")]
    pub struct CliConfig {
        /// Workflow to run
        #[arg(long, value_enum, required_unless_present = "list")]
        pub workflow: Option<Workflow>,

        /// Intern table (.xlsx or .csv) for letter workflows
        #[arg(long)]
        pub table: Option<String>,

        /// Word template (.docx) for letter workflows
        #[arg(long)]
        pub template: Option<String>,

        /// Primary report for merge workflows
        #[arg(long)]
        pub primary: Option<String>,

        /// Secondary report for merge workflows
        #[arg(long)]
        pub secondary: Option<String>,

        /// Output directory (overrides the config file)
        #[arg(long)]
        pub output: Option<String>,

        /// TOML configuration file
        #[arg(long)]
        pub config: Option<String>,

        /// Issue date shown in letters, DD/MM/YYYY (defaults to today)
        #[arg(long)]
        pub date: Option<String>,

        /// Skip PDF renditions
        #[arg(long)]
        pub no_rendition: bool,

        /// Print what would be produced without writing anything
        #[arg(long)]
        pub dry_run: bool,

        /// List available workflows and exit
        #[arg(long)]
        pub list: bool,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,
    }

    impl CliConfig {
        pub fn issue_date(&self, today: NaiveDate) -> Result<NaiveDate> {
            match &self.date {
                None => Ok(today),
                Some(value) => NaiveDate::parse_from_str(value.trim(), "%d/%m/%Y").map_err(|_| {
                    DocsError::InvalidConfigValueError {
                        field: "date".to_string(),
                        value: value.clone(),
                        reason: "Expected DD/MM/YYYY".to_string(),
                    }
                }),
            }
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            let tables = ["xlsx", "xlsm", "csv"];
            for (field, value) in [
                ("table", &self.table),
                ("primary", &self.primary),
                ("secondary", &self.secondary),
            ] {
                if let Some(path) = value {
                    validate_file_extension(field, path, &tables)?;
                }
            }
            if let Some(path) = &self.template {
                validate_file_extension("template", path, &["docx"])?;
            }
            if let Some(path) = &self.output {
                validate_path("output", path)?;
            }
            Ok(())
        }
    }

}
