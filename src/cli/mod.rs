pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, CompileArgs, ConfigArgs, PackageArgs, PomArgs, RunArgs};
pub use output::{OutputFormat, OutputFormatter};
