use javapack::cli::commands::{CliArgs, Commands};
use javapack::cli::handlers::{
    handle_compile, handle_config, handle_package, handle_pom, handle_run, EXIT_CONFIG_ERROR,
};
use javapack::util::{init_logging, LoggingConfig};
use javapack::{JavapackConfig, VERSION};

use clap::Parser;
use tracing::debug;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging(LoggingConfig::from_flags(
        args.log_level.as_deref(),
        args.verbose,
        args.quiet,
    ));

    debug!("javapack v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    // the orchestrator is dropped inside `run`, which purges deferred workspaces
    let exit_code = run(args).await;
    std::process::exit(exit_code);
}

async fn run(args: CliArgs) -> i32 {
    let mut config = match JavapackConfig::from_env() {
        Ok(config) => config.with_cli_classpath(args.classpath.clone()),
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_CONFIG_ERROR;
        }
    };
    if args.verbose {
        config.verbose = true;
    }

    if let Commands::Config(config_args) = &args.command {
        return handle_config(config_args, &config);
    }
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return EXIT_CONFIG_ERROR;
    }

    let orchestrator = config.create_orchestrator();
    match &args.command {
        Commands::Run(run_args) => handle_run(run_args, &orchestrator).await,
        Commands::Compile(compile_args) => handle_compile(compile_args, &orchestrator).await,
        Commands::Package(package_args) => handle_package(package_args, &orchestrator).await,
        Commands::Pom(pom_args) => handle_pom(pom_args, &orchestrator).await,
        Commands::Config(config_args) => handle_config(config_args, &config),
    }
}
