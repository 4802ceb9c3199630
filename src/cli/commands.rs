use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Build, package and run single-file Java programs through Maven
#[derive(Parser, Debug)]
#[command(
    name = "javapack",
    about = "Build, package and run single-file Java programs through Maven",
    version,
    author,
    long_about = "javapack turns a loose .java file (or an existing pom.xml project) into a \
                  buildable Maven project, builds it, and runs or packages the result. \
                  Everything on the host classpath becomes a dependency of the synthesized \
                  project without being fetched from a repository."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(
        short = 'v',
        long,
        global = true,
        help = "Verbose logging and build output"
    )]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH_LIST",
        help = "Host classpath to declare as dependencies (platform path separator)"
    )]
    pub classpath: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Build a source file and run its main class",
        long_about = "Builds the given .java or pom.xml file (or Java source read from stdin) \
                      and runs its main class.\n\n\
                      Examples:\n  \
                      javapack run Hello.java\n  \
                      javapack run Hello.java -D debug=true -- first second\n  \
                      cat Hello.java | javapack run"
    )]
    Run(RunArgs),

    #[command(
        about = "Compile a source file or project",
        long_about = "Compiles a .java file or a pom.xml project without packaging it.\n\n\
                      Examples:\n  \
                      javapack compile Hello.java\n  \
                      javapack compile path/to/pom.xml"
    )]
    Compile(CompileArgs),

    #[command(
        about = "Package a source file or project into a jar",
        long_about = "Packages a .java file or a pom.xml project, optionally with a sources jar.\n\n\
                      Examples:\n  \
                      javapack package Hello.java -o hello.jar\n  \
                      javapack package pom.xml --sources"
    )]
    Package(PackageArgs),

    #[command(
        about = "Show the project descriptor a source file builds with",
        long_about = "Prints the pom.xml that would be used to build the given file, without \
                      building anything.\n\n\
                      Examples:\n  \
                      javapack pom Hello.java\n  \
                      javapack pom Hello.java --format json"
    )]
    Pom(PomArgs),

    #[command(about = "Show the effective configuration")]
    Config(ConfigArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    #[arg(value_name = "FILE", help = "Source file or pom.xml (reads stdin when omitted)")]
    pub file: Option<PathBuf>,

    #[arg(
        short = 'D',
        long = "define",
        value_name = "KEY=VALUE",
        help = "Set a binding such as verbose=true or debug=true"
    )]
    pub defines: Vec<String>,

    #[arg(last = true, value_name = "ARGS", help = "Arguments passed to the main class")]
    pub arguments: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompileArgs {
    #[arg(value_name = "FILE", help = "Source file or pom.xml")]
    pub file: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct PackageArgs {
    #[arg(value_name = "FILE", help = "Source file or pom.xml")]
    pub file: PathBuf,

    #[arg(
        short = 'o',
        long,
        value_name = "JAR",
        help = "Where to put the archive (defaults to <Name>.jar for source files)"
    )]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Also build a sources jar")]
    pub sources: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct PomArgs {
    #[arg(value_name = "FILE", help = "Source file or pom.xml (reads stdin when omitted)")]
    pub file: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "xml",
        help = "Output format"
    )]
    pub format: DescriptorFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorFormatArg {
    Xml,
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

impl From<DescriptorFormatArg> for super::output::OutputFormat {
    fn from(arg: DescriptorFormatArg) -> Self {
        match arg {
            DescriptorFormatArg::Xml => super::output::OutputFormat::Xml,
            DescriptorFormatArg::Json => super::output::OutputFormat::Json,
            DescriptorFormatArg::Yaml => super::output::OutputFormat::Yaml,
            DescriptorFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
