use clap::{ArgAction, Parser};

#[derive(Parser)]
#[command(
    name = "ifacepropagate",
    about = "Generate Go methods that propagate optional interfaces through a wrapping struct",
    version
)]
pub struct Cli {
    /// Import path of the package to generate into
    pub package: String,

    /// Struct selector: `<receiver> [*]<Struct>.<Field>`
    pub selector: String,

    /// Comma separated interfaces, e.g. `io.ReaderFrom,syscall.Conn`
    pub interfaces: String,

    /// Path to package metadata JSONL (repeatable; later files win)
    #[arg(long = "meta", value_name = "PATH")]
    pub meta: Vec<String>,

    /// Name of the generated dispatch method
    #[arg(long = "func", value_name = "NAME")]
    pub function: Option<String>,

    /// Prefix for synthetic interface aliases
    #[arg(long, value_name = "PREFIX")]
    pub alias_prefix: Option<String>,

    /// Omit the generated-code header comment
    #[arg(long)]
    pub no_header: bool,

    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Compare FILE with the generated output and fail when it is stale
    #[arg(long, value_name = "FILE")]
    pub check: Option<String>,

    /// Output a JSON report instead of Go source
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
