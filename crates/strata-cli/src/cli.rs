use clap::{ArgAction, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a query document into SQL statements and their arguments
    #[command(arg_required_else_help = true)]
    #[clap(name = "compile", visible_alias = "c")]
    Compile {
        /// Query document (.json or .toml); `-` reads JSON from stdin
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        file: String,

        /// Render inserts with inlined literal values (debug only, not injection-safe)
        #[arg(required = false, long)]
        raw: bool,

        /// Override the configured maximum rows per INSERT statement
        #[arg(required = false, short, long)]
        batch_size: Option<usize>,
    },

    /// Print the effective configuration
    Config,

    /// Write the default configuration file
    #[clap(name = "defconfig")]
    DefConfig {
        /// Overwrite an existing configuration file
        #[arg(required = false, short, long)]
        force: bool,
    },
}
