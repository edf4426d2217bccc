mod members;
mod search;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "chainscope",
    version,
    about = "Call-chain completion search over a Java-like type model",
    long_about = "Chainscope loads a JSON type model and searches for member-access chains \
                  (e.g. `a.getB().getC()`) that start from what is in scope at a completion \
                  site and end in a value assignable to the expected type."
)]
pub struct Cli {
    /// Also write log output to stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search completion chains for one or more expected types
    #[command(
        long_about = "Collects entry points from the given scope and searches chains that produce \
                            the expected type. Several --expected values are searched in order and \
                            merged up to the --max-chains cap."
    )]
    Search(search::SearchArgs),
    /// List the members visible on a type
    Members(members::MembersArgs),
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let _guard = chainscope_core::logging::init_logging("cli", cli.verbose);

    match cli.command {
        Commands::Search(args) => search::run(args),
        Commands::Members(args) => members::run(args),
    }
}
