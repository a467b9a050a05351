use clap::Parser;

use crate::models::CLIConfig;

#[derive(Debug, Parser)]
#[command(name = "key-rotator-cli", about = "Interactive client for the key rotator service")]
struct Args {
    /// Base URL of the key rotator service
    #[arg(long = "base", env = "KEY_ROTATOR_URL", default_value = "http://localhost:8080")]
    base_url: String,

    /// Print raw JSON responses
    #[arg(long, env = "KEY_ROTATOR_DEBUG")]
    debug: bool,
}

pub fn parse_config() -> CLIConfig {
    let args = Args::parse();
    CLIConfig {
        base_url: args.base_url,
        debug: args.debug,
    }
}
