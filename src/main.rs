use breakout_bt::cli::{Cli, run};
use breakout_bt::logging::init_logging;
use clap::Parser;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    run(cli)
}
