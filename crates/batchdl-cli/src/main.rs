use batchdl_core::logging;

mod cli;

use crate::cli::CliCommand;

fn main() {
    let destination = logging::init();
    tracing::debug!("log destination: {:?}", destination);

    if let Err(err) = CliCommand::run_from_args() {
        eprintln!("batchdl error: {:#}", err);
        std::process::exit(1);
    }
}
