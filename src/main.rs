use clap::Parser;

use roikit::cli::{self, Cli};
use roikit::init_logging;

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let cli = Cli::parse();
    cli::run(cli)
}
