use clap::Parser;
use dtwin_cli::args::Cli;

fn main() -> anyhow::Result<()> {
    dtwin_cli::run(Cli::parse())
}
