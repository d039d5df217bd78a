use clap::Parser;
use provmap::config::Cli;

fn main() -> anyhow::Result<()> {
    provmap::run(Cli::parse())
}
