use clap::{Parser, Subcommand};

use self::{pieces::PiecesArg, simulate::SimulateArg};

mod pieces;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run a headless match and write the final snapshot
    Simulate(#[clap(flatten)] SimulateArg),
    /// Print the piece sequence for a seed
    Pieces(#[clap(flatten)] PiecesArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Simulate(arg) => simulate::run(&arg)?,
        Mode::Pieces(arg) => pieces::run(&arg)?,
    }
    Ok(())
}
