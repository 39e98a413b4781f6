use std::path::PathBuf;

use rand::Rng as _;
use serde::Serialize;
use tetris_engine::{PieceColor, PieceGenerator, PieceKind, PieceSeed};

use crate::util::Output;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PiecesArg {
    /// Piece seed as 32 hex digits (random if omitted)
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Number of pieces to print
    #[arg(long, default_value_t = 14)]
    count: usize,
    /// Output file path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct PieceSequence {
    seed: PieceSeed,
    pieces: Vec<PieceEntry>,
}

#[derive(Debug, Serialize)]
struct PieceEntry {
    kind: PieceKind,
    color: PieceColor,
}

pub(crate) fn run(arg: &PiecesArg) -> anyhow::Result<()> {
    let PiecesArg {
        seed,
        count,
        output,
    } = arg;

    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let mut generator = PieceGenerator::with_seed(seed);
    let pieces = (0..*count)
        .map(|_| {
            let piece = generator.next_piece();
            PieceEntry {
                kind: piece.kind(),
                color: piece.color(),
            }
        })
        .collect();

    Output::save_json(&PieceSequence { seed, pieces }, output.clone())?;
    Ok(())
}
