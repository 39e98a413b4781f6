use std::{collections::VecDeque, fmt::Write as _, str::FromStr};

use arrayvec::ArrayVec;
use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::piece::{Piece, PieceColor, PieceKind};

/// Number of upcoming pieces kept in the lookahead queue.
pub const LOOKAHEAD: usize = 5;

/// Column where the left edge of a freshly spawned piece is placed.
pub const DEFAULT_SPAWN_COL: u8 = 3;

/// Seed for deterministic piece generation.
///
/// A 128-bit seed for the [`Pcg32`] generator, serialized as a 32-character
/// hex string. Using the same seed produces the same sequence of shapes and
/// colors.
///
/// # Example
///
/// ```
/// use tetris_engine::{PieceGenerator, PieceSeed};
///
/// let seed: PieceSeed = "0123456789abcdef0123456789abcdef".parse().unwrap();
/// let mut a = PieceGenerator::with_seed(seed);
/// let mut b = PieceGenerator::with_seed(seed);
/// for _ in 0..20 {
///     assert_eq!(a.next_piece(), b.next_piece());
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn to_hex(self) -> String {
        let num = u128::from_be_bytes(self.0);
        let mut hex_str = String::with_capacity(2 * self.0.len());
        // Writing to a String never fails.
        let _ = write!(&mut hex_str, "{num:032x}");
        hex_str
    }
}

impl FromStr for PieceSeed {
    type Err = String;

    fn from_str(hex_str: &str) -> Result<Self, Self::Err> {
        if hex_str.len() != 32 {
            return Err(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            ));
        }
        let num = u128::from_str_radix(hex_str, 16)
            .map_err(|e| format!("invalid hex: {hex_str} ({e})"))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `PieceSeed` values with `rng.random()`.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

/// Shuffled bag dealing each of its `N` items once before reshuffling.
#[derive(Debug, Clone)]
struct Bag<T, const N: usize> {
    items: [T; N],
    remaining: ArrayVec<T, N>,
}

impl<T, const N: usize> Bag<T, N>
where
    T: Copy,
{
    fn new(items: [T; N]) -> Self {
        Self {
            items,
            remaining: ArrayVec::new(),
        }
    }

    fn draw<R>(&mut self, rng: &mut R) -> T
    where
        R: Rng + ?Sized,
    {
        if self.remaining.is_empty() {
            let mut refill = self.items;
            refill.shuffle(rng);
            self.remaining.extend(refill);
        }
        self.remaining
            .pop()
            .expect("bag should never be empty after a refill")
    }
}

/// Bag-randomized supply of pieces with a lookahead queue.
///
/// Shapes and colors come from two independent 7-item bags. Each bag is
/// shuffled (Fisher–Yates) when it runs empty, so any shape or color repeats
/// at most 14 draws apart. The queue always holds [`LOOKAHEAD`] pieces after
/// each draw.
///
/// The random source is a type parameter so tests can inject a seeded
/// generator; the default is [`Pcg32`].
#[derive(Debug, Clone)]
pub struct PieceGenerator<R = Pcg32> {
    rng: R,
    shapes: Bag<PieceKind, { PieceKind::LEN }>,
    colors: Bag<PieceColor, { PieceColor::LEN }>,
    queue: VecDeque<Piece>,
    spawn_col: u8,
}

impl Default for PieceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceGenerator {
    /// Creates a generator with a random seed.
    ///
    /// For deterministic sequences, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self::with_rng(Pcg32::from_seed(seed.0))
    }
}

impl<R> PieceGenerator<R>
where
    R: Rng,
{
    /// Creates a generator drawing from the given random source.
    pub fn with_rng(rng: R) -> Self {
        let mut this = Self {
            rng,
            shapes: Bag::new(PieceKind::ALL),
            colors: Bag::new(PieceColor::ALL),
            queue: VecDeque::with_capacity(LOOKAHEAD + 1),
            spawn_col: DEFAULT_SPAWN_COL,
        };
        this.fill_queue();
        this
    }

    /// Places future pieces with their left edge at `spawn_col`.
    ///
    /// Pieces already in the queue are moved to the new column.
    #[must_use]
    pub fn with_spawn_col(mut self, spawn_col: u8) -> Self {
        self.spawn_col = spawn_col;
        for piece in &mut self.queue {
            *piece = piece.respawned(spawn_col);
        }
        self
    }

    #[must_use]
    pub fn spawn_col(&self) -> u8 {
        self.spawn_col
    }

    fn fill_queue(&mut self) {
        while self.queue.len() < LOOKAHEAD {
            let kind = self.shapes.draw(&mut self.rng);
            let color = self.colors.draw(&mut self.rng);
            self.queue
                .push_back(Piece::spawn(kind, color, self.spawn_col));
        }
    }

    /// Pops the head of the lookahead queue and refills it.
    ///
    /// The returned piece is at the spawn column in orientation 0.
    pub fn next_piece(&mut self) -> Piece {
        self.fill_queue();
        let piece = self.queue.pop_front();
        self.fill_queue();
        piece.expect("lookahead queue should be filled before pop")
    }

    /// Upcoming pieces, next first.
    pub fn next_pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.queue.iter()
    }
}
