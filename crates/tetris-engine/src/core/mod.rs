pub use self::{board::*, collision::*, piece::*, rotation::*, shape::*};

pub(crate) mod board;
pub(crate) mod collision;
pub(crate) mod piece;
pub(crate) mod rotation;
pub(crate) mod shape;
