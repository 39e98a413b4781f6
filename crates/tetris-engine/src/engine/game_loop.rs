use std::time::Duration;

use rand::Rng;
use rand_pcg::Pcg32;

use crate::core::collision::Move;

use super::{
    game_state::{GameState, LockEvent, MoveOutcome},
    gravity::{delay_ticks, gravity_delay},
    input::{InputState, Key},
};

/// Callbacks run by [`GameLoop::tick`].
///
/// Both methods default to doing nothing. `()` is the no-op hook, and a
/// `Vec<LockEvent>` collects every lock.
pub trait TickHook<R = Pcg32> {
    /// Runs first in every tick, before gravity and input.
    fn before_tick(&mut self, state: &GameState<R>) {
        let _ = state;
    }

    /// Runs after each lock that happens during the tick.
    fn on_lock(&mut self, event: &LockEvent) {
        let _ = event;
    }
}

impl<R> TickHook<R> for () {}

impl<R> TickHook<R> for Vec<LockEvent> {
    fn on_lock(&mut self, event: &LockEvent) {
        self.push(event.clone());
    }
}

const REPEATING_KEYS: [Key; 3] = [Key::Left, Key::Right, Key::Down];
const ONE_SHOT_KEYS: [Key; 3] = [Key::Rotate, Key::HardDrop, Key::Hold];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Repeat {
    press_seq: Option<u64>,
    next_tick: u64,
}

/// Fixed-rate scheduler for gravity and keyboard input.
///
/// Each tick runs, in order:
///
/// 1. [`TickHook::before_tick`]
/// 2. gravity, once the level's drop delay has elapsed since the previous
///    automatic drop
/// 3. held `Left`, `Right` and `Down`: a move on the tick of the press, then
///    one every repeat delay; of `Left` and `Right` only the most recent press
///    moves
/// 4. `Rotate`, `HardDrop` and `Hold`, once per press
///
/// Time is counted in ticks; the loop never reads a clock.
#[derive(Debug, Clone)]
pub struct GameLoop {
    tick_rate_hz: u32,
    repeat_ticks: u64,
    accelerated_gravity: bool,
    ticks: u64,
    last_gravity_tick: u64,
    repeats: [Repeat; REPEATING_KEYS.len()],
    fired: [Option<u64>; ONE_SHOT_KEYS.len()],
}

impl GameLoop {
    #[must_use]
    pub fn new(tick_rate_hz: u32, move_repeat_delay: Duration, accelerated_gravity: bool) -> Self {
        let tick_rate_hz = tick_rate_hz.max(1);
        Self {
            tick_rate_hz,
            repeat_ticks: delay_ticks(move_repeat_delay, tick_rate_hz),
            accelerated_gravity,
            ticks: 0,
            last_gravity_tick: 0,
            repeats: [Repeat::default(); REPEATING_KEYS.len()],
            fired: [None; ONE_SHOT_KEYS.len()],
        }
    }

    #[must_use]
    pub fn tick_rate_hz(&self) -> u32 {
        self.tick_rate_hz
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate_hz
    }

    /// Ticks run so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Simulated time elapsed.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        const NANOS_PER_SEC: u64 = 1_000_000_000;
        let fps = u64::from(self.tick_rate_hz);
        let secs = self.ticks / fps;
        let nanos = (self.ticks % fps) * NANOS_PER_SEC / fps;
        let nanos = u32::try_from(nanos).expect("sub-second nanos should fit in u32");
        Duration::new(secs, nanos)
    }

    /// Ticks between automatic drops at `level`.
    #[must_use]
    pub fn gravity_ticks(&self, level: u32) -> u64 {
        let delay = gravity_delay(level, self.accelerated_gravity, self.tick_interval());
        delay_ticks(delay, self.tick_rate_hz)
    }

    /// Advances one tick.
    pub fn tick<R, H>(&mut self, state: &mut GameState<R>, input: &InputState, hook: &mut H)
    where
        R: Rng,
        H: TickHook<R> + ?Sized,
    {
        hook.before_tick(state);
        self.ticks += 1;

        if self.ticks - self.last_gravity_tick >= self.gravity_ticks(state.level()) {
            self.last_gravity_tick = self.ticks;
            report::<R, _>(hook, state.soft_drop());
        }

        let horizontal = input.horizontal();
        for (repeat, key) in self.repeats.iter_mut().zip(REPEATING_KEYS) {
            let Some(seq) = input.press_seq(key) else {
                *repeat = Repeat::default();
                continue;
            };
            if key != Key::Down && horizontal != Some(key) {
                continue;
            }
            let due = repeat.press_seq != Some(seq) || self.ticks >= repeat.next_tick;
            if !due {
                continue;
            }
            repeat.press_seq = Some(seq);
            repeat.next_tick = self.ticks + self.repeat_ticks;
            let outcome = match key {
                Key::Left => state.move_piece(Move::Left),
                Key::Right => state.move_piece(Move::Right),
                _ => state.soft_drop(),
            };
            report::<R, _>(hook, outcome);
        }

        for (fired, key) in self.fired.iter_mut().zip(ONE_SHOT_KEYS) {
            let Some(seq) = input.press_seq(key) else {
                continue;
            };
            if *fired == Some(seq) {
                continue;
            }
            *fired = Some(seq);
            match key {
                Key::Rotate => {
                    state.move_piece(Move::Rotate);
                }
                Key::HardDrop => report::<R, _>(hook, state.hard_drop()),
                _ => {
                    // Rejected holds leave the state unchanged.
                    state.hold().ok();
                }
            }
        }
    }
}

fn report<R, H>(hook: &mut H, outcome: MoveOutcome)
where
    H: TickHook<R> + ?Sized,
{
    if let MoveOutcome::Locked(event) = outcome {
        hook.on_lock(&event);
    }
}

#[cfg(test)]
mod tests {
    use crate::core::{
        board::BoardDims,
        piece::{Piece, PieceColor, PieceKind},
    };

    use super::*;
    use crate::engine::piece_generator::PieceSeed;

    fn setup() -> (GameLoop, GameState) {
        let seed: PieceSeed = "fedcba98765432100123456789abcdef".parse().unwrap();
        let mut state = GameState::with_seed(BoardDims::STANDARD, 1, seed);
        state
            .set_active_piece(Piece::spawn(PieceKind::T, PieceColor::Purple, 3))
            .unwrap();
        (GameLoop::new(60, Duration::from_millis(100), false), state)
    }

    fn origin(state: &GameState) -> (i16, i16) {
        let origin = state.active_piece().unwrap().origin();
        (origin.row, origin.col)
    }

    #[test]
    fn test_gravity_fires_after_delay() {
        let (mut game_loop, mut state) = setup();
        let input = InputState::new();
        assert_eq!(game_loop.gravity_ticks(1), 60);
        for _ in 0..59 {
            game_loop.tick(&mut state, &input, &mut ());
        }
        assert_eq!(origin(&state), (0, 3));
        game_loop.tick(&mut state, &input, &mut ());
        assert_eq!(origin(&state), (1, 3));
        assert_eq!(game_loop.elapsed(), Duration::from_secs(1));
    }

    #[test]
    fn test_gravity_locks_resting_piece_as_soft_drop() {
        let (mut game_loop, mut state) = setup();
        let landed = state.landing().unwrap();
        state.set_active_piece(landed).unwrap();
        let input = InputState::new();
        let mut events = Vec::new();
        for _ in 0..game_loop.gravity_ticks(state.level()) {
            game_loop.tick(&mut state, &input, &mut events);
        }
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, PieceKind::T);
        assert_eq!(events[0].drop_type, crate::DropType::Soft);
        assert_eq!(events[0].action, crate::ScoredAction::SoftDrop);
        assert_eq!(state.stats().score(), 1);
        assert_eq!(state.last_drop_type(), Some(crate::DropType::Soft));
    }

    #[test]
    fn test_held_key_moves_then_repeats() {
        let (mut game_loop, mut state) = setup();
        let mut input = InputState::new();
        input.press(Key::Left);
        game_loop.tick(&mut state, &input, &mut ());
        assert_eq!(origin(&state).1, 2);
        for _ in 0..5 {
            game_loop.tick(&mut state, &input, &mut ());
        }
        assert_eq!(origin(&state).1, 2);
        game_loop.tick(&mut state, &input, &mut ());
        assert_eq!(origin(&state).1, 1);
    }

    #[test]
    fn test_most_recent_direction_moves() {
        let (mut game_loop, mut state) = setup();
        let mut input = InputState::new();
        input.press(Key::Left);
        game_loop.tick(&mut state, &input, &mut ());
        input.press(Key::Right);
        game_loop.tick(&mut state, &input, &mut ());
        // Left moved once, then Right took over.
        assert_eq!(origin(&state).1, 3);
        input.release(Key::Right);
        for _ in 0..6 {
            game_loop.tick(&mut state, &input, &mut ());
        }
        assert_eq!(origin(&state).1, 2);
    }

    #[test]
    fn test_one_shot_keys_fire_once_per_press() {
        let (mut game_loop, mut state) = setup();
        let mut input = InputState::new();
        input.press(Key::Rotate);
        for _ in 0..10 {
            game_loop.tick(&mut state, &input, &mut ());
        }
        assert_eq!(state.active_piece().unwrap().rotation().as_index(), 1);

        input.release(Key::Rotate);
        game_loop.tick(&mut state, &input, &mut ());
        input.press(Key::Rotate);
        game_loop.tick(&mut state, &input, &mut ());
        assert_eq!(state.active_piece().unwrap().rotation().as_index(), 2);
    }

    #[test]
    fn test_rejected_hold_key_leaves_state() {
        let (mut game_loop, mut state) = setup();
        let mut input = InputState::new();
        input.press(Key::Hold);
        game_loop.tick(&mut state, &input, &mut ());
        assert_eq!(state.held_piece().unwrap().kind(), PieceKind::T);
        let active = state.active_piece().cloned();

        input.release(Key::Hold);
        game_loop.tick(&mut state, &input, &mut ());
        input.press(Key::Hold);
        game_loop.tick(&mut state, &input, &mut ());
        assert!(state.hold_slot().is_disabled());
        assert_eq!(state.held_piece().unwrap().kind(), PieceKind::T);
        assert_eq!(state.active_piece().cloned(), active);
    }

    #[test]
    fn test_hard_drop_reports_single_lock() {
        let (mut game_loop, mut state) = setup();
        let mut input = InputState::new();
        let mut events = Vec::new();
        input.press(Key::HardDrop);
        for _ in 0..20 {
            game_loop.tick(&mut state, &input, &mut events);
        }
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].drop_type, crate::DropType::Hard);
        assert_eq!(state.stats().completed_pieces(), 1);
    }

    #[test]
    fn test_hook_runs_before_each_tick() {
        struct Counter(usize, Vec<u64>);
        impl TickHook for Counter {
            fn before_tick(&mut self, state: &GameState) {
                self.0 += 1;
                self.1.push(state.stats().score());
            }
        }

        let (mut game_loop, mut state) = setup();
        let mut input = InputState::new();
        input.press(Key::HardDrop);
        let mut hook = Counter(0, Vec::new());
        game_loop.tick(&mut state, &input, &mut hook);
        game_loop.tick(&mut state, &input, &mut hook);
        assert_eq!(hook.0, 2);
        // The hook sees the state as it was before the tick's hard drop.
        assert_eq!(hook.1, vec![0, 2]);
    }
}
