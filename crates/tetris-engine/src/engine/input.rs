use serde::{Deserialize, Serialize};

/// Physical game keys.
///
/// `Left`, `Right` and `Down` repeat while held; the others fire once per
/// press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Left,
    Right,
    Down,
    Rotate,
    HardDrop,
    Hold,
}

impl Key {
    pub const LEN: usize = 6;

    pub const ALL: [Self; Self::LEN] = [
        Self::Left,
        Self::Right,
        Self::Down,
        Self::Rotate,
        Self::HardDrop,
        Self::Hold,
    ];

    #[must_use]
    pub const fn as_index(self) -> usize {
        self as usize
    }

    /// Whether the key repeats while held.
    #[must_use]
    pub const fn is_repeating(self) -> bool {
        matches!(self, Self::Left | Self::Right | Self::Down)
    }
}

/// Single action applied to the active piece outside the tick schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Left,
    Right,
    Down,
    Rotate,
    HardDrop,
    Hold,
}

impl From<Key> for Command {
    fn from(key: Key) -> Self {
        match key {
            Key::Left => Self::Left,
            Key::Right => Self::Right,
            Key::Down => Self::Down,
            Key::Rotate => Self::Rotate,
            Key::HardDrop => Self::HardDrop,
            Key::Hold => Self::Hold,
        }
    }
}

/// Press or release of a key at a given tick, as recorded in input scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub tick: u64,
    pub key: Key,
    pub pressed: bool,
}

/// Currently held keys.
///
/// Each press gets an increasing sequence number. The loop uses it to detect
/// new presses of one-shot keys and to pick the most recently pressed of two
/// opposite directions.
///
/// # Example
///
/// ```
/// use tetris_engine::{InputState, Key};
///
/// let mut input = InputState::new();
/// input.press(Key::Left);
/// input.press(Key::Right);
/// assert_eq!(input.horizontal(), Some(Key::Right));
///
/// input.release(Key::Right);
/// assert_eq!(input.horizontal(), Some(Key::Left));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    pressed: [Option<u64>; Key::LEN],
    next_seq: u64,
}

impl InputState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` as held. Pressing a key that is already held is ignored.
    pub fn press(&mut self, key: Key) {
        let slot = &mut self.pressed[key.as_index()];
        if slot.is_none() {
            *slot = Some(self.next_seq);
            self.next_seq += 1;
        }
    }

    pub fn release(&mut self, key: Key) {
        self.pressed[key.as_index()] = None;
    }

    pub fn apply(&mut self, event: &KeyEvent) {
        if event.pressed {
            self.press(event.key);
        } else {
            self.release(event.key);
        }
    }

    pub fn release_all(&mut self) {
        self.pressed = [None; Key::LEN];
    }

    #[must_use]
    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed[key.as_index()].is_some()
    }

    /// Sequence number of the press that is holding `key`, if held.
    #[must_use]
    pub fn press_seq(&self, key: Key) -> Option<u64> {
        self.pressed[key.as_index()]
    }

    /// The held horizontal direction, preferring the most recent press.
    #[must_use]
    pub fn horizontal(&self) -> Option<Key> {
        match (self.press_seq(Key::Left), self.press_seq(Key::Right)) {
            (Some(left), Some(right)) if right > left => Some(Key::Right),
            (Some(_), _) => Some(Key::Left),
            (None, Some(_)) => Some(Key::Right),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repress_keeps_sequence() {
        let mut input = InputState::new();
        input.press(Key::Rotate);
        let seq = input.press_seq(Key::Rotate);
        input.press(Key::Rotate);
        assert_eq!(input.press_seq(Key::Rotate), seq);

        input.release(Key::Rotate);
        assert!(!input.is_pressed(Key::Rotate));
        input.press(Key::Rotate);
        assert_ne!(input.press_seq(Key::Rotate), seq);
    }

    #[test]
    fn test_most_recent_direction_wins() {
        let mut input = InputState::new();
        input.press(Key::Right);
        input.press(Key::Left);
        assert_eq!(input.horizontal(), Some(Key::Left));
        input.release(Key::Left);
        input.press(Key::Left);
        assert_eq!(input.horizontal(), Some(Key::Left));
        input.release_all();
        assert_eq!(input.horizontal(), None);
    }

    #[test]
    fn test_apply_key_events() {
        let mut input = InputState::new();
        let events: Vec<KeyEvent> = serde_json::from_str(
            r#"[{"tick":0,"key":"hard_drop","pressed":true},
                {"tick":3,"key":"hard_drop","pressed":false},
                {"tick":3,"key":"down","pressed":true}]"#,
        )
        .unwrap();
        input.apply(&events[0]);
        assert!(input.is_pressed(Key::HardDrop));
        input.apply(&events[1]);
        input.apply(&events[2]);
        assert!(!input.is_pressed(Key::HardDrop));
        assert!(input.is_pressed(Key::Down));
    }

    #[test]
    fn test_key_classes() {
        let repeating: Vec<_> = Key::ALL.into_iter().filter(|k| k.is_repeating()).collect();
        assert_eq!(repeating, [Key::Left, Key::Right, Key::Down]);
        assert_eq!(Command::from(Key::Hold), Command::Hold);
    }
}
