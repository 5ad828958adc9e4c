/// Platform-agnostic keyboard input for the raft
use std::fmt;

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    FocusLost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Forward,
        Direction::Backward,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit basis vector on the XZ plane. Forward moves away from the
    /// default camera (-Z), right is +X.
    pub fn basis(self) -> glam::Vec3 {
        match self {
            Direction::Forward => glam::Vec3::NEG_Z,
            Direction::Backward => glam::Vec3::Z,
            Direction::Left => glam::Vec3::NEG_X,
            Direction::Right => glam::Vec3::X,
        }
    }

    fn idx(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}

/// Held state of the four directions. Sampled by value once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    held: [bool; 4],
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_held(directions: &[Direction]) -> Self {
        let mut state = Self::new();
        for d in directions {
            state.set(*d, true);
        }
        state
    }

    pub fn is_held(&self, direction: Direction) -> bool {
        self.held[direction.idx()]
    }

    pub fn set(&mut self, direction: Direction, held: bool) {
        self.held[direction.idx()] = held;
    }

    pub fn held(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL.into_iter().filter(|d| self.is_held(*d))
    }

    pub fn clear(&mut self) {
        self.held = [false; 4];
    }

    /// Apply an event using `bindings`. Unbound keys are ignored.
    pub fn process_event(&mut self, event: &InputEvent, bindings: &KeyBindings) {
        match event {
            InputEvent::KeyDown(key) => {
                if let Some(direction) = bindings.direction_for(key) {
                    self.set(direction, true);
                }
            }
            InputEvent::KeyUp(key) => {
                if let Some(direction) = bindings.direction_for_release(key) {
                    self.set(direction, false);
                }
            }
            InputEvent::FocusLost => self.clear(),
        }
    }
}

/// Key mapping configuration
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: "w".to_string(),
            backward: "s".to_string(),
            left: "a".to_string(),
            right: "d".to_string(),
        }
    }
}

impl KeyBindings {
    /// Exact match on the key identity, so `W` (shift held) is not `w`.
    pub fn direction_for(&self, key: &str) -> Option<Direction> {
        if key == self.forward {
            Some(Direction::Forward)
        } else if key == self.backward {
            Some(Direction::Backward)
        } else if key == self.left {
            Some(Direction::Left)
        } else if key == self.right {
            Some(Direction::Right)
        } else {
            None
        }
    }

    /// Release lookup. Ignores ASCII case, so a key pressed as `w` and
    /// released with Shift held (`W`) is still released.
    pub fn direction_for_release(&self, key: &str) -> Option<Direction> {
        self.direction_for(key).or_else(|| {
            [
                (&self.forward, Direction::Forward),
                (&self.backward, Direction::Backward),
                (&self.left, Direction::Left),
                (&self.right, Direction::Right),
            ]
            .into_iter()
            .find(|(bound, _)| bound.eq_ignore_ascii_case(key))
            .map(|(_, direction)| direction)
        })
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::InputEvent;
    use web_sys::KeyboardEvent;

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let key = e.key();
        if is_down {
            InputEvent::KeyDown(key)
        } else {
            InputEvent::KeyUp(key)
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub mod native {
    use super::InputEvent;
    use winit::event::ElementState;
    use winit::keyboard::{KeyCode, PhysicalKey};

    /// Physical key to the key identity the browser would report for it.
    pub fn key_identity(key: PhysicalKey) -> Option<&'static str> {
        match key {
            PhysicalKey::Code(KeyCode::KeyW) => Some("w"),
            PhysicalKey::Code(KeyCode::KeyA) => Some("a"),
            PhysicalKey::Code(KeyCode::KeyS) => Some("s"),
            PhysicalKey::Code(KeyCode::KeyD) => Some("d"),
            _ => None,
        }
    }

    pub fn key_event_to_input(key: PhysicalKey, state: ElementState) -> Option<InputEvent> {
        let key = key_identity(key)?.to_string();
        Some(match state {
            ElementState::Pressed => InputEvent::KeyDown(key),
            ElementState::Released => InputEvent::KeyUp(key),
        })
    }
}
