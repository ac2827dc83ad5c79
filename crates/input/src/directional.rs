use glam::Vec2;

/// One of the four logical movement signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// "Is held" state of the four directions for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionalInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl DirectionalInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, direction: Direction, held: bool) {
        match direction {
            Direction::Up => self.up = held,
            Direction::Down => self.down = held,
            Direction::Left => self.left = held,
            Direction::Right => self.right = held,
        }
    }

    pub fn is_held(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }

    /// Velocity in world pixels per second. Y grows downward.
    ///
    /// Left is checked before right and up before down, so a pair of opposing
    /// keys resolves to left or up. Any non-zero result has magnitude `speed`.
    pub fn velocity(&self, speed: f32) -> Vec2 {
        let mut v = Vec2::ZERO;

        if self.left {
            v.x = -speed;
        } else if self.right {
            v.x = speed;
        }

        if self.up {
            v.y = -speed;
        } else if self.down {
            v.y = speed;
        }

        v.normalize_or_zero() * speed
    }
}
