use std::fmt;

/// Longest room name kept, in characters. Longer names are cut, not rejected.
pub const MAX_NAME: usize = 63;
/// Longest clue text kept, in characters.
pub const MAX_CLUE: usize = 127;

/// Index of a room inside its [`RoomMap`](super::tree::RoomMap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoomId(pub(crate) usize);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which child of a room to move to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// A single room of the mansion.
#[derive(Debug, Clone)]
pub struct Room {
    /// Display name (e.g. "Hall de Entrada").
    pub name: String,
    /// Clue still lying in the room. `None` once collected, or if the room
    /// never had one.
    clue: Option<String>,
    pub(crate) left: Option<RoomId>,
    pub(crate) right: Option<RoomId>,
}

impl Room {
    /// Build a room with no exits. Overlong text is truncated and an empty
    /// clue counts as no clue.
    pub fn new(name: &str, clue: Option<&str>) -> Self {
        Self {
            name: truncate_chars(name, MAX_NAME),
            clue: clue
                .filter(|c| !c.is_empty())
                .map(|c| truncate_chars(c, MAX_CLUE)),
            left: None,
            right: None,
        }
    }

    #[cfg(test)]
    pub fn clue(&self) -> Option<&str> {
        self.clue.as_deref()
    }

    /// Remove the clue so a revisit finds nothing.
    pub fn take_clue(&mut self) -> Option<String> {
        self.clue.take()
    }

    pub fn child(&self, side: Side) -> Option<RoomId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Cut `s` to at most `max` characters without splitting a UTF-8 sequence.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
