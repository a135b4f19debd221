use std::path::PathBuf;

use crate::game::room::RoomId;

/// Errors raised while wiring rooms together.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("room {0} does not exist")]
    UnknownRoom(RoomId),

    #[error("room {0} cannot be linked to itself")]
    SelfLink(RoomId),

    #[error("room {parent} already has a {side} child")]
    SlotOccupied { parent: RoomId, side: &'static str },

    #[error("room {0} already has a parent")]
    AlreadyLinked(RoomId),
}

/// Errors raised while loading a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("failed to read scenario file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed scenario JSON")]
    Parse(#[from] serde_json::Error),

    #[error("scenario title must not be empty")]
    EmptyTitle,

    #[error("every room needs a name")]
    EmptyRoomName,

    #[error(transparent)]
    Map(#[from] MapError),
}
