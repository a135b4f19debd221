use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::clues::DuplicatePolicy;
use crate::error::ScenarioError;
use crate::game::room::{truncate_chars, MAX_CLUE, MAX_NAME};
use crate::game::tree::RoomMap;
use crate::suspects::SuspectDirectory;

/// Nested description of a room and the rooms behind it.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomSpec {
    pub name: String,
    #[serde(default)]
    pub clue: Option<String>,
    #[serde(default)]
    pub left: Option<Box<RoomSpec>>,
    #[serde(default)]
    pub right: Option<Box<RoomSpec>>,
}

impl RoomSpec {
    pub fn new(name: &str, clue: Option<&str>) -> Self {
        Self {
            name: name.into(),
            clue: clue.map(Into::into),
            left: None,
            right: None,
        }
    }

    pub fn left(mut self, room: RoomSpec) -> Self {
        self.left = Some(Box::new(room));
        self
    }

    pub fn right(mut self, room: RoomSpec) -> Self {
        self.right = Some(Box::new(room));
        self
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        if self.name.trim().is_empty() {
            return Err(ScenarioError::EmptyRoomName);
        }
        for child in [&self.left, &self.right].into_iter().flatten() {
            child.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuspectLink {
    pub clue: String,
    pub suspect: String,
}

/// Everything needed to set up a round: the map, the clue/suspect rules
/// and the gameplay switches.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub title: String,
    pub map: RoomSpec,
    #[serde(default)]
    pub suspects: Vec<SuspectLink>,
    #[serde(default)]
    pub duplicate_clues: DuplicatePolicy,
    /// End the exploration as soon as the player reaches a room with no exits.
    #[serde(default)]
    pub stop_at_leaf: bool,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        info!("Loading scenario from: {}", path.display());
        let json = std::fs::read_to_string(path).map_err(|source| ScenarioError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        if self.title.trim().is_empty() {
            return Err(ScenarioError::EmptyTitle);
        }
        self.map.validate()
    }

    /// A fresh copy of the map with every clue in place.
    pub fn build_map(&self) -> Result<RoomMap, ScenarioError> {
        Ok(RoomMap::from_spec(&self.map)?)
    }

    /// Clue and suspect text is cut to the same limits as rooms and
    /// accusations, so long entries still match.
    pub fn build_directory(&self) -> SuspectDirectory {
        let mut directory = SuspectDirectory::new();
        for link in &self.suspects {
            directory.insert_or_update(
                &truncate_chars(&link.clue, MAX_CLUE),
                &truncate_chars(&link.suspect, MAX_NAME),
            );
        }
        directory
    }

    // -----------------------------------------------------------------------
    // Built-in mansion
    // -----------------------------------------------------------------------

    //                    Hall
    //                   /    \
    //              SalaEstar  Biblioteca
    //               /    \         \
    //          Cozinha  Jardim    Porão
    pub fn mansion() -> Self {
        let map = RoomSpec::new("Hall de Entrada", Some("Pegadas sujas no tapete"))
            .left(
                RoomSpec::new("Sala de Estar", Some("Uma xícara quebrada com monograma X"))
                    .left(RoomSpec::new("Cozinha", Some("Luvas com manchas vermelhas")))
                    .right(RoomSpec::new("Jardim", Some("Pegadas que saem para o portão"))),
            )
            .right(
                RoomSpec::new("Biblioteca", Some("Página arrancada do diário")).right(
                    RoomSpec::new("Porão", Some("Lanterna caída com poeira recente")),
                ),
            );

        let suspects = [
            ("Pegadas sujas no tapete", "Sr. Verdes"),
            ("Uma xícara quebrada com monograma X", "Sra. Xavier"),
            ("Página arrancada do diário", "Sra. Xavier"),
            ("Luvas com manchas vermelhas", "Sr. Vermelho"),
            ("Pegadas que saem para o portão", "Sr. Verdes"),
            ("Lanterna caída com poeira recente", "Sr. Cinza"),
        ]
        .into_iter()
        .map(|(clue, suspect)| SuspectLink {
            clue: clue.into(),
            suspect: suspect.into(),
        })
        .collect();

        Self {
            title: "Detective Quest".into(),
            map,
            suspects,
            duplicate_clues: DuplicatePolicy::Keep,
            stop_at_leaf: false,
        }
    }
}
