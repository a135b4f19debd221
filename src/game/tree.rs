use crate::error::MapError;
use crate::game::room::{Room, RoomId, Side};
use crate::scenario::RoomSpec;

/// The mansion: a strict binary tree of rooms stored in an arena.
///
/// Rooms refer to their children by [`RoomId`]. Topology is fixed once the
/// map is built; the only thing that changes during play is a room's clue.
#[derive(Debug, Clone)]
pub struct RoomMap {
    rooms: Vec<Room>,
    has_parent: Vec<bool>,
}

impl RoomMap {
    /// Create a map holding only the root room.
    pub fn new(root_name: &str, root_clue: Option<&str>) -> Self {
        Self {
            rooms: vec![Room::new(root_name, root_clue)],
            has_parent: vec![false],
        }
    }

    /// Build the whole tree from a nested room description.
    pub fn from_spec(spec: &RoomSpec) -> Result<Self, MapError> {
        let mut map = Self::new(&spec.name, spec.clue.as_deref());
        let root = map.root();
        map.attach_children(root, spec)?;
        Ok(map)
    }

    fn attach_children(&mut self, parent: RoomId, spec: &RoomSpec) -> Result<(), MapError> {
        for (side, child) in [(Side::Left, &spec.left), (Side::Right, &spec.right)] {
            if let Some(child) = child {
                let id = self.add_room(&child.name, child.clue.as_deref());
                self.link(parent, side, id)?;
                self.attach_children(id, child)?;
            }
        }
        Ok(())
    }

    pub fn root(&self) -> RoomId {
        RoomId(0)
    }

    /// Allocate a detached room. It stays unreachable until linked.
    pub fn add_room(&mut self, name: &str, clue: Option<&str>) -> RoomId {
        self.rooms.push(Room::new(name, clue));
        self.has_parent.push(false);
        RoomId(self.rooms.len() - 1)
    }

    /// Make `child` the `side` exit of `parent`.
    pub fn link(&mut self, parent: RoomId, side: Side, child: RoomId) -> Result<(), MapError> {
        if parent == child {
            return Err(MapError::SelfLink(parent));
        }
        if child == self.root() || self.flag(child)? {
            return Err(MapError::AlreadyLinked(child));
        }
        let room = self.get_mut(parent).ok_or(MapError::UnknownRoom(parent))?;
        let slot = match side {
            Side::Left => &mut room.left,
            Side::Right => &mut room.right,
        };
        if slot.is_some() {
            return Err(MapError::SlotOccupied {
                parent,
                side: side.as_str(),
            });
        }
        *slot = Some(child);
        self.has_parent[child.0] = true;
        Ok(())
    }

    fn flag(&self, id: RoomId) -> Result<bool, MapError> {
        self.has_parent
            .get(id.0)
            .copied()
            .ok_or(MapError::UnknownRoom(id))
    }

    pub fn get(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id.0)
    }

    pub fn get_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Number of rooms on the longest path from the root.
    pub fn depth(&self) -> usize {
        self.longest_path(self.root())
    }

    fn longest_path(&self, id: RoomId) -> usize {
        let room = match self.get(id) {
            Some(r) => r,
            None => return 0,
        };
        let max_child = [room.left, room.right]
            .into_iter()
            .flatten()
            .map(|child| self.longest_path(child))
            .max()
            .unwrap_or(0);
        1 + max_child
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Scenario;

    #[test]
    fn test_link_builds_tree() {
        let mut map = RoomMap::new("Hall", None);
        let hall = map.root();
        let sala = map.add_room("Sala", Some("Xícara"));
        map.link(hall, Side::Left, sala).unwrap();

        assert_eq!(map.get(hall).unwrap().child(Side::Left), Some(sala));
        assert_eq!(map.get(hall).unwrap().child(Side::Right), None);
        assert_eq!(map.depth(), 2);
    }

    #[test]
    fn test_link_rejects_self_and_reparenting() {
        let mut map = RoomMap::new("Hall", None);
        let hall = map.root();
        let a = map.add_room("A", None);
        let b = map.add_room("B", None);

        assert!(matches!(map.link(a, Side::Left, a), Err(MapError::SelfLink(_))));
        assert!(matches!(
            map.link(a, Side::Left, hall),
            Err(MapError::AlreadyLinked(_))
        ));

        map.link(hall, Side::Left, a).unwrap();
        assert!(matches!(
            map.link(b, Side::Right, a),
            Err(MapError::AlreadyLinked(_))
        ));
        assert!(matches!(
            map.link(hall, Side::Left, b),
            Err(MapError::SlotOccupied { side: "left", .. })
        ));
    }

    #[test]
    fn test_link_unknown_room() {
        let mut map = RoomMap::new("Hall", None);
        let err = map.link(map.root(), Side::Left, RoomId(9)).unwrap_err();
        assert!(matches!(err, MapError::UnknownRoom(RoomId(9))));
    }

    #[test]
    fn test_mansion_layout() {
        let map = RoomMap::from_spec(&Scenario::mansion().map).unwrap();
        assert_eq!(map.len(), 6);
        assert_eq!(map.depth(), 3);

        let hall = map.get(map.root()).unwrap();
        assert_eq!(hall.name, "Hall de Entrada");

        let sala = map.get(hall.child(Side::Left).unwrap()).unwrap();
        assert_eq!(sala.name, "Sala de Estar");
        let biblioteca = map.get(hall.child(Side::Right).unwrap()).unwrap();
        assert_eq!(biblioteca.child(Side::Left), None);
        let porao = map.get(biblioteca.child(Side::Right).unwrap()).unwrap();
        assert_eq!(porao.name, "Porão");
        assert!(porao.is_leaf());
    }
}
