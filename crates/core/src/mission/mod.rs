//! Mission Item Model
//!
//! Pure data structures for the three plan collections (mission, fence,
//! rally) and the editable collection that owns item identity and sequencing.
//!
//! # Item Format
//!
//! - Compatible with MAVLink MISSION_ITEM_INT (scaled integer coordinates)
//! - `seq` is the position in the collection and is rewritten on every
//!   structural edit
//! - `id` is stable across edits and never reused within a collection
//!
//! # Note
//!
//! This module contains only pure data types. Vehicle synchronization and
//! session ownership live in the host crate.

pub mod command;
pub mod filter;
pub mod frame;
pub mod state;
pub mod validation;

use alloc::vec::Vec;
use core::fmt;

pub use command::{cmd_has_location, is_nav_command, MissionCommand, MAV_CMD_NAV_LAST};
pub use filter::{filter_items, is_home_placeholder};
pub use frame::MissionFrame;
pub use state::{Mission, MissionProgress, MissionState};
pub use validation::{validate_items, IssueSeverity, MissionIssue};

/// Collection kind, matching MAV_MISSION_TYPE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissionType {
    Mission,
    Fence,
    Rally,
}

impl MissionType {
    pub const ALL: [MissionType; 3] = [MissionType::Mission, MissionType::Fence, MissionType::Rally];

    /// Stable index for per-collection tables.
    pub fn index(self) -> usize {
        match self {
            MissionType::Mission => 0,
            MissionType::Fence => 1,
            MissionType::Rally => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MissionType::Mission => "mission",
            MissionType::Fence => "fence",
            MissionType::Rally => "rally",
        }
    }

    /// Parse the lowercase name used on command lines and in logs.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "mission" => Some(MissionType::Mission),
            "fence" => Some(MissionType::Fence),
            "rally" => Some(MissionType::Rally),
            _ => None,
        }
    }
}

impl fmt::Display for MissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stable item identity within one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u32);

impl ItemId {
    /// Identity of an item not yet adopted by a collection.
    pub const UNASSIGNED: ItemId = ItemId(0);

    pub fn is_assigned(self) -> bool {
        self != Self::UNASSIGNED
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One command of a mission, fence or rally collection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MissionItem {
    /// Stable identity (assigned by [`ItemCollection`])
    pub id: ItemId,
    /// Sequence number (0-indexed, dense)
    pub seq: u16,
    pub command: MissionCommand,
    pub frame: MissionFrame,
    /// PARAM1 (jump target seq, polygon vertex count, circle radius, ...)
    pub param1: f32,
    /// PARAM2 (jump repeat count, acceptance radius, ...)
    pub param2: f32,
    pub param3: f32,
    pub param4: f32,
    /// X coordinate (latitude in degrees * 1e7)
    pub x: i32,
    /// Y coordinate (longitude in degrees * 1e7)
    pub y: i32,
    /// Z coordinate (altitude in meters)
    pub z: f32,
}

impl Default for MissionItem {
    fn default() -> Self {
        Self {
            id: ItemId::UNASSIGNED,
            seq: 0,
            command: MissionCommand::Waypoint,
            frame: MissionFrame::GlobalRelativeAlt,
            param1: 0.0,
            param2: 0.0,
            param3: 0.0,
            param4: 0.0,
            x: 0,
            y: 0,
            z: 0.0,
        }
    }
}

impl MissionItem {
    /// Create an unassigned item at the given scaled coordinates.
    ///
    /// # Arguments
    ///
    /// * `command` - Command kind
    /// * `lat` - Latitude in degrees * 1e7
    /// * `lon` - Longitude in degrees * 1e7
    /// * `alt` - Altitude in meters
    pub fn new(command: MissionCommand, lat: i32, lon: i32, alt: f32) -> Self {
        Self {
            command,
            x: lat,
            y: lon,
            z: alt,
            ..Self::default()
        }
    }

    /// Plain waypoint in the relative-altitude frame.
    pub fn waypoint(lat: i32, lon: i32, alt: f32) -> Self {
        Self::new(MissionCommand::Waypoint, lat, lon, alt)
    }

    /// DO_JUMP to `target_seq`, repeated `repeat` times.
    pub fn jump(target_seq: u16, repeat: u16) -> Self {
        Self {
            command: MissionCommand::Jump,
            frame: MissionFrame::Mission,
            param1: target_seq as f32,
            param2: repeat as f32,
            ..Self::default()
        }
    }

    pub fn with_frame(mut self, frame: MissionFrame) -> Self {
        self.frame = frame;
        self
    }

    pub fn with_params(mut self, param1: f32, param2: f32, param3: f32, param4: f32) -> Self {
        self.param1 = param1;
        self.param2 = param2;
        self.param3 = param3;
        self.param4 = param4;
        self
    }

    pub fn with_seq(mut self, seq: u16) -> Self {
        self.seq = seq;
        self
    }

    /// Get latitude in degrees
    pub fn latitude(&self) -> f64 {
        self.x as f64 / 1e7
    }

    /// Get longitude in degrees
    pub fn longitude(&self) -> f64 {
        self.y as f64 / 1e7
    }

    /// Get altitude in meters
    pub fn altitude(&self) -> f32 {
        self.z
    }

    /// False when either scaled coordinate is zero ("no coordinate").
    pub fn has_coordinate(&self) -> bool {
        self.x != 0 && self.y != 0
    }

    /// Jump target sequence number, for jump items.
    pub fn jump_target(&self) -> Option<u16> {
        match self.command {
            MissionCommand::Jump if self.param1 >= 0.0 && self.param1 <= u16::MAX as f32 => {
                Some(self.param1 as u16)
            }
            _ => None,
        }
    }

    /// Jump repeat count, negative counts clamped to zero.
    pub fn jump_repeat(&self) -> f64 {
        if self.param2 > 0.0 {
            self.param2 as f64
        } else {
            0.0
        }
    }

    /// Compare everything except identity.
    pub fn same_content(&self, other: &MissionItem) -> bool {
        MissionItem {
            id: other.id,
            ..*self
        } == *other
    }
}

/// Errors from collection edits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionError {
    /// No item with this id
    UnknownItem(ItemId),
    /// Insert position past the end
    IndexOutOfBounds(usize),
    /// Command not part of this collection's command set
    CommandNotAllowed {
        mission_type: MissionType,
        command: u16,
    },
    /// More items than a u16 sequence number can address
    Full,
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionError::UnknownItem(id) => write!(f, "no item {}", id),
            CollectionError::IndexOutOfBounds(index) => {
                write!(f, "item index {} out of bounds", index)
            }
            CollectionError::CommandNotAllowed {
                mission_type,
                command,
            } => write!(f, "command {} not allowed in {} collection", command, mission_type),
            CollectionError::Full => write!(f, "collection full"),
        }
    }
}

/// Editable, ordered item collection.
///
/// Owns identity assignment and sequencing: every structural edit leaves
/// `seq` dense and contiguous, and ids are never handed out twice.
#[derive(Debug, Clone)]
pub struct ItemCollection {
    mission_type: MissionType,
    items: Vec<MissionItem>,
    next_id: u32,
}

impl ItemCollection {
    /// Create a new empty collection
    pub fn new(mission_type: MissionType) -> Self {
        Self {
            mission_type,
            items: Vec::new(),
            next_id: 1,
        }
    }

    /// Create a collection adopting `items` in order (fresh ids, dense seq).
    pub fn from_items(mission_type: MissionType, items: impl IntoIterator<Item = MissionItem>) -> Self {
        let mut collection = Self::new(mission_type);
        collection.replace_all(items);
        collection
    }

    pub fn mission_type(&self) -> MissionType {
        self.mission_type
    }

    /// Get all items as slice
    pub fn items(&self) -> &[MissionItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ItemId) -> Option<&MissionItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Current index of the item with this id.
    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// Append an item, returning its new id.
    pub fn push(&mut self, item: MissionItem) -> Result<ItemId, CollectionError> {
        self.insert(self.items.len(), item)
    }

    /// Insert an item before `index` (`index == len` appends).
    pub fn insert(&mut self, index: usize, item: MissionItem) -> Result<ItemId, CollectionError> {
        self.check_command(item.command)?;
        if index > self.items.len() {
            return Err(CollectionError::IndexOutOfBounds(index));
        }
        if self.items.len() >= u16::MAX as usize {
            return Err(CollectionError::Full);
        }
        let id = self.allocate_id();
        self.items.insert(index, MissionItem { id, ..item });
        self.resequence();
        Ok(id)
    }

    /// Remove an item by id.
    pub fn remove(&mut self, id: ItemId) -> Result<MissionItem, CollectionError> {
        let index = self.position(id).ok_or(CollectionError::UnknownItem(id))?;
        let removed = self.items.remove(index);
        self.resequence();
        Ok(removed)
    }

    /// Move an item so that it ends up at `index`.
    pub fn move_item(&mut self, id: ItemId, index: usize) -> Result<(), CollectionError> {
        let from = self.position(id).ok_or(CollectionError::UnknownItem(id))?;
        if index >= self.items.len() {
            return Err(CollectionError::IndexOutOfBounds(index));
        }
        let item = self.items.remove(from);
        self.items.insert(index, item);
        self.resequence();
        Ok(())
    }

    /// Edit the fields of one item in place.
    ///
    /// Identity and sequence are restored after `f` runs, so the closure
    /// cannot break collection invariants.
    pub fn update<F>(&mut self, id: ItemId, f: F) -> Result<MissionItem, CollectionError>
    where
        F: FnOnce(&mut MissionItem),
    {
        let index = self.position(id).ok_or(CollectionError::UnknownItem(id))?;
        let mut edited = self.items[index];
        f(&mut edited);
        self.check_command(edited.command)?;
        edited.id = id;
        edited.seq = index as u16;
        self.items[index] = edited;
        Ok(edited)
    }

    /// Clear all items
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Replace every item with `items` (vehicle or file data).
    ///
    /// Items are adopted with fresh ids regardless of the ids they carry;
    /// commands are not checked against the collection's command set.
    /// Items past the `u16` sequence range are dropped. Returns the number
    /// of items adopted.
    pub fn replace_all(&mut self, items: impl IntoIterator<Item = MissionItem>) -> usize {
        self.items.clear();
        for item in items.into_iter().take(u16::MAX as usize) {
            let id = self.allocate_id();
            self.items.push(MissionItem { id, ..item });
        }
        self.resequence();
        self.items.len()
    }

    fn check_command(&self, command: MissionCommand) -> Result<(), CollectionError> {
        if command.allowed_in(self.mission_type) {
            Ok(())
        } else {
            Err(CollectionError::CommandNotAllowed {
                mission_type: self.mission_type,
                command: command.code(),
            })
        }
    }

    fn allocate_id(&mut self) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    fn resequence(&mut self) {
        for (index, item) in self.items.iter_mut().enumerate() {
            item.seq = index as u16;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn seqs(collection: &ItemCollection) -> Vec<u16> {
        collection.items().iter().map(|item| item.seq).collect()
    }

    #[test]
    fn test_item_coordinates() {
        let item = MissionItem::waypoint(370000000, -1220000000, 100.0);
        assert!((item.latitude() - 37.0).abs() < 0.0001);
        assert!((item.longitude() - (-122.0)).abs() < 0.0001);
        assert_eq!(item.altitude(), 100.0);
        assert!(item.has_coordinate());
    }

    #[test]
    fn test_zero_coordinate_is_missing() {
        assert!(!MissionItem::waypoint(0, 10, 0.0).has_coordinate());
        assert!(!MissionItem::waypoint(10, 0, 0.0).has_coordinate());
    }

    #[test]
    fn test_jump_accessors() {
        let jump = MissionItem::jump(3, 2);
        assert_eq!(jump.jump_target(), Some(3));
        assert_eq!(jump.jump_repeat(), 2.0);
        assert_eq!(MissionItem::waypoint(1, 1, 0.0).jump_target(), None);

        let negative = jump.with_params(1.0, -1.0, 0.0, 0.0);
        assert_eq!(negative.jump_repeat(), 0.0);
    }

    #[test]
    fn test_push_assigns_ids_and_seq() {
        let mut collection = ItemCollection::new(MissionType::Mission);
        let a = collection.push(MissionItem::waypoint(1, 1, 10.0)).unwrap();
        let b = collection.push(MissionItem::waypoint(2, 2, 10.0)).unwrap();
        assert_ne!(a, b);
        assert!(a.is_assigned());
        assert_eq!(seqs(&collection), vec![0, 1]);
    }

    #[test]
    fn test_insert_resequences() {
        let mut collection = ItemCollection::new(MissionType::Mission);
        let a = collection.push(MissionItem::waypoint(1, 1, 10.0)).unwrap();
        let b = collection.push(MissionItem::waypoint(2, 2, 10.0)).unwrap();
        let c = collection.insert(1, MissionItem::waypoint(3, 3, 10.0)).unwrap();

        assert_eq!(seqs(&collection), vec![0, 1, 2]);
        assert_eq!(collection.position(a), Some(0));
        assert_eq!(collection.position(c), Some(1));
        assert_eq!(collection.get(b).unwrap().seq, 2);
    }

    #[test]
    fn test_insert_out_of_bounds() {
        let mut collection = ItemCollection::new(MissionType::Mission);
        let result = collection.insert(1, MissionItem::waypoint(1, 1, 0.0));
        assert_eq!(result, Err(CollectionError::IndexOutOfBounds(1)));
    }

    #[test]
    fn test_remove_keeps_ids_stable() {
        let mut collection = ItemCollection::new(MissionType::Mission);
        let a = collection.push(MissionItem::waypoint(1, 1, 10.0)).unwrap();
        let b = collection.push(MissionItem::waypoint(2, 2, 10.0)).unwrap();
        let c = collection.push(MissionItem::waypoint(3, 3, 10.0)).unwrap();

        collection.remove(b).unwrap();
        assert_eq!(seqs(&collection), vec![0, 1]);
        assert_eq!(collection.get(c).unwrap().seq, 1);
        assert_eq!(collection.get(a).unwrap().seq, 0);
        assert_eq!(collection.remove(b), Err(CollectionError::UnknownItem(b)));
    }

    #[test]
    fn test_ids_never_reused() {
        let mut collection = ItemCollection::new(MissionType::Mission);
        let a = collection.push(MissionItem::waypoint(1, 1, 10.0)).unwrap();
        collection.remove(a).unwrap();
        let b = collection.push(MissionItem::waypoint(1, 1, 10.0)).unwrap();
        assert_ne!(a, b);

        collection.replace_all(vec![MissionItem::waypoint(5, 5, 0.0)]);
        let adopted = collection.items()[0].id;
        assert_ne!(adopted, a);
        assert_ne!(adopted, b);
    }

    #[test]
    fn test_move_item() {
        let mut collection = ItemCollection::new(MissionType::Mission);
        let a = collection.push(MissionItem::waypoint(1, 1, 10.0)).unwrap();
        let _b = collection.push(MissionItem::waypoint(2, 2, 10.0)).unwrap();
        let c = collection.push(MissionItem::waypoint(3, 3, 10.0)).unwrap();

        collection.move_item(c, 0).unwrap();
        assert_eq!(collection.position(c), Some(0));
        assert_eq!(collection.position(a), Some(1));
        assert_eq!(seqs(&collection), vec![0, 1, 2]);
        assert!(collection.move_item(a, 3).is_err());
    }

    #[test]
    fn test_update_preserves_identity() {
        let mut collection = ItemCollection::new(MissionType::Mission);
        let a = collection.push(MissionItem::waypoint(1, 1, 10.0)).unwrap();
        let updated = collection
            .update(a, |item| {
                item.z = 55.0;
                item.id = ItemId(999);
                item.seq = 40;
            })
            .unwrap();
        assert_eq!(updated.id, a);
        assert_eq!(updated.seq, 0);
        assert_eq!(collection.get(a).unwrap().z, 55.0);
    }

    #[test]
    fn test_command_set_enforced_on_edits() {
        let mut fence = ItemCollection::new(MissionType::Fence);
        let result = fence.push(MissionItem::waypoint(1, 1, 0.0));
        assert_eq!(
            result,
            Err(CollectionError::CommandNotAllowed {
                mission_type: MissionType::Fence,
                command: 16
            })
        );

        let circle = MissionItem::new(MissionCommand::FenceCircleInclusion, 1, 1, 0.0);
        let id = fence.push(circle).unwrap();
        assert!(fence
            .update(id, |item| item.command = MissionCommand::RallyPoint)
            .is_err());
        assert_eq!(fence.get(id).unwrap().command, MissionCommand::FenceCircleInclusion);
    }

    #[test]
    fn test_replace_all_accepts_vehicle_data() {
        let mut rally = ItemCollection::new(MissionType::Rally);
        rally.replace_all(vec![
            MissionItem::waypoint(1, 1, 0.0).with_seq(7),
            MissionItem::new(MissionCommand::RallyPoint, 2, 2, 0.0).with_seq(9),
        ]);
        assert_eq!(rally.len(), 2);
        assert_eq!(seqs(&rally), vec![0, 1]);
    }

    #[test]
    fn test_replace_all_reports_dropped_items() {
        let mut mission = ItemCollection::new(MissionType::Mission);
        let items = core::iter::repeat(MissionItem::waypoint(1, 1, 0.0)).take(65_536);
        let adopted = mission.replace_all(items);
        assert_eq!(adopted, u16::MAX as usize);
        assert_eq!(mission.len(), u16::MAX as usize);
        assert_eq!(mission.items().last().unwrap().seq, u16::MAX - 1);
    }

    #[test]
    fn test_same_content_ignores_id() {
        let a = MissionItem::waypoint(1, 2, 3.0);
        let b = MissionItem { id: ItemId(5), ..a };
        assert!(a.same_content(&b));
        assert!(!a.same_content(&MissionItem { z: 4.0, ..b }));
    }
}
