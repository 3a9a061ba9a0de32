//! Room reconciliation
//!
//! Makes sure a named room exists and that a participant is in it, against a
//! remote store with no transactions and no name uniqueness guarantee.
//!
//! ```text
//! START -> LOOKUP -> CREATE | JOIN | NOOP -> DONE
//! ```
//!
//! Room updates replace the full member list, so every write is preceded by a
//! read, and a failed read aborts the reconciliation rather than risk writing a
//! member list that drops people. Membership is only ever added to.
//!
//! When two rooms share a name, the first one in listing order is used. There
//! is no client-side locking: if two callers create the same room at once, the
//! loser sees an "already exists" rejection, re-reads the listing, and joins
//! the winner's room.

use crate::error::Result;
use crate::types::{Room, RoomRequest};
use async_trait::async_trait;
use tracing::{error, info, instrument, warn};

/// Remote room storage.
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    /// Every room visible to the account, in service order.
    async fn list_rooms(&self) -> Result<Vec<Room>>;

    /// Create a room.
    async fn create_room(&self, request: &RoomRequest) -> Result<Room>;

    /// Replace a room's settings and member list.
    async fn update_room(&self, room_id: &str, request: &RoomRequest) -> Result<Room>;
}

/// What reconciliation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomAction {
    /// No room had the name; one was created.
    Created,
    /// The room existed without the participant; it was added.
    Joined,
    /// The participant was already a member; nothing was written.
    Unchanged,
}

/// Outcome of [`RoomReconciler::reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// The room as last returned by the service.
    pub room: Room,

    /// Which branch was taken.
    pub action: RoomAction,
}

impl Reconciliation {
    /// Stable room id.
    pub fn room_id(&self) -> &str {
        &self.room.id
    }

    /// Final member ids.
    pub fn member_ids(&self) -> Vec<&str> {
        self.room.member_ids()
    }
}

/// First room whose name matches exactly (case-sensitive).
pub fn find_by_name<'a>(rooms: &'a [Room], name: &str) -> Option<&'a Room> {
    rooms.iter().find(|room| room.name == name)
}

/// Ensures rooms exist and contain a participant.
pub struct RoomReconciler<'a, D: RoomDirectory + ?Sized> {
    directory: &'a D,
}

impl<'a, D: RoomDirectory + ?Sized> RoomReconciler<'a, D> {
    /// Reconcile against `directory`.
    pub fn new(directory: &'a D) -> Self {
        Self { directory }
    }

    /// Ensure a room named `desired.name` exists with `participant_id` in it.
    ///
    /// A new room is created with `desired.participant_ids`, with the
    /// participant put first if it is missing. An existing room only gains
    /// the participant; its other members are kept in their existing order.
    #[instrument(skip(self, desired), fields(room = %desired.name))]
    pub async fn reconcile(&self, desired: &RoomRequest, participant_id: &str) -> Result<Reconciliation> {
        let rooms = self.directory.list_rooms().await.map_err(|e| {
            error!("Room lookup failed, aborting: {}", e);
            e
        })?;

        if let Some(room) = find_by_name(&rooms, &desired.name) {
            return self.join(room.clone(), desired, participant_id).await;
        }

        info!("Creating room {}", desired.name);
        let request = RoomRequest {
            participant_ids: creation_members(&desired.participant_ids, participant_id),
            ..desired.clone()
        };

        match self.directory.create_room(&request).await {
            Ok(room) => {
                info!(room_id = %room.id, "Created room {}", room.name);
                Ok(Reconciliation {
                    room,
                    action: RoomAction::Created,
                })
            }
            Err(e) if e.is_already_exists() => {
                warn!("Room {} was created concurrently, re-reading rooms", desired.name);
                let rooms = self.directory.list_rooms().await?;
                match find_by_name(&rooms, &desired.name) {
                    Some(room) => self.join(room.clone(), desired, participant_id).await,
                    None => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn join(&self, room: Room, desired: &RoomRequest, participant_id: &str) -> Result<Reconciliation> {
        if room.has_member(participant_id) {
            info!(room_id = %room.id, "{} is already in room {}", participant_id, room.name);
            return Ok(Reconciliation {
                room,
                action: RoomAction::Unchanged,
            });
        }

        info!(room_id = %room.id, "Adding {} to room {}", participant_id, room.name);
        let request = RoomRequest {
            name: desired.name.clone(),
            note: desired.note.clone(),
            backchanneling_enabled: desired.backchanneling_enabled,
            participant_ids: joined_members(&room, participant_id),
        };

        let updated = self.directory.update_room(&room.id, &request).await?;
        Ok(Reconciliation {
            room: updated,
            action: RoomAction::Joined,
        })
    }
}

/// Members for a new room: the requested set, deduplicated, with the
/// participant first if it was not requested.
fn creation_members(requested: &[String], participant_id: &str) -> Vec<String> {
    let mut members: Vec<String> = Vec::with_capacity(requested.len() + 1);
    if !requested.iter().any(|id| id == participant_id) {
        members.push(participant_id.to_string());
    }
    for id in requested {
        if !members.contains(id) {
            members.push(id.clone());
        }
    }
    members
}

/// Members after a join: the participant, then existing members in order.
fn joined_members(room: &Room, participant_id: &str) -> Vec<String> {
    std::iter::once(participant_id)
        .chain(room.member_ids())
        .map(str::to_string)
        .collect()
}
