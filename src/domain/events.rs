use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of record a change event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    Player,
    Team,
    User,
}

/// What happened to the record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Add,
    Update,
    Delete,
}

/// Point-in-time change notification broadcast to live observers
///
/// Serialised as
/// `{"entity": "player", "action": "update", "id": 3, "correlationID": "..."}`.
///
/// # Example
/// ```
/// use fantasy_cricket_api::domain::events::{Action, ChangeEvent, Entity};
///
/// let event = ChangeEvent::new(Entity::Player, Action::Delete, None);
/// assert!(event.id.is_none());
/// assert!(!event.correlation_id.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub entity: Entity,
    pub action: Action,
    pub id: Option<i64>,
    #[serde(rename = "correlationID")]
    pub correlation_id: String,
}

impl ChangeEvent {
    /// Creates an event with a fresh correlation id
    pub fn new(entity: Entity, action: Action, id: Option<i64>) -> Self {
        Self {
            entity,
            action,
            id,
            correlation_id: Uuid::new_v4().to_string(),
        }
    }
}
