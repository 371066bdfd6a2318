//! NPC profile value object

use serde::{Deserialize, Serialize};

use crate::ids::NpcId;

/// The configured identity of a conversational NPC.
///
/// The persona is authored content: it becomes the backbone of the system
/// message that seeds every conversation with this NPC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcProfile {
    pub id: NpcId,
    /// Display name, also used in outward notifications
    pub name: String,
    /// Authored personality and speech guidance
    pub persona: String,
}

impl NpcProfile {
    pub fn new(name: impl Into<String>, persona: impl Into<String>) -> Self {
        Self {
            id: NpcId::new(),
            name: name.into(),
            persona: persona.into(),
        }
    }
}
