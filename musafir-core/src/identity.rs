use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The acting user behind a mutating operation. Always passed explicitly;
/// the engine never reads ambient session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(id: Uuid, role: ActorRole) -> Self {
        Self { id, role }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    Customer,
    Organizer,
    Provider,
    Admin,
}

impl ActorRole {
    /// Normalize the free-form role strings seen in upstream systems.
    /// Unknown values fall back to the least-privileged role.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "organizer" => ActorRole::Organizer,
            "provider" | "service_provider" => ActorRole::Provider,
            "admin" => ActorRole::Admin,
            _ => ActorRole::Customer,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Customer => "customer",
            ActorRole::Organizer => "organizer",
            ActorRole::Provider => "provider",
            ActorRole::Admin => "admin",
        }
    }
}
