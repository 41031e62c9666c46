//! The mailing-list entity kind.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::{Entity, EntityDescriptor};
use crate::mapper::EntityMapper;

/// Entity manager for lists.
pub type ListManager<'a> = EntityMapper<'a, List>;

const LIST_DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    base_path: "lists",
    writable_fields: &["email", "name", "sender", "description"],
    lookup_field: "hash",
};

/// A list of subscribers.
///
/// The `hash` identity is assigned by the server on creation, which is why it
/// is the lookup field but not a writable one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct List {
    #[serde(skip)]
    persisted: bool,
    pub email: Option<String>,
    pub name: Option<String>,
    pub sender: Option<String>,
    pub description: Option<String>,
    pub hash: Option<String>,
    pub url: Option<String>,
    pub created: Option<String>,
    pub subscribers: Option<String>,
    pub subscribers_count: Option<u64>,
    pub active_subscribers_count: Option<u64>,
    pub responders_count: Option<u64>,
    pub responders: Option<Value>,
}

impl Entity for List {
    fn descriptor() -> &'static EntityDescriptor {
        &LIST_DESCRIPTOR
    }

    fn lookup_value(&self) -> Option<&str> {
        self.hash.as_deref().filter(|hash| !hash.is_empty())
    }

    fn is_persisted(&self) -> bool {
        self.persisted
    }

    fn set_persisted(&mut self, persisted: bool) {
        self.persisted = persisted;
    }
}
