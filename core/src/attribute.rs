//! The custom-attribute entity kind.

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityDescriptor};
use crate::mapper::EntityMapper;

/// Entity manager for attributes.
pub type AttributeManager<'a> = EntityMapper<'a, Attribute>;

const ATTRIBUTE_DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    base_path: "attributes",
    writable_fields: &["name"],
    lookup_field: "code",
};

/// A custom contact attribute. Only the name is writable; the server derives
/// the `code` used for lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(skip)]
    persisted: bool,
    pub name: Option<String>,
    pub code: Option<String>,
    pub url: Option<String>,
    pub usage_count: Option<u64>,
}

impl Entity for Attribute {
    fn descriptor() -> &'static EntityDescriptor {
        &ATTRIBUTE_DESCRIPTOR
    }

    fn lookup_value(&self) -> Option<&str> {
        self.code.as_deref().filter(|code| !code.is_empty())
    }

    fn is_persisted(&self) -> bool {
        self.persisted
    }

    fn set_persisted(&mut self, persisted: bool) {
        self.persisted = persisted;
    }
}
