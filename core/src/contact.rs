//! The contact entity kind and its subscription bookkeeping.
//!
//! # Design
//! A contact's list memberships live in `lists` as flat `Subscription`
//! records. The subscribe/unsubscribe/remove operations below only mutate the
//! in-memory entity; persisting the change is a separate `save` through the
//! manager. The wire format has two shape rules the generic normalization
//! does not cover: `attributes` always serializes as an object (never null)
//! and `lists` always as an array, so `Contact` overrides `normalize`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entity::{normalize_writable, Entity, EntityDescriptor};
use crate::error::ApiError;
use crate::mapper::EntityMapper;

/// Entity manager for contacts.
pub type ContactManager<'a> = EntityMapper<'a, Contact>;

const CONTACT_DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    base_path: "contacts",
    writable_fields: &["attributes", "first_name", "last_name", "lists", "email"],
    lookup_field: "email",
};

/// One list membership of a contact.
///
/// `hash` identifies the list; everything else is subscription metadata the
/// server may attach (`subscription_id`, timestamps, ...), passed through
/// untouched via `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Subscription {
    pub fn new(hash: &str) -> Self {
        Self {
            hash: hash.to_string(),
            ..Self::default()
        }
    }
}

/// A contact record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(skip)]
    persisted: bool,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub attributes: Option<Map<String, Value>>,
    pub lists: Option<Vec<Subscription>>,
    pub url: Option<String>,
    pub active: Option<bool>,
    pub created: Option<String>,
    pub updated: Option<String>,
}

impl Contact {
    fn is_subscribed_to(&self, hash: &str) -> bool {
        self.lists
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .any(|sub| sub.hash == hash)
    }

    /// Subscribe the contact to the list identified by `hash`.
    ///
    /// A no-op when a record with that hash already exists. In particular
    /// this never reactivates a cancelled subscription, it only keeps the
    /// record in the listing. Remember to `save` the contact afterwards.
    pub fn subscribe_to(&mut self, hash: &str) {
        if !self.is_subscribed_to(hash) {
            self.lists
                .get_or_insert_with(Vec::new)
                .push(Subscription::new(hash));
        }
    }

    /// Cancel the contact's subscription to the list identified by `hash`.
    ///
    /// Marks every matching record cancelled without removing it; a no-op
    /// when no record matches. Remember to `save` the contact afterwards.
    pub fn unsubscribe_from(&mut self, hash: &str) {
        if let Some(lists) = self.lists.as_mut() {
            for sub in lists.iter_mut().filter(|sub| sub.hash == hash) {
                sub.cancelled = Some(true);
            }
        }
    }

    /// Remove every subscription record matching `hash` from the contact.
    /// A no-op when no record matches. Remember to `save` the contact
    /// afterwards.
    pub fn delete_subscription_from(&mut self, hash: &str) {
        if let Some(lists) = self.lists.as_mut() {
            lists.retain(|sub| sub.hash != hash);
        }
    }
}

impl Entity for Contact {
    fn descriptor() -> &'static EntityDescriptor {
        &CONTACT_DESCRIPTOR
    }

    fn lookup_value(&self) -> Option<&str> {
        self.email.as_deref().filter(|email| !email.is_empty())
    }

    fn is_persisted(&self) -> bool {
        self.persisted
    }

    fn set_persisted(&mut self, persisted: bool) {
        self.persisted = persisted;
    }

    /// The generic payload, with `attributes` forced to an object and
    /// `lists` forced to an array, since the server rejects null for either.
    fn normalize(&self) -> Result<Map<String, Value>, ApiError> {
        let mut data = normalize_writable(self)?;
        data.insert(
            "attributes".to_string(),
            Value::Object(self.attributes.clone().unwrap_or_default()),
        );
        let lists = serde_json::to_value(self.lists.as_deref().unwrap_or(&[]))
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        data.insert("lists".to_string(), lists);
        Ok(data)
    }
}
