use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::errors::ServiceError;
use crate::storage::{CollectionStore, Keyed, Record, WriteGate};
use crate::validation;

/// A user record: caller-chosen `id` plus every other field the caller sent.
///
/// `name` and `email` are required at creation but live in `attributes`
/// like any extra field, so they are stored and merged verbatim.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl User {
    /// Build a user from a create payload, validating the required fields.
    pub fn from_fields(mut fields: Map<String, Value>) -> Result<Self, ServiceError> {
        validation::validate_new_user(&fields)?;
        let id = match fields.remove("id") {
            Some(Value::String(id)) => id,
            _ => return Err(ServiceError::Validation(validation::USER_FIELDS_REQUIRED.into())),
        };
        Ok(Self { id, attributes: fields })
    }

    pub fn name(&self) -> Option<&str> { self.attributes.get("name").and_then(Value::as_str) }

    pub fn email(&self) -> Option<&str> { self.attributes.get("email").and_then(Value::as_str) }

    /// Shallow merge: each supplied field replaces the stored one, `null`
    /// included. A supplied `id` must be a non-empty string and becomes the
    /// new identifier; uniqueness is checked by the caller.
    pub fn merge(&mut self, mut partial: Map<String, Value>) -> Result<(), ServiceError> {
        if let Some(id) = partial.remove("id") {
            match id {
                Value::String(id) if !id.is_empty() => self.id = id,
                _ => return Err(ServiceError::Validation(validation::USER_ID_INVALID.into())),
            }
        }
        self.attributes.extend(partial);
        Ok(())
    }
}

impl Keyed for User {
    fn key(&self) -> &str { &self.id }
}

const DUPLICATE_ID: &str = "User with the same ID already exists";

/// CRUD over the users collection.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn CollectionStore<User>>,
    gate: WriteGate,
}

impl UserService {
    pub fn new(store: Arc<dyn CollectionStore<User>>) -> Self {
        Self { store, gate: WriteGate::disabled() }
    }

    /// Serialize mutations of this collection within the process.
    pub fn with_serialized_writes(mut self) -> Self {
        self.gate = WriteGate::enabled();
        self
    }

    /// All users in storage order, including records of unexpected shape.
    pub async fn list(&self) -> Vec<Record<User>> {
        self.store.load().await
    }

    pub async fn get(&self, id: &str) -> Result<User, ServiceError> {
        self.store
            .load()
            .await
            .into_iter()
            .filter_map(Record::into_typed)
            .find(|u| u.id == id)
            .ok_or_else(|| ServiceError::not_found("User"))
    }

    /// Append a new user; fails with `Conflict` when the id is taken.
    pub async fn create(&self, fields: Map<String, Value>) -> Result<User, ServiceError> {
        let user = User::from_fields(fields)?;
        let _guard = self.gate.enter().await;
        let mut users = self.store.load().await;
        if users.iter().any(|r| r.key() == Some(user.id.as_str())) {
            return Err(ServiceError::Conflict(DUPLICATE_ID.into()));
        }
        users.push(Record::Typed(user.clone()));
        self.store.save(&users).await?;
        info!(collection = self.store.name(), user_id = %user.id, "user created");
        Ok(user)
    }

    /// Merge `partial` onto the stored user and return the merged record.
    ///
    /// A new `id` in `partial` renames the user unless another record
    /// already uses it.
    pub async fn update(&self, id: &str, partial: Map<String, Value>) -> Result<User, ServiceError> {
        let _guard = self.gate.enter().await;
        let mut users = self.store.load().await;
        let index = users
            .iter()
            .position(|r| r.typed().is_some_and(|u| u.id == id))
            .ok_or_else(|| ServiceError::not_found("User"))?;
        if let Some(Value::String(new_id)) = partial.get("id") {
            let taken = users
                .iter()
                .enumerate()
                .any(|(i, r)| i != index && r.key() == Some(new_id.as_str()));
            if taken {
                return Err(ServiceError::Conflict(DUPLICATE_ID.into()));
            }
        }
        let Some(existing) = users[index].typed_mut() else {
            return Err(ServiceError::not_found("User"));
        };
        existing.merge(partial)?;
        let updated = existing.clone();
        self.store.save(&users).await?;
        info!(collection = self.store.name(), user_id = %id, new_id = %updated.id, "user updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let _guard = self.gate.enter().await;
        let users = self.store.load().await;
        let before = users.len();
        let remaining: Vec<Record<User>> = users.into_iter().filter(|r| r.key() != Some(id)).collect();
        if remaining.len() == before {
            return Err(ServiceError::not_found("User"));
        }
        self.store.save(&remaining).await?;
        info!(collection = self.store.name(), user_id = %id, "user deleted");
        Ok(())
    }
}
