//! Permission grants and the aggregation of grants across roles.
//!
//! A role carries a [`PermissionMap`] from resource name to [`PermissionGrant`].
//! The grants of every role attached to a subject's active assignments merge into
//! one [`EffectivePermissionSet`]: wildcard grants absorb narrower ones and action
//! lists union. Aggregation is commutative and never fails.

use std::collections::{BTreeMap, BTreeSet};

use serde::de::Deserializer;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::RoleDefinition;

/// Well-known action names used by the built-in resources.
pub mod actions {
    /// Wildcard marker granting every action on a resource.
    pub const ALL: &str = "all";
    /// Read access.
    pub const READ: &str = "read";
    /// Write access.
    pub const WRITE: &str = "write";
    /// Create access.
    pub const CREATE: &str = "create";
    /// Update access.
    pub const UPDATE: &str = "update";
    /// Delete access.
    pub const DELETE: &str = "delete";
    /// Approval of pending records such as memberships.
    pub const APPROVE: &str = "approve";
    /// Assignment of roles to subjects.
    pub const ASSIGN: &str = "assign";
    /// Full management of a resource.
    pub const MANAGE: &str = "manage";
}

/// Grant of one role on one resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PermissionGrant {
    /// No action is granted.
    #[default]
    NoGrant,
    /// An explicit, deduplicated set of action names.
    Actions(BTreeSet<String>),
    /// Every action on the resource is granted.
    All,
}

impl PermissionGrant {
    /// Builds a grant from action names. A literal `"all"` makes the grant a wildcard
    /// and an empty list yields [`PermissionGrant::NoGrant`].
    #[must_use]
    pub fn actions<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut collected = BTreeSet::new();
        for value in values {
            let action = value.as_ref().trim();
            if action.is_empty() {
                continue;
            }
            if action == actions::ALL {
                return Self::All;
            }
            collected.insert(action.to_owned());
        }

        if collected.is_empty() {
            Self::NoGrant
        } else {
            Self::Actions(collected)
        }
    }

    /// Decodes a stored grant leniently.
    ///
    /// `true` and `"all"` are wildcards, a string is a single action, an array is a
    /// list of actions. Anything else grants nothing.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Bool(true) => Self::All,
            Value::String(action) => Self::actions([action.as_str()]),
            Value::Array(items) => Self::actions(items.iter().filter_map(Value::as_str)),
            _ => Self::NoGrant,
        }
    }

    /// Returns whether this grant allows the action.
    #[must_use]
    pub fn allows(&self, action: &str) -> bool {
        match self {
            Self::NoGrant => false,
            Self::Actions(granted) => granted.contains(action),
            Self::All => true,
        }
    }

    /// Returns whether the grant is the wildcard.
    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Returns the transport form: `["all"]` for wildcards, sorted actions otherwise.
    #[must_use]
    pub fn to_action_list(&self) -> Vec<String> {
        match self {
            Self::NoGrant => Vec::new(),
            Self::Actions(granted) => granted.iter().cloned().collect(),
            Self::All => vec![actions::ALL.to_owned()],
        }
    }

    /// Merges another grant into this one. Wildcards absorb, action sets union.
    pub fn merge(&mut self, other: &Self) {
        match (&mut *self, other) {
            (Self::All, _) | (_, Self::NoGrant) => {}
            (_, Self::All) => *self = Self::All,
            (Self::Actions(current), Self::Actions(incoming)) => {
                current.extend(incoming.iter().cloned());
            }
            (Self::NoGrant, Self::Actions(incoming)) => *self = Self::Actions(incoming.clone()),
        }
    }
}

impl Serialize for PermissionGrant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let values = self.to_action_list();
        let mut sequence = serializer.serialize_seq(Some(values.len()))?;
        for value in &values {
            sequence.serialize_element(value)?;
        }
        sequence.end()
    }
}

impl<'de> Deserialize<'de> for PermissionGrant {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_json(&value))
    }
}

/// Permission grants declared by one role, keyed by resource name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionMap(BTreeMap<String, PermissionGrant>);

impl PermissionMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the grant for a resource.
    #[must_use]
    pub fn with_grant(mut self, resource: impl Into<String>, grant: PermissionGrant) -> Self {
        self.0.insert(resource.into(), grant);
        self
    }

    /// Decodes a stored permission document. Non-object documents decode as empty.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let Value::Object(entries) = value else {
            return Self::default();
        };

        Self(
            entries
                .iter()
                .map(|(resource, grant)| (resource.clone(), PermissionGrant::from_json(grant)))
                .collect(),
        )
    }

    /// Encodes the map as a JSON object of action arrays.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(resource, grant)| {
                    (
                        resource.clone(),
                        Value::Array(
                            grant
                                .to_action_list()
                                .into_iter()
                                .map(Value::String)
                                .collect(),
                        ),
                    )
                })
                .collect(),
        )
    }

    /// Iterates over resource grants in resource order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PermissionGrant)> {
        self.0
            .iter()
            .map(|(resource, grant)| (resource.as_str(), grant))
    }

    /// Returns the grant for one resource.
    #[must_use]
    pub fn get(&self, resource: &str) -> Option<&PermissionGrant> {
        self.0.get(resource)
    }

    /// Returns whether the map declares no grants.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for PermissionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (resource, grant) in &self.0 {
            map.serialize_entry(resource, grant)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PermissionMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_json(&value))
    }
}

/// Effective permissions of one subject, derived from its active roles.
///
/// Never persisted: it is recomputed whenever an authorization decision is made.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectivePermissionSet(BTreeMap<String, PermissionGrant>);

impl EffectivePermissionSet {
    /// Merges the grants of the provided roles.
    ///
    /// Callers pass only roles attached to active assignments; this function does
    /// no activity filtering of its own.
    #[must_use]
    pub fn aggregate<'a, I>(roles: I) -> Self
    where
        I: IntoIterator<Item = &'a RoleDefinition>,
    {
        let mut effective = Self::default();
        for role in roles {
            effective.merge_map(&role.permissions);
        }
        effective
    }

    /// Merges one permission map into the set.
    pub fn merge_map(&mut self, permissions: &PermissionMap) {
        for (resource, grant) in permissions.iter() {
            if matches!(grant, PermissionGrant::NoGrant) {
                continue;
            }
            self.0
                .entry(resource.to_owned())
                .or_default()
                .merge(grant);
        }
    }

    /// Returns true iff the resource is wildcard-granted or lists the action.
    #[must_use]
    pub fn has_permission(&self, resource: &str, action: &str) -> bool {
        self.0
            .get(resource)
            .is_some_and(|grant| grant.allows(action))
    }

    /// Returns true iff at least one of the actions is granted on the resource.
    #[must_use]
    pub fn has_any_permission<S: AsRef<str>>(&self, resource: &str, actions: &[S]) -> bool {
        match self.0.get(resource) {
            Some(PermissionGrant::All) => true,
            Some(grant) => actions.iter().any(|action| grant.allows(action.as_ref())),
            None => false,
        }
    }

    /// Returns the merged grant for a resource.
    #[must_use]
    pub fn grant(&self, resource: &str) -> Option<&PermissionGrant> {
        self.0.get(resource)
    }

    /// Iterates over merged grants in resource order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PermissionGrant)> {
        self.0
            .iter()
            .map(|(resource, grant)| (resource.as_str(), grant))
    }

    /// Returns the transport form: resource to `["all"]` or its action list.
    #[must_use]
    pub fn to_transport(&self) -> BTreeMap<String, Vec<String>> {
        self.0
            .iter()
            .map(|(resource, grant)| (resource.clone(), grant.to_action_list()))
            .collect()
    }

    /// Returns whether no resource is granted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for EffectivePermissionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (resource, grant) in &self.0 {
            map.serialize_entry(resource, grant)?;
        }
        map.end()
    }
}
