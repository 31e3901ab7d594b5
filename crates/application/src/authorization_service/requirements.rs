use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

use super::SubjectAccess;

/// Condition an actor must meet before a use-case runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessRequirement {
    /// Passes iff an active assignment's role name is in the set.
    AnyRole(BTreeSet<String>),
    /// Passes iff, for every resource, at least one listed action is granted.
    Permissions(BTreeMap<String, Vec<String>>),
}

impl AccessRequirement {
    /// Requirement on a single resource.
    #[must_use]
    pub fn permission<I, S>(resource: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Permissions(BTreeMap::from([(
            resource.into(),
            actions.into_iter().map(Into::into).collect(),
        )]))
    }

    /// Returns whether the resolved access meets the requirement.
    #[must_use]
    pub fn is_satisfied_by(&self, access: &SubjectAccess) -> bool {
        match self {
            Self::AnyRole(role_names) => access.holds_any_role(role_names),
            Self::Permissions(required) => required.iter().all(|(resource, actions)| {
                access.permissions.has_any_permission(resource, actions.as_slice())
            }),
        }
    }
}

impl Display for AccessRequirement {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AnyRole(role_names) => {
                let names: Vec<&str> = role_names.iter().map(String::as_str).collect();
                write!(formatter, "any role of [{}]", names.join(", "))
            }
            Self::Permissions(required) => {
                let clauses: Vec<String> = required
                    .iter()
                    .map(|(resource, actions)| format!("{resource}:{}", actions.join("|")))
                    .collect();
                write!(formatter, "permissions [{}]", clauses.join(", "))
            }
        }
    }
}
