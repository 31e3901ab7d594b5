//! Built-in executive and committee roles installed on first start.

use std::collections::BTreeSet;

use chapterdesk_application::{RoleFilter, RoleRepository};
use chapterdesk_core::{AppResult, NonEmptyString};
use chapterdesk_domain::{
    PermissionGrant, PermissionMap, RoleDefinition, RoleId, RoleScopeKind, actions,
};

const CHAPTER_EXECUTIVES: &[&str] = &[
    "Chairman",
    "Vice Chairman",
    "Secretary",
    "Assistant Secretary",
    "Treasurer",
    "Assistant Treasurer",
    "Organiser",
    "Deputy Organiser",
    "Youth Organiser",
    "Deputy Youth Organiser",
    "Women's Organiser",
    "Deputy Women's Organiser",
    "Public Relations Officer (PRO)",
    "Deputy PRO",
    "Welfare Officer",
];

const BRANCH_EXECUTIVES: &[&str] = &[
    "Branch Chairman",
    "Branch Secretary",
    "Branch Treasurer",
    "Branch Organiser",
    "Branch Youth Organiser",
    "Branch Women's Organiser",
    "Branch Welfare Officer",
    "Branch PRO",
    "Branch Executive Member",
];

const COMMITTEES: &[&str] = &[
    "Finance",
    "Public Relations",
    "Research",
    "Organisation",
    "Welfare",
    "Complaints",
    "Disciplinary",
    "Audit",
];

fn permissions_for(name: &str) -> PermissionMap {
    match name {
        "Chairman" | "Secretary" => PermissionMap::new()
            .with_grant("roles", PermissionGrant::All)
            .with_grant("assignments", PermissionGrant::All)
            .with_grant("branches", PermissionGrant::All)
            .with_grant(
                "members",
                PermissionGrant::actions([actions::READ, actions::APPROVE]),
            ),
        "Vice Chairman" => PermissionMap::new()
            .with_grant("assignments", PermissionGrant::actions([actions::READ]))
            .with_grant("branches", PermissionGrant::actions([actions::READ]))
            .with_grant("members", PermissionGrant::actions([actions::READ])),
        "Branch Chairman" | "Branch Secretary" => PermissionMap::new()
            .with_grant("assignments", PermissionGrant::actions([actions::READ]))
            .with_grant(
                "branches",
                PermissionGrant::actions([actions::READ, actions::UPDATE]),
            )
            .with_grant(
                "members",
                PermissionGrant::actions([actions::READ, actions::APPROVE]),
            ),
        _ => PermissionMap::new(),
    }
}

fn definition(name: String, scope_kind: RoleScopeKind, category: &str) -> AppResult<RoleDefinition> {
    Ok(RoleDefinition {
        role_id: RoleId::new(),
        permissions: permissions_for(name.as_str()),
        name: NonEmptyString::new(name)?,
        scope_kind,
        category: Some(category.to_owned()),
        description: None,
        is_active: true,
    })
}

/// Returns the built-in role catalog with fresh identifiers.
pub fn default_roles() -> AppResult<Vec<RoleDefinition>> {
    let chapter = CHAPTER_EXECUTIVES.iter().map(|name| {
        definition((*name).to_owned(), RoleScopeKind::Chapter, "Chapter Executive")
    });
    let branch = BRANCH_EXECUTIVES
        .iter()
        .map(|name| definition((*name).to_owned(), RoleScopeKind::Branch, "Branch Executive"));
    let committees = COMMITTEES.iter().flat_map(|committee| {
        ["Chair", "Member"].into_iter().map(move |position| {
            definition(
                format!("{committee} Committee {position}"),
                RoleScopeKind::Both,
                "Committee",
            )
        })
    });

    chapter.chain(branch).chain(committees).collect()
}

/// Installs every built-in role whose name is not yet taken.
///
/// Existing roles are left untouched, including deactivated ones. Returns the
/// number of roles created.
pub async fn seed_default_roles(roles: &dyn RoleRepository) -> AppResult<usize> {
    let existing: BTreeSet<String> = roles
        .list_roles(&RoleFilter {
            include_inactive: true,
            ..RoleFilter::default()
        })
        .await?
        .into_iter()
        .map(|role| role.name().to_owned())
        .collect();

    let mut created = 0;
    for role in default_roles()? {
        if existing.contains(role.name()) {
            continue;
        }

        roles.create_role(role).await?;
        created += 1;
    }

    if created > 0 {
        tracing::info!(created, "installed built-in roles");
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use chapterdesk_application::{RoleFilter, RoleRepository};
    use chapterdesk_domain::{RoleScopeKind, RoleTaxonomy};

    use super::{default_roles, seed_default_roles};
    use crate::InMemoryStore;

    #[test]
    fn catalog_covers_every_taxonomy_role() {
        let roles = default_roles().unwrap_or_else(|error| panic!("catalog invalid: {error}"));
        let taxonomy = RoleTaxonomy::default();

        for name in taxonomy.any_leadership() {
            assert!(
                roles.iter().any(|role| role.name() == name),
                "missing built-in role {name}"
            );
        }
        assert!(
            roles
                .iter()
                .filter(|role| role.name().starts_with("Branch "))
                .all(|role| role.scope_kind == RoleScopeKind::Branch)
        );
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let store = InMemoryStore::new();

        let first = seed_default_roles(&store).await;
        let second = seed_default_roles(&store).await;

        assert!(matches!(first, Ok(count) if count > 0));
        assert!(matches!(second, Ok(0)));

        let listed = store.list_roles(&RoleFilter::default()).await;
        assert!(matches!(listed, Ok(roles) if roles.len() == first.unwrap_or_default()));
    }
}
