use std::collections::BTreeSet;

use chapterdesk_domain::{BranchId, BranchStatus, ChapterId, Membership, MembershipStatus};

use crate::PageRequest;

/// Filter for branch listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchFilter {
    /// Restrict to one chapter.
    pub chapter_id: Option<ChapterId>,
    /// Restrict to one status.
    pub status: Option<BranchStatus>,
    /// Restrict to an explicit branch set. `None` applies no restriction.
    pub branch_ids: Option<BTreeSet<BranchId>>,
}

/// Input payload for creating a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBranchInput {
    /// Owning chapter.
    pub chapter_id: ChapterId,
    /// Name, unique within the chapter.
    pub name: String,
    /// Location label.
    pub location: String,
    /// Optional description.
    pub description: Option<String>,
    /// Minimum member count. Defaults when absent.
    pub min_members: Option<u32>,
}

/// Membership joined with the member's profile fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchMember {
    /// Stored membership.
    pub membership: Membership,
    /// Member display name.
    pub full_name: String,
    /// Member email.
    pub email: String,
    /// Member membership number.
    pub membership_number: String,
}

/// Filter for branch member listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberFilter {
    /// Restrict to one membership status.
    pub status: Option<MembershipStatus>,
    /// Requested page.
    pub page: PageRequest,
}

/// Partial update of a membership. Absent fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MembershipPatch {
    /// New lifecycle state.
    pub status: Option<MembershipStatus>,
    /// New card flag.
    pub card_issued: Option<bool>,
}
