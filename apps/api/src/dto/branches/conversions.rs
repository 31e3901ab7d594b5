use chapterdesk_application::{
    BranchFilter, BranchMember, CreateBranchInput, MemberFilter, MembershipPatch, Page,
    PageRequest,
};
use chapterdesk_core::{AppError, NonEmptyString};
use chapterdesk_domain::{
    BranchDefinition, BranchPatch, BranchStatus, ChapterId, Membership, MembershipStatus,
};

use super::super::common::format_timestamp;
use super::{
    BranchListQuery, BranchMemberResponse, BranchResponse, CreateBranchRequest, MemberListQuery,
    MemberListResponse, MembershipResponse, PublicBranchResponse, UpdateBranchRequest,
    UpdateMembershipRequest,
};

impl From<BranchDefinition> for BranchResponse {
    fn from(value: BranchDefinition) -> Self {
        Self {
            branch_id: value.branch_id.to_string(),
            chapter_id: value.chapter_id.to_string(),
            name: value.name.as_str().to_owned(),
            location: value.location.as_str().to_owned(),
            description: value.description,
            min_members: value.min_members,
            status: value.status.as_str().to_owned(),
            created_by: value.created_by.map(|id| id.to_string()),
            created_at: format_timestamp(value.created_at),
            updated_at: format_timestamp(value.updated_at),
        }
    }
}

impl From<BranchDefinition> for PublicBranchResponse {
    fn from(value: BranchDefinition) -> Self {
        Self {
            branch_id: value.branch_id.to_string(),
            name: value.name.as_str().to_owned(),
            location: value.location.as_str().to_owned(),
        }
    }
}

impl TryFrom<BranchListQuery> for BranchFilter {
    type Error = AppError;

    fn try_from(value: BranchListQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            chapter_id: value
                .chapter_id
                .as_deref()
                .map(str::parse::<ChapterId>)
                .transpose()?,
            status: value
                .status
                .as_deref()
                .map(str::parse::<BranchStatus>)
                .transpose()?,
            branch_ids: None,
        })
    }
}

impl TryFrom<CreateBranchRequest> for CreateBranchInput {
    type Error = AppError;

    fn try_from(value: CreateBranchRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            chapter_id: value.chapter_id.parse::<ChapterId>()?,
            name: value.name,
            location: value.location,
            description: value.description,
            min_members: value.min_members,
        })
    }
}

impl TryFrom<UpdateBranchRequest> for BranchPatch {
    type Error = AppError;

    fn try_from(value: UpdateBranchRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: value.name.map(NonEmptyString::new).transpose()?,
            location: value.location.map(NonEmptyString::new).transpose()?,
            description: value.description,
            min_members: value.min_members,
            status: value
                .status
                .as_deref()
                .map(str::parse::<BranchStatus>)
                .transpose()?,
        })
    }
}

impl From<Membership> for MembershipResponse {
    fn from(value: Membership) -> Self {
        Self {
            membership_id: value.membership_id.to_string(),
            user_id: value.user_id.to_string(),
            branch_id: value.branch_id.to_string(),
            status: value.status.as_str().to_owned(),
            approved_by: value.approved_by.map(|id| id.to_string()),
            approved_at: value.approved_at.map(format_timestamp),
            card_issued: value.card_issued,
            card_issued_at: value.card_issued_at.map(format_timestamp),
            created_at: format_timestamp(value.created_at),
        }
    }
}

impl From<BranchMember> for BranchMemberResponse {
    fn from(value: BranchMember) -> Self {
        Self {
            membership: value.membership.into(),
            full_name: value.full_name,
            email: value.email,
            membership_number: value.membership_number,
        }
    }
}

impl TryFrom<MemberListQuery> for MemberFilter {
    type Error = AppError;

    fn try_from(value: MemberListQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            status: value
                .status
                .as_deref()
                .map(str::parse::<MembershipStatus>)
                .transpose()?,
            page: PageRequest::new(value.page, value.size)?,
        })
    }
}

impl MemberListResponse {
    pub fn new(page: Page<BranchMember>, request: PageRequest) -> Self {
        Self {
            members: page
                .items
                .into_iter()
                .map(BranchMemberResponse::from)
                .collect(),
            total: page.total,
            page: request.page(),
            size: request.size(),
        }
    }
}

impl TryFrom<UpdateMembershipRequest> for MembershipPatch {
    type Error = AppError;

    fn try_from(value: UpdateMembershipRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            status: value
                .status
                .as_deref()
                .map(str::parse::<MembershipStatus>)
                .transpose()?,
            card_issued: value.card_issued,
        })
    }
}
