use super::*;

pub async fn list_branch_members_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(branch_id): Path<String>,
    Query(query): Query<MemberListQuery>,
) -> ApiResult<Json<MemberListResponse>> {
    let filter = MemberFilter::try_from(query)?;
    let request = filter.page;
    let page = state
        .branch_service
        .list_branch_members(&user, branch_id.parse::<BranchId>()?, filter)
        .await?;

    Ok(Json(MemberListResponse::new(page, request)))
}

pub async fn get_membership_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(membership_id): Path<String>,
) -> ApiResult<Json<MembershipResponse>> {
    let membership = state
        .branch_service
        .get_membership(&user, membership_id.parse::<MembershipId>()?)
        .await?;

    Ok(Json(MembershipResponse::from(membership)))
}

pub async fn update_membership_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(membership_id): Path<String>,
    Json(payload): Json<UpdateMembershipRequest>,
) -> ApiResult<Json<MembershipResponse>> {
    let membership = state
        .branch_service
        .update_membership(
            &user,
            membership_id.parse::<MembershipId>()?,
            MembershipPatch::try_from(payload)?,
        )
        .await?;

    Ok(Json(MembershipResponse::from(membership)))
}

pub async fn add_member_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(branch_id): Path<String>,
    Json(payload): Json<AddMemberRequest>,
) -> ApiResult<(StatusCode, Json<MembershipResponse>)> {
    let (branch_id, user_id) = parse_member_path(&branch_id, &payload.user_id)?;
    let membership = state
        .branch_service
        .add_member(&user, branch_id, user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(MembershipResponse::from(membership))))
}

pub async fn approve_member_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((branch_id, user_id)): Path<(String, String)>,
) -> ApiResult<Json<MembershipResponse>> {
    let (branch_id, user_id) = parse_member_path(&branch_id, &user_id)?;
    let membership = state
        .branch_service
        .approve_member(&user, branch_id, user_id)
        .await?;

    Ok(Json(MembershipResponse::from(membership)))
}

pub async fn issue_membership_card_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((branch_id, user_id)): Path<(String, String)>,
) -> ApiResult<Json<MembershipResponse>> {
    let (branch_id, user_id) = parse_member_path(&branch_id, &user_id)?;
    let membership = state
        .branch_service
        .issue_membership_card(&user, branch_id, user_id)
        .await?;

    Ok(Json(MembershipResponse::from(membership)))
}
