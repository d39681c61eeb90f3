use crate::api_state::ApiContext;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use common_services::api::album::error::AlbumError;
use common_services::api::album::interfaces::{
    AccessCodeParams, AddCollaboratorRequest, AlbumDetailsResponse, AlbumIdParams, AlbumListItem,
    AlbumQrCodeResponse, AlbumResponse, AlbumStatsResponse, CreateAlbumRequest, ListAlbumsParams,
    OwnerAlbumStats, PublicAlbumParams, PublicAlbumResponse, RemoveCollaboratorParams,
    UpdateAlbumRequest, UpdateAlbumStatusRequest,
};
use common_services::api::album::service::{
    add_collaborator, album_response, create_album, delete_album, get_album_details,
    get_album_qr, get_album_stats, get_owner_stats, get_public_album, list_albums,
    list_collaborators, list_event_types, remove_collaborator, update_album, update_album_status,
};
use common_services::database::album::album_collaborator::AlbumCollaborator;
use common_services::database::app_user::User;
use common_services::database::event_type::EventType;
use tracing::instrument;

/// List the event types an album can be created for.
#[utoipa::path(
    get,
    path = "/albums/event-types",
    tag = "Album",
    responses(
        (status = 200, description = "Active event types in display order.", body = Vec<EventType>),
    )
)]
pub async fn list_event_types_handler(
    State(context): State<ApiContext>,
) -> Result<Json<Vec<EventType>>, AlbumError> {
    Ok(Json(list_event_types(&context.pool).await?))
}

/// Open an album by its access code, as a guest would after scanning the QR code.
#[utoipa::path(
    get,
    path = "/albums/public/{access_code}",
    tag = "Album",
    params(AccessCodeParams, PublicAlbumParams),
    responses(
        (status = 200, description = "The album and its approved uploads.", body = PublicAlbumResponse),
        (status = 403, description = "The album needs a password and none or a wrong one was given."),
        (status = 404, description = "No public album with this access code."),
    )
)]
#[instrument(skip(context, query))]
pub async fn get_public_album_handler(
    State(context): State<ApiContext>,
    Path(params): Path<AccessCodeParams>,
    Query(query): Query<PublicAlbumParams>,
) -> Result<Json<PublicAlbumResponse>, AlbumError> {
    let album = get_public_album(
        &context.pool,
        &context.settings,
        &params.access_code,
        query.password.as_deref(),
    )
    .await?;
    Ok(Json(album))
}

/// Create a new album.
///
/// The user creating the album becomes its owner. A fresh access code and QR
/// code are generated.
#[utoipa::path(
    post,
    path = "/albums",
    tag = "Album",
    request_body = CreateAlbumRequest,
    responses(
        (status = 201, description = "Album created successfully.", body = AlbumResponse),
        (status = 400, description = "Invalid album settings."),
        (status = 503, description = "No free access code could be found."),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, user, payload), fields(user_id = user.id))]
pub async fn create_album_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateAlbumRequest>,
) -> Result<(StatusCode, Json<AlbumResponse>), AlbumError> {
    let album = create_album(
        &context.pool,
        &context.settings,
        context.blobs.as_ref(),
        &user,
        payload,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(album_response(&context.settings, album)),
    ))
}

/// List the albums the current user owns or collaborates on.
#[utoipa::path(
    get,
    path = "/albums",
    tag = "Album",
    params(ListAlbumsParams),
    responses(
        (status = 200, description = "The user's albums.", body = Vec<AlbumListItem>),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_albums_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Query(query): Query<ListAlbumsParams>,
) -> Result<Json<Vec<AlbumListItem>>, AlbumError> {
    let albums = list_albums(&context.pool, &context.settings, user.id, &query).await?;
    Ok(Json(albums))
}

/// Totals across the albums the current user owns.
#[utoipa::path(
    get,
    path = "/albums/stats",
    tag = "Album",
    responses(
        (status = 200, description = "Album and upload counts.", body = OwnerAlbumStats),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_owner_stats_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
) -> Result<Json<OwnerAlbumStats>, AlbumError> {
    Ok(Json(get_owner_stats(&context.pool, user.id).await?))
}

/// Get details for a specific album.
#[utoipa::path(
    get,
    path = "/albums/{album_id}",
    tag = "Album",
    params(AlbumIdParams),
    responses(
        (status = 200, description = "Detailed information about the album.", body = AlbumDetailsResponse),
        (status = 404, description = "Album not found or not visible to the user."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_album_details_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(params): Path<AlbumIdParams>,
) -> Result<Json<AlbumDetailsResponse>, AlbumError> {
    let details =
        get_album_details(&context.pool, &context.settings, &params.album_id, &user).await?;
    Ok(Json(details))
}

/// Update an album's settings. The access code never changes.
#[utoipa::path(
    put,
    path = "/albums/{album_id}",
    tag = "Album",
    params(AlbumIdParams),
    request_body = UpdateAlbumRequest,
    responses(
        (status = 200, description = "Album updated successfully.", body = AlbumResponse),
        (status = 403, description = "The user may not manage this album."),
        (status = 404, description = "Album not found or not visible to the user."),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, user, payload), fields(user_id = user.id))]
pub async fn update_album_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(params): Path<AlbumIdParams>,
    Json(payload): Json<UpdateAlbumRequest>,
) -> Result<Json<AlbumResponse>, AlbumError> {
    let album = update_album(
        &context.pool,
        &context.settings,
        &params.album_id,
        &user,
        payload,
    )
    .await?;
    Ok(Json(album))
}

/// Delete an album with all its uploads. Owner or site admin only.
#[utoipa::path(
    delete,
    path = "/albums/{album_id}",
    tag = "Album",
    params(AlbumIdParams),
    responses(
        (status = 204, description = "Album deleted."),
        (status = 403, description = "The user may not delete this album."),
        (status = 404, description = "Album not found or not visible to the user."),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, user), fields(user_id = user.id))]
pub async fn delete_album_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(params): Path<AlbumIdParams>,
) -> Result<StatusCode, AlbumError> {
    delete_album(&context.pool, context.blobs.as_ref(), &params.album_id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Change an album's lifecycle status.
#[utoipa::path(
    put,
    path = "/albums/{album_id}/status",
    tag = "Album",
    params(AlbumIdParams),
    request_body = UpdateAlbumStatusRequest,
    responses(
        (status = 200, description = "Status changed.", body = AlbumResponse),
        (status = 403, description = "The user may not manage this album."),
        (status = 404, description = "Album not found or not visible to the user."),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, user), fields(user_id = user.id))]
pub async fn update_album_status_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(params): Path<AlbumIdParams>,
    Json(payload): Json<UpdateAlbumStatusRequest>,
) -> Result<Json<AlbumResponse>, AlbumError> {
    let album = update_album_status(
        &context.pool,
        &context.settings,
        &params.album_id,
        &user,
        payload.status,
    )
    .await?;
    Ok(Json(album))
}

/// The album's QR code and the upload URL it encodes.
#[utoipa::path(
    get,
    path = "/albums/{album_id}/qr",
    tag = "Album",
    params(AlbumIdParams),
    responses(
        (status = 200, description = "QR code location and upload URL.", body = AlbumQrCodeResponse),
        (status = 403, description = "The user may not manage this album."),
        (status = 404, description = "Album not found or not visible to the user."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_album_qr_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(params): Path<AlbumIdParams>,
) -> Result<Json<AlbumQrCodeResponse>, AlbumError> {
    let qr = get_album_qr(
        &context.pool,
        &context.settings,
        context.blobs.as_ref(),
        &params.album_id,
        &user,
    )
    .await?;
    Ok(Json(qr))
}

/// Counters and the most recent uploads of one album.
#[utoipa::path(
    get,
    path = "/albums/{album_id}/stats",
    tag = "Album",
    params(AlbumIdParams),
    responses(
        (status = 200, description = "Album statistics.", body = AlbumStatsResponse),
        (status = 403, description = "The user does not moderate this album."),
        (status = 404, description = "Album not found or not visible to the user."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_album_stats_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(params): Path<AlbumIdParams>,
) -> Result<Json<AlbumStatsResponse>, AlbumError> {
    let stats =
        get_album_stats(&context.pool, &context.settings, &params.album_id, &user).await?;
    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/albums/{album_id}/collaborators",
    tag = "Album",
    params(AlbumIdParams),
    responses(
        (status = 200, description = "Collaborators of the album.", body = Vec<AlbumCollaborator>),
        (status = 404, description = "Album not found or the user is not a member."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_collaborators_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(params): Path<AlbumIdParams>,
) -> Result<Json<Vec<AlbumCollaborator>>, AlbumError> {
    Ok(Json(
        list_collaborators(&context.pool, &params.album_id, &user).await?,
    ))
}

/// Add a registered user as collaborator, or change their role.
#[utoipa::path(
    post,
    path = "/albums/{album_id}/collaborators",
    tag = "Album",
    params(AlbumIdParams),
    request_body = AddCollaboratorRequest,
    responses(
        (status = 200, description = "The updated collaborator list.", body = Vec<AlbumCollaborator>),
        (status = 400, description = "The owner cannot be added as collaborator."),
        (status = 403, description = "Only the owner or a site admin can add collaborators."),
        (status = 404, description = "Album or user not found."),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, user), fields(user_id = user.id))]
pub async fn add_collaborator_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(params): Path<AlbumIdParams>,
    Json(payload): Json<AddCollaboratorRequest>,
) -> Result<Json<Vec<AlbumCollaborator>>, AlbumError> {
    let collaborators =
        add_collaborator(&context.pool, &params.album_id, &user, &payload).await?;
    Ok(Json(collaborators))
}

#[utoipa::path(
    delete,
    path = "/albums/{album_id}/collaborators/{user_id}",
    tag = "Album",
    params(RemoveCollaboratorParams),
    responses(
        (status = 204, description = "Collaborator removed."),
        (status = 403, description = "Only the owner or a site admin can remove collaborators."),
        (status = 404, description = "Album or collaborator not found."),
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(context, user), fields(user_id = user.id))]
pub async fn remove_collaborator_handler(
    State(context): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(params): Path<RemoveCollaboratorParams>,
) -> Result<StatusCode, AlbumError> {
    remove_collaborator(&context.pool, &params.album_id, params.user_id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}
