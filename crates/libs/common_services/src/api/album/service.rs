use crate::api::album::access::{AlbumAccess, find_visible_album};
use crate::api::album::error::AlbumError;
use crate::api::album::interfaces::{
    AddCollaboratorRequest, AlbumDetailsResponse, AlbumListItem, AlbumQrCodeResponse,
    AlbumResponse, AlbumStatsResponse, CreateAlbumRequest, ListAlbumsParams, OwnerAlbumStats,
    PublicAlbumResponse, UpdateAlbumRequest, bytes_to_mb,
};
use crate::api::auth::hashing::{hash_password, verify_password};
use crate::api::upload::interfaces::{UploadListFilter, UploadOrdering, UploadSummary};
use crate::blob_store::BlobStore;
use crate::database::album::album::{
    Album, AlbumChanges, AlbumPrivacy, AlbumStatus, NewAlbum,
};
use crate::database::album::album_collaborator::AlbumCollaborator;
use crate::database::album_store::AlbumStore;
use crate::database::app_user::User;
use crate::database::event_type::EventType;
use crate::database::event_type_store::EventTypeStore;
use crate::database::upload::UploadStatus;
use crate::database::upload_store::UploadStore;
use crate::database::user_store::UserStore;
use crate::utils::{generate_access_code, nice_id};
use app_state::{AppSettings, normalize_extension};
use chrono::Utc;
use media_processing::render_qr_png;
use sqlx::SqlitePool;
use tracing::{debug, info, instrument, warn};

const RECENT_UPLOADS: i64 = 5;
const ACCESS_CODE_COLUMN: &str = "album.access_code";

/// Public URL of a blob served under `/media`.
#[must_use]
pub fn media_url(settings: &AppSettings, key: &str) -> String {
    format!("{}/media/{key}", settings.api.public_url.trim_end_matches('/'))
}

pub fn album_response(settings: &AppSettings, album: Album) -> AlbumResponse {
    AlbumResponse {
        upload_url: settings.albums.upload_url(&album.access_code),
        qr_code_url: album.qr_code_path.as_deref().map(|p| media_url(settings, p)),
        is_password_protected: album.privacy == AlbumPrivacy::PasswordProtected,
        album,
    }
}

/// Normalizes a user-supplied extension list: lowercase, no dots, no duplicates.
fn normalize_file_types(types: &[String]) -> Result<Vec<String>, AlbumError> {
    let mut normalized: Vec<String> = Vec::with_capacity(types.len());
    for extension in types.iter().map(|t| normalize_extension(t)) {
        if !extension.is_empty() && !normalized.contains(&extension) {
            normalized.push(extension);
        }
    }
    if normalized.is_empty() {
        return Err(AlbumError::BadRequest(
            "allowed_file_types must contain at least one extension".into(),
        ));
    }
    Ok(normalized)
}

fn positive(value: u32, field: &str) -> Result<i64, AlbumError> {
    if value == 0 {
        return Err(AlbumError::BadRequest(format!("{field} must be positive")));
    }
    Ok(i64::from(value))
}

/// The per-file cap may not exceed the request body limit.
fn file_size_cap(value: u32, settings: &AppSettings) -> Result<i64, AlbumError> {
    let cap = positive(value, "max_file_size_mb")?;
    let body_limit = settings.api.max_upload_body_mb;
    if !usize::try_from(value).is_ok_and(|mb| mb <= body_limit) {
        return Err(AlbumError::BadRequest(format!(
            "max_file_size_mb cannot exceed the upload limit of {body_limit} MB"
        )));
    }
    Ok(cap)
}

async fn ensure_event_type(pool: &SqlitePool, event_type_id: Option<i64>) -> Result<(), AlbumError> {
    if let Some(id) = event_type_id
        && !EventTypeStore::exists(pool, id).await?
    {
        return Err(AlbumError::BadRequest(format!("Unknown event type {id}")));
    }
    Ok(())
}

/// Lists the selectable event types.
#[instrument(skip(pool))]
pub async fn list_event_types(pool: &SqlitePool) -> Result<Vec<EventType>, AlbumError> {
    Ok(EventTypeStore::list_active(pool).await?)
}

/// Inserts the album, sampling a fresh access code for every attempt until one
/// is not taken. Gives up after `max_attempts` conflicts.
pub async fn insert_with_fresh_code<F>(
    pool: &SqlitePool,
    album: &NewAlbum,
    max_attempts: u32,
    mut next_code: F,
) -> Result<Album, AlbumError>
where
    F: FnMut() -> String,
{
    for attempt in 1..=max_attempts {
        let code = next_code();
        match AlbumStore::create(pool, album, &code, Utc::now()).await {
            Ok(created) => return Ok(created),
            Err(err) if err.violates_unique(ACCESS_CODE_COLUMN) => {
                debug!("Access code {code} already taken (attempt {attempt})");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Err(AlbumError::AccessCodeExhausted(max_attempts))
}

/// Creates an album owned by `owner`, with a unique access code and, best
/// effort, its QR code.
#[instrument(skip(pool, settings, blobs, request), fields(owner_id = owner.id))]
pub async fn create_album(
    pool: &SqlitePool,
    settings: &AppSettings,
    blobs: &dyn BlobStore,
    owner: &User,
    request: CreateAlbumRequest,
) -> Result<Album, AlbumError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(AlbumError::BadRequest("title is required".into()));
    }
    ensure_event_type(pool, request.event_type_id).await?;

    let policy = &settings.albums;
    let allowed_file_types = match &request.allowed_file_types {
        Some(types) => normalize_file_types(types)?,
        None => policy.default_allowed_file_types(),
    };
    let privacy = request.privacy.unwrap_or_default();
    let password_hash = match (privacy, request.password.as_deref()) {
        (AlbumPrivacy::PasswordProtected, Some(password)) if !password.is_empty() => {
            Some(hash_password(password.as_bytes())?)
        }
        (AlbumPrivacy::PasswordProtected, _) => {
            return Err(AlbumError::BadRequest(
                "a password is required for password protected albums".into(),
            ));
        }
        _ => None,
    };

    let new_album = NewAlbum {
        id: nice_id(settings.database.album_id_length),
        owner_id: owner.id,
        title: title.to_owned(),
        description: request.description.unwrap_or_default(),
        event_type_id: request.event_type_id,
        event_date: request.event_date,
        event_location: request.event_location.unwrap_or_default(),
        status: request.status.unwrap_or_default(),
        privacy,
        password_hash,
        max_files_per_user: positive(
            request
                .max_files_per_user
                .unwrap_or(policy.default_max_files_per_user),
            "max_files_per_user",
        )?,
        allowed_file_types,
        max_file_size_mb: file_size_cap(
            request
                .max_file_size_mb
                .unwrap_or(policy.default_max_file_size_mb),
            settings,
        )?,
        require_approval: request.require_approval.unwrap_or(false),
        enable_comments: request.enable_comments.unwrap_or(true),
        expires_at: request.expires_at,
    };

    let mut album = insert_with_fresh_code(
        pool,
        &new_album,
        policy.access_code_max_attempts,
        generate_access_code,
    )
    .await?;
    info!("Created album {} with access code {}", album.id, album.access_code);

    match ensure_qr_code(pool, settings, blobs, &album).await {
        Ok(path) => album.qr_code_path = Some(path),
        Err(e) => warn!("QR code for album {} not generated yet: {e}", album.id),
    }

    Ok(album)
}

/// Returns the stored QR code path of an album, rendering and storing the QR
/// code first when there is none. An existing path is never overwritten.
pub async fn ensure_qr_code(
    pool: &SqlitePool,
    settings: &AppSettings,
    blobs: &dyn BlobStore,
    album: &Album,
) -> Result<String, AlbumError> {
    if let Some(path) = &album.qr_code_path {
        return Ok(path.clone());
    }

    let upload_url = settings.albums.upload_url(&album.access_code);
    let png = tokio::task::spawn_blocking(move || render_qr_png(&upload_url)).await??;
    let key = format!("qr_codes/qr_code_{}.png", album.access_code);
    blobs.put(&key, &png).await?;

    if AlbumStore::set_qr_code_path_if_missing(pool, &album.id, &key).await? {
        return Ok(key);
    }
    // Another request stored a path first, keep that one.
    AlbumStore::find_by_id(pool, &album.id)
        .await?
        .and_then(|a| a.qr_code_path)
        .ok_or_else(|| AlbumError::NotFound(album.id.clone()))
}

/// Lists the albums a user owns or collaborates on.
#[instrument(skip(pool, settings))]
pub async fn list_albums(
    pool: &SqlitePool,
    settings: &AppSettings,
    user_id: i64,
    params: &ListAlbumsParams,
) -> Result<Vec<AlbumListItem>, AlbumError> {
    let albums =
        AlbumStore::list_for_user(pool, user_id, params.search.as_deref(), params.ordering).await?;
    Ok(albums
        .into_iter()
        .map(|item| AlbumListItem {
            upload_url: settings.albums.upload_url(&item.album.access_code),
            total_uploads: item.total_uploads,
            total_size_mb: bytes_to_mb(item.total_size_bytes),
            album: item.album,
        })
        .collect())
}

/// Fetches an album with its collaborators and upload totals.
#[instrument(skip(pool, settings, user), fields(user_id = user.id))]
pub async fn get_album_details(
    pool: &SqlitePool,
    settings: &AppSettings,
    album_id: &str,
    user: &User,
) -> Result<AlbumDetailsResponse, AlbumError> {
    let (album, _) = find_visible_album(pool, album_id, user)
        .await?
        .ok_or_else(|| AlbumError::NotFound(album_id.to_owned()))?;

    let (totals, collaborators) = tokio::join!(
        UploadStore::totals(pool, album_id),
        AlbumStore::list_collaborators(pool, album_id),
    );
    let totals = totals?;

    Ok(AlbumDetailsResponse {
        album: album_response(settings, album),
        total_uploads: totals.total_uploads,
        total_size_mb: bytes_to_mb(totals.total_size_bytes),
        collaborators: collaborators?,
    })
}

/// Loads an album the user can see and checks a management permission.
async fn managed_album(
    pool: &SqlitePool,
    album_id: &str,
    user: &User,
    allowed: fn(AlbumAccess) -> bool,
) -> Result<(Album, AlbumAccess), AlbumError> {
    let (album, access) = find_visible_album(pool, album_id, user)
        .await?
        .ok_or_else(|| AlbumError::NotFound(album_id.to_owned()))?;
    if !allowed(access) {
        return Err(AlbumError::Forbidden(format!(
            "user {} may not manage album {album_id}",
            user.id
        )));
    }
    Ok((album, access))
}

/// Updates album settings. Owner, site admin or admin collaborator only.
#[instrument(skip(pool, settings, user, request), fields(user_id = user.id))]
pub async fn update_album(
    pool: &SqlitePool,
    settings: &AppSettings,
    album_id: &str,
    user: &User,
    request: UpdateAlbumRequest,
) -> Result<AlbumResponse, AlbumError> {
    let (album, _) = managed_album(pool, album_id, user, AlbumAccess::can_manage).await?;
    ensure_event_type(pool, request.event_type_id).await?;

    let title = match request.title.as_deref().map(str::trim) {
        Some("") => return Err(AlbumError::BadRequest("title cannot be empty".into())),
        other => other.map(ToOwned::to_owned),
    };
    let password_hash = match request.password.as_deref() {
        Some("") => return Err(AlbumError::BadRequest("password cannot be empty".into())),
        Some(password) => Some(hash_password(password.as_bytes())?),
        None => None,
    };
    let privacy = request.privacy.unwrap_or(album.privacy);
    if privacy == AlbumPrivacy::PasswordProtected
        && password_hash.is_none()
        && album.password_hash.is_none()
    {
        return Err(AlbumError::BadRequest(
            "a password is required for password protected albums".into(),
        ));
    }

    let changes = AlbumChanges {
        title,
        description: request.description,
        event_type_id: request.event_type_id,
        event_date: request.event_date,
        event_location: request.event_location,
        privacy: request.privacy,
        password_hash,
        max_files_per_user: request
            .max_files_per_user
            .map(|v| positive(v, "max_files_per_user"))
            .transpose()?,
        allowed_file_types: request
            .allowed_file_types
            .as_deref()
            .map(normalize_file_types)
            .transpose()?,
        max_file_size_mb: request
            .max_file_size_mb
            .map(|v| file_size_cap(v, settings))
            .transpose()?,
        require_approval: request.require_approval,
        enable_comments: request.enable_comments,
        expires_at: request.expires_at,
    };

    let album = AlbumStore::update(pool, album_id, &changes, Utc::now()).await?;
    Ok(album_response(settings, album))
}

#[instrument(skip(pool, settings, user), fields(user_id = user.id))]
pub async fn update_album_status(
    pool: &SqlitePool,
    settings: &AppSettings,
    album_id: &str,
    user: &User,
    status: AlbumStatus,
) -> Result<AlbumResponse, AlbumError> {
    managed_album(pool, album_id, user, AlbumAccess::can_manage).await?;
    let album = AlbumStore::set_status(pool, album_id, status, Utc::now()).await?;
    info!("Album {album_id} is now {status}");
    Ok(album_response(settings, album))
}

/// Deletes an album with all its uploads, then removes their blobs best effort.
#[instrument(skip(pool, blobs, user), fields(user_id = user.id))]
pub async fn delete_album(
    pool: &SqlitePool,
    blobs: &dyn BlobStore,
    album_id: &str,
    user: &User,
) -> Result<(), AlbumError> {
    let (album, _) = managed_album(pool, album_id, user, AlbumAccess::is_owner_or_admin).await?;
    let uploads = UploadStore::list_for_album(pool, album_id, &UploadListFilter::default()).await?;

    AlbumStore::delete(pool, album_id).await?;

    let keys = uploads
        .into_iter()
        .flat_map(|u| std::iter::once(u.file_path).chain(u.thumbnail_path))
        .chain(album.qr_code_path);
    for key in keys {
        if let Err(e) = blobs.delete(&key).await {
            warn!("Could not remove blob {key} of deleted album {album_id}: {e}");
        }
    }
    info!("Deleted album {album_id}");
    Ok(())
}

/// Returns the album's QR code, generating it on first request.
#[instrument(skip(pool, settings, blobs, user), fields(user_id = user.id))]
pub async fn get_album_qr(
    pool: &SqlitePool,
    settings: &AppSettings,
    blobs: &dyn BlobStore,
    album_id: &str,
    user: &User,
) -> Result<AlbumQrCodeResponse, AlbumError> {
    let (album, _) = managed_album(pool, album_id, user, AlbumAccess::can_manage).await?;
    let qr_code_path = ensure_qr_code(pool, settings, blobs, &album).await?;

    Ok(AlbumQrCodeResponse {
        upload_url: settings.albums.upload_url(&album.access_code),
        qr_code_url: media_url(settings, &qr_code_path),
        qr_code_path,
        id: album.id,
        title: album.title,
        access_code: album.access_code,
    })
}

#[instrument(skip(pool, settings, user), fields(user_id = user.id))]
pub async fn get_album_stats(
    pool: &SqlitePool,
    settings: &AppSettings,
    album_id: &str,
    user: &User,
) -> Result<AlbumStatsResponse, AlbumError> {
    let (album, _) = managed_album(pool, album_id, user, AlbumAccess::can_moderate).await?;
    let totals = UploadStore::totals(pool, album_id).await?;
    let recent = UploadStore::list_for_album(
        pool,
        album_id,
        &UploadListFilter {
            ordering: UploadOrdering::CreatedAtDesc,
            limit: Some(RECENT_UPLOADS),
            ..UploadListFilter::default()
        },
    )
    .await?;

    Ok(AlbumStatsResponse {
        id: album.id,
        title: album.title,
        total_uploads: totals.total_uploads,
        pending_uploads: totals.pending_uploads,
        total_size_mb: bytes_to_mb(totals.total_size_bytes),
        view_count: album.view_count,
        download_count: album.download_count,
        recent_uploads: recent
            .iter()
            .map(|u| UploadSummary::new(settings, u))
            .collect(),
        created_at: album.created_at,
    })
}

/// Totals across every album the user owns.
#[instrument(skip(pool))]
pub async fn get_owner_stats(pool: &SqlitePool, user_id: i64) -> Result<OwnerAlbumStats, AlbumError> {
    Ok(AlbumStore::owner_stats(pool, user_id).await?)
}

/// The anonymous view of an album opened by access code. Private and draft
/// albums are hidden. Password protected albums need the right password.
#[instrument(skip(pool, settings, password))]
pub async fn get_public_album(
    pool: &SqlitePool,
    settings: &AppSettings,
    access_code: &str,
    password: Option<&str>,
) -> Result<PublicAlbumResponse, AlbumError> {
    let album = AlbumStore::find_by_access_code(pool, access_code)
        .await?
        .filter(|a| a.privacy != AlbumPrivacy::Private && a.status != AlbumStatus::Draft)
        .ok_or_else(|| AlbumError::NotFound(access_code.to_owned()))?;

    if album.privacy == AlbumPrivacy::PasswordProtected {
        let Some(password) = password else {
            return Err(AlbumError::Forbidden("this album requires a password".into()));
        };
        let valid = match &album.password_hash {
            Some(hash) => verify_password(password.as_bytes(), hash)?,
            None => false,
        };
        if !valid {
            return Err(AlbumError::Forbidden("invalid album password".into()));
        }
    }

    let uploads = UploadStore::list_for_album(
        pool,
        &album.id,
        &UploadListFilter {
            status: Some(UploadStatus::Approved),
            ..UploadListFilter::default()
        },
    )
    .await?;

    let now = Utc::now();
    Ok(PublicAlbumResponse {
        upload_url: settings.albums.upload_url(&album.access_code),
        accepting_uploads: album.status == AlbumStatus::Active && !album.is_expired(now),
        uploads: uploads
            .iter()
            .map(|u| UploadSummary::new(settings, u))
            .collect(),
        allowed_file_types: album.allowed_file_types.0,
        id: album.id,
        title: album.title,
        description: album.description,
        event_type_id: album.event_type_id,
        event_date: album.event_date,
        event_location: album.event_location,
        status: album.status,
        access_code: album.access_code,
        max_file_size_mb: album.max_file_size_mb,
        max_files_per_user: album.max_files_per_user,
        enable_comments: album.enable_comments,
    })
}

//================================================================================
// Collaborators
//================================================================================

#[instrument(skip(pool, user), fields(user_id = user.id))]
pub async fn list_collaborators(
    pool: &SqlitePool,
    album_id: &str,
    user: &User,
) -> Result<Vec<AlbumCollaborator>, AlbumError> {
    managed_album(pool, album_id, user, AlbumAccess::is_member).await?;
    Ok(AlbumStore::list_collaborators(pool, album_id).await?)
}

/// Adds a registered user as collaborator, or changes their role.
#[instrument(skip(pool, user, request), fields(user_id = user.id))]
pub async fn add_collaborator(
    pool: &SqlitePool,
    album_id: &str,
    user: &User,
    request: &AddCollaboratorRequest,
) -> Result<Vec<AlbumCollaborator>, AlbumError> {
    let (album, _) = managed_album(pool, album_id, user, AlbumAccess::is_owner_or_admin).await?;

    let invitee = UserStore::find_by_email(pool, request.user_email.trim())
        .await?
        .ok_or_else(|| AlbumError::NotFound(format!("user {}", request.user_email)))?;
    if invitee.id == album.owner_id {
        return Err(AlbumError::BadRequest(
            "the album owner cannot be a collaborator".into(),
        ));
    }

    AlbumStore::upsert_collaborator(pool, album_id, invitee.id, request.role, user.id, Utc::now())
        .await?;
    info!(
        "User {} is now {} of album {album_id}",
        invitee.id, request.role
    );
    Ok(AlbumStore::list_collaborators(pool, album_id).await?)
}

#[instrument(skip(pool, user), fields(user_id = user.id))]
pub async fn remove_collaborator(
    pool: &SqlitePool,
    album_id: &str,
    collaborator_user_id: i64,
    user: &User,
) -> Result<(), AlbumError> {
    managed_album(pool, album_id, user, AlbumAccess::is_owner_or_admin).await?;
    let result = AlbumStore::remove_collaborator(pool, album_id, collaborator_user_id).await?;
    if result.rows_affected() == 0 {
        return Err(AlbumError::NotFound(format!(
            "collaborator {collaborator_user_id} in album {album_id}"
        )));
    }
    Ok(())
}
