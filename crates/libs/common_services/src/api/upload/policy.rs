use crate::api::upload::error::PolicyViolation;
use crate::database::album::album::{Album, AlbumStatus};
use chrono::{DateTime, Utc};

/// Checks an incoming file against the album's upload rules, in order:
/// album active, not expired, size limit, allowed extension.
///
/// # Errors
///
/// Returns the first rule that is violated.
pub fn check_submission(
    album: &Album,
    now: DateTime<Utc>,
    file_size: i64,
    extension: &str,
) -> Result<(), PolicyViolation> {
    if album.status != AlbumStatus::Active {
        return Err(PolicyViolation::AlbumNotActive(album.status));
    }
    if album.is_expired(now) {
        return Err(PolicyViolation::AlbumExpired);
    }
    let limit = album.max_file_size_bytes();
    if file_size > limit {
        return Err(PolicyViolation::FileTooLarge {
            size: file_size,
            limit,
        });
    }
    if extension.is_empty() || !album.allows_extension(extension) {
        return Err(PolicyViolation::FileTypeNotAllowed(extension.to_owned()));
    }
    Ok(())
}

/// Checks how many files an uploader already added to the album.
///
/// # Errors
///
/// `UploadLimitReached` once `existing` reaches `max_files_per_user`.
pub const fn check_uploader_quota(album: &Album, existing: i64) -> Result<(), PolicyViolation> {
    if existing >= album.max_files_per_user {
        return Err(PolicyViolation::UploadLimitReached(album.max_files_per_user));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::album::album::AlbumPrivacy;
    use chrono::Duration;
    use sqlx::types::Json;

    const MB: i64 = 1_048_576;

    fn album(status: AlbumStatus) -> Album {
        let now = Utc::now();
        Album {
            id: "album".to_owned(),
            title: "Wedding".to_owned(),
            description: String::new(),
            event_type_id: None,
            event_date: None,
            event_location: String::new(),
            owner_id: 1,
            status,
            privacy: AlbumPrivacy::Public,
            password_hash: None,
            access_code: "ABCD1234".to_owned(),
            qr_code_path: None,
            max_files_per_user: 3,
            allowed_file_types: Json(vec!["jpg".to_owned(), "png".to_owned()]),
            max_file_size_mb: 10,
            require_approval: false,
            enable_comments: true,
            view_count: 0,
            download_count: 0,
            created_at: now,
            updated_at: now,
            expires_at: None,
        }
    }

    #[test]
    fn accepts_allowed_photo_within_limit() {
        let album = album(AlbumStatus::Active);
        assert_eq!(check_submission(&album, Utc::now(), 5 * MB, "jpg"), Ok(()));
        assert_eq!(check_submission(&album, Utc::now(), 10 * MB, "png"), Ok(()));
    }

    #[test]
    fn rejects_type_outside_allow_list() {
        let album = album(AlbumStatus::Active);
        assert_eq!(
            check_submission(&album, Utc::now(), 5 * MB, "mp4"),
            Err(PolicyViolation::FileTypeNotAllowed("mp4".to_owned()))
        );
        assert_eq!(
            check_submission(&album, Utc::now(), 1, ""),
            Err(PolicyViolation::FileTypeNotAllowed(String::new()))
        );
    }

    #[test]
    fn rejects_oversized_file() {
        let album = album(AlbumStatus::Active);
        assert_eq!(
            check_submission(&album, Utc::now(), 10 * MB + 1, "jpg"),
            Err(PolicyViolation::FileTooLarge {
                size: 10 * MB + 1,
                limit: 10 * MB
            })
        );
    }

    #[test]
    fn inactive_or_expired_album_rejects_any_file() {
        for status in [AlbumStatus::Draft, AlbumStatus::Completed, AlbumStatus::Archived] {
            assert_eq!(
                check_submission(&album(status), Utc::now(), 1, "jpg"),
                Err(PolicyViolation::AlbumNotActive(status))
            );
        }

        let now = Utc::now();
        let mut expired = album(AlbumStatus::Active);
        expired.expires_at = Some(now - Duration::minutes(1));
        assert_eq!(
            check_submission(&expired, now, 1, "jpg"),
            Err(PolicyViolation::AlbumExpired)
        );

        expired.expires_at = Some(now + Duration::minutes(1));
        assert_eq!(check_submission(&expired, now, 1, "jpg"), Ok(()));
    }

    #[test]
    fn status_is_checked_before_size_and_type() {
        let album = album(AlbumStatus::Draft);
        assert_eq!(
            check_submission(&album, Utc::now(), 100 * MB, "exe"),
            Err(PolicyViolation::AlbumNotActive(AlbumStatus::Draft))
        );
    }

    #[test]
    fn quota_counts_existing_uploads() {
        let album = album(AlbumStatus::Active);
        assert_eq!(check_uploader_quota(&album, 2), Ok(()));
        assert_eq!(
            check_uploader_quota(&album, 3),
            Err(PolicyViolation::UploadLimitReached(3))
        );
    }
}
