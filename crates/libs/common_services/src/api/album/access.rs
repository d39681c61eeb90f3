use crate::database::DbError;
use crate::database::album::album::{Album, AlbumPrivacy, AlbumStatus};
use crate::database::album::album_collaborator::CollaboratorRole;
use crate::database::album_store::AlbumStore;
use crate::database::app_user::User;
use crate::database::upload::{Upload, UploadStatus};
use sqlx::{Executor, Sqlite};

/// How a signed-in user relates to an album.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlbumAccess {
    Owner,
    SiteAdmin,
    Collaborator(CollaboratorRole),
    /// Signed in, but neither owner nor collaborator.
    Visitor,
}

impl AlbumAccess {
    pub async fn resolve(
        executor: impl Executor<'_, Database = Sqlite>,
        album: &Album,
        user: &User,
    ) -> Result<Self, DbError> {
        if album.owner_id == user.id {
            return Ok(Self::Owner);
        }
        if user.is_admin() {
            return Ok(Self::SiteAdmin);
        }
        let role = AlbumStore::find_collaborator_role(executor, &album.id, user.id).await?;
        Ok(role.map_or(Self::Visitor, Self::Collaborator))
    }

    #[must_use]
    pub const fn is_member(self) -> bool {
        !matches!(self, Self::Visitor)
    }

    /// Can see the album at all. Visitors only see public, active albums.
    #[must_use]
    pub fn can_view(self, album: &Album) -> bool {
        self.is_member()
            || (album.privacy == AlbumPrivacy::Public && album.status == AlbumStatus::Active)
    }

    /// Owner, site admin, or a moderator/admin collaborator.
    #[must_use]
    pub const fn can_moderate(self) -> bool {
        match self {
            Self::Owner | Self::SiteAdmin => true,
            Self::Collaborator(role) => role.can_moderate(),
            Self::Visitor => false,
        }
    }

    /// May edit album settings and QR codes.
    #[must_use]
    pub const fn can_manage(self) -> bool {
        matches!(
            self,
            Self::Owner | Self::SiteAdmin | Self::Collaborator(CollaboratorRole::Admin)
        )
    }

    /// May delete the album or change its collaborators.
    #[must_use]
    pub const fn is_owner_or_admin(self) -> bool {
        matches!(self, Self::Owner | Self::SiteAdmin)
    }

    /// Moderators see everything, everyone else only approved uploads.
    #[must_use]
    pub fn can_view_upload(self, album: &Album, upload: &Upload) -> bool {
        if self.can_moderate() {
            return true;
        }
        self.can_view(album) && upload.status == UploadStatus::Approved
    }
}

/// Loads an album together with the caller's access, or `None` when the album
/// does not exist or the caller may not see it.
pub async fn find_visible_album(
    executor: impl Executor<'_, Database = Sqlite> + Copy,
    album_id: &str,
    user: &User,
) -> Result<Option<(Album, AlbumAccess)>, DbError> {
    let Some(album) = AlbumStore::find_by_id(executor, album_id).await? else {
        return Ok(None);
    };
    let access = AlbumAccess::resolve(executor, &album, user).await?;
    if !access.can_view(&album) {
        return Ok(None);
    }
    Ok(Some((album, access)))
}
