use crate::api_state::ApiContext;
use crate::routes::album::handlers::{
    add_collaborator_handler, create_album_handler, delete_album_handler,
    get_album_details_handler, get_album_qr_handler, get_album_stats_handler,
    get_owner_stats_handler, get_public_album_handler, list_albums_handler,
    list_collaborators_handler, list_event_types_handler, remove_collaborator_handler,
    update_album_handler, update_album_status_handler,
};
use axum::{
    Router,
    routing::{delete, get, put},
};

pub fn album_public_router() -> Router<ApiContext> {
    Router::new()
        .route("/albums/event-types", get(list_event_types_handler))
        .route(
            "/albums/public/{access_code}",
            get(get_public_album_handler),
        )
}

pub fn album_protected_router() -> Router<ApiContext> {
    Router::new()
        .route(
            "/albums",
            get(list_albums_handler).post(create_album_handler),
        )
        .route("/albums/stats", get(get_owner_stats_handler))
        .route(
            "/albums/{album_id}",
            get(get_album_details_handler)
                .put(update_album_handler)
                .delete(delete_album_handler),
        )
        .route("/albums/{album_id}/status", put(update_album_status_handler))
        .route("/albums/{album_id}/qr", get(get_album_qr_handler))
        .route("/albums/{album_id}/stats", get(get_album_stats_handler))
        .route(
            "/albums/{album_id}/collaborators",
            get(list_collaborators_handler).post(add_collaborator_handler),
        )
        .route(
            "/albums/{album_id}/collaborators/{user_id}",
            delete(remove_collaborator_handler),
        )
}
