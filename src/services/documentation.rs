use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

#[derive(OpenApi)]
/// Aggregated OpenAPI document for Live Room Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::room_stream,
        crate::routes::user::create,
        crate::routes::user::me,
        crate::routes::user::update,
        crate::routes::room::create_room,
        crate::routes::room::list_rooms,
        crate::routes::room::join_room,
        crate::routes::room::wait_room,
        crate::routes::room::start_room,
        crate::routes::room::end_room,
        crate::routes::room::room_result,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::user::UserCreateRequest,
            crate::dto::user::UserCreateResponse,
            crate::dto::user::SafeUser,
            crate::dto::user::Empty,
            crate::dto::room::RoomCreateRequest,
            crate::dto::room::RoomCreateResponse,
            crate::dto::room::RoomListRequest,
            crate::dto::room::RoomListResponse,
            crate::dto::room::RoomInfo,
            crate::dto::room::RoomJoinRequest,
            crate::dto::room::RoomJoinResponse,
            crate::dto::room::JoinRoomResult,
            crate::dto::room::RoomIdRequest,
            crate::dto::room::RoomWaitResponse,
            crate::dto::room::WaitRoomStatus,
            crate::dto::room::RoomUser,
            crate::dto::room::RoomEndRequest,
            crate::dto::room::RoomResultResponse,
            crate::dto::room::ResultUser,
            crate::dto::sse::RoomCreatedEvent,
            crate::dto::sse::MemberJoinedEvent,
            crate::dto::sse::RoomClosedEvent,
            crate::dto::sse::ResultSubmittedEvent,
            crate::dao::models::LiveDifficulty,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "user", description = "User registration and profile"),
        (name = "room", description = "Room lifecycle: create, join, wait, start, end, result"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` scheme referenced by authenticated routes.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_room_routes_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/room/join"));
        assert!(doc.paths.paths.contains_key("/user/create"));

        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
