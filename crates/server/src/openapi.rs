use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct StatusDoc { pub message: String, pub status: u16, pub timestamp: String }

#[derive(ToSchema)]
pub struct ErrorDoc { pub error: String }

#[derive(ToSchema)]
pub struct CountDoc { pub count: u64 }

/// Any extra fields are stored alongside these.
#[derive(ToSchema)]
pub struct NewUserDoc { pub id: String, pub name: String, pub email: String }

/// Every supplied field replaces the stored one.
#[derive(ToSchema)]
pub struct UserPatchDoc { pub name: Option<String>, pub email: Option<String> }

#[derive(ToSchema)]
pub struct NewCommentDoc { pub author: String, pub message: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::status,
        crate::routes::users::list_users,
        crate::routes::users::create_user,
        crate::routes::users::get_user,
        crate::routes::users::update_user,
        crate::routes::users::delete_user,
        crate::routes::comments::list_comments,
        crate::routes::comments::create_comment,
        crate::routes::comments::delete_comment,
        crate::routes::comments::count_comments,
    ),
    components(
        schemas(
            StatusDoc,
            ErrorDoc,
            CountDoc,
            NewUserDoc,
            UserPatchDoc,
            NewCommentDoc,
        )
    ),
    tags(
        (name = "status"),
        (name = "users"),
        (name = "comments")
    )
)]
pub struct ApiDoc;
