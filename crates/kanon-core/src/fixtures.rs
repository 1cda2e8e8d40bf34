//! Reusable fixtures for a reqres-style user API.
//!
//! These cover the shapes most contract suites start from: a paged user
//! list, user create/update responses, and the login/register exchange.

use crate::model::{FieldType, ModelSchema};
use serde_json::{json, Value};

/// A single user as it appears in a list page.
pub fn user_schema() -> ModelSchema {
    ModelSchema::builder("User")
        .field("id", FieldType::Integer)
        .field("email", FieldType::String)
        .field("first_name", FieldType::String)
        .field("last_name", FieldType::String)
        .field("avatar", FieldType::String)
        .build()
}

/// Request body for creating or updating a user.
pub fn user_request_schema() -> ModelSchema {
    ModelSchema::builder("UserRequest")
        .field("name", FieldType::String)
        .field("job", FieldType::String)
        .build()
}

/// Response to `POST /users`.
pub fn create_user_response_schema() -> ModelSchema {
    ModelSchema::builder("CreateUserResponse")
        .field("name", FieldType::String)
        .field("job", FieldType::String)
        .field("id", FieldType::String)
        .field("createdAt", FieldType::String)
        .build()
}

/// Response to `PUT`/`PATCH /users/{id}`.
pub fn update_user_response_schema() -> ModelSchema {
    ModelSchema::builder("UpdateUserResponse")
        .field("name", FieldType::String)
        .field("job", FieldType::String)
        .field("updatedAt", FieldType::String)
        .build()
}

/// Request body for `/login` and `/register`.
pub fn login_request_schema() -> ModelSchema {
    ModelSchema::builder("LoginRequest")
        .field("email", FieldType::String)
        .field("password", FieldType::String)
        .build()
}

/// Response to `/login` and `/register`; `error` is set on failure.
pub fn login_response_schema() -> ModelSchema {
    ModelSchema::builder("LoginResponse")
        .field("id", FieldType::Integer)
        .field("token", FieldType::String)
        .field("error", FieldType::String)
        .build()
}

/// Page 2 of the user list: six users with distinct emails and HTTPS
/// avatars.
pub fn users_page() -> Value {
    let users: Vec<Value> = [
        (7, "michael", "lawson"),
        (8, "lindsay", "ferguson"),
        (9, "tobias", "funke"),
        (10, "byron", "fields"),
        (11, "george", "edwards"),
        (12, "rachel", "howell"),
    ]
    .into_iter()
    .map(|(id, first, last)| user(id, first, last))
    .collect();

    json!({
        "page": 2,
        "per_page": 6,
        "total": 12,
        "total_pages": 2,
        "data": users,
        "support": {
            "url": "https://contentcaddy.io?utm_source=reqres&utm_medium=json&utm_campaign=referral",
            "text": "Tired of writing endless social media content? Let Content Caddy generate it for you."
        }
    })
}

fn user(id: u32, first: &str, last: &str) -> Value {
    let mut first_name = first.to_string();
    if let Some(initial) = first_name.get_mut(..1) {
        initial.make_ascii_uppercase();
    }
    let mut last_name = last.to_string();
    if let Some(initial) = last_name.get_mut(..1) {
        initial.make_ascii_uppercase();
    }

    json!({
        "id": id,
        "email": format!("{first}.{last}@reqres.in"),
        "first_name": first_name,
        "last_name": last_name,
        "avatar": format!("https://reqres.in/img/faces/{id}-image.jpg"),
    })
}
