//! Input validation for the users routes.
//!
//! Validators are synchronous and run after body parsing, before any store
//! access. The first violation found is reported.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::http::error::ApiError;
use crate::http::request::RequestContext;
use crate::users::USER_FIELDS;

pub const AGE_MIN: i64 = 1;
pub const AGE_MAX: i64 = 100;

/// `GET` and `DELETE /api/users/:id`.
pub fn validate_user_id(ctx: &RequestContext) -> Result<(), ApiError> {
    user_id(ctx).map(|_| ())
}

/// `POST /api/users`.
pub fn validate_create_user(ctx: &RequestContext) -> Result<(), ApiError> {
    let body = body_object(ctx)?;

    if !USER_FIELDS.iter().all(|field| body.contains_key(*field)) {
        return Err(ApiError::required_fields(&USER_FIELDS));
    }
    reject_extra_fields(body)?;

    check_username(&body["username"])?;
    check_age(&body["age"])?;
    check_hobbies(&body["hobbies"])
}

/// `PUT /api/users/:id`. Only the fields present are checked.
pub fn validate_update_user(ctx: &RequestContext) -> Result<(), ApiError> {
    user_id(ctx)?;
    let body = body_object(ctx)?;
    reject_extra_fields(body)?;

    if let Some(username) = body.get("username") {
        check_username(username)?;
    }
    if let Some(age) = body.get("age") {
        check_age(age)?;
    }
    if let Some(hobbies) = body.get("hobbies") {
        check_hobbies(hobbies)?;
    }
    Ok(())
}

/// Extract and parse the `:id` parameter.
pub fn user_id(ctx: &RequestContext) -> Result<Uuid, ApiError> {
    let raw = match ctx.param("id") {
        Some(id) if !id.is_empty() => id,
        _ => return Err(ApiError::required_param("id")),
    };
    if !is_uuid_shaped(raw) {
        return Err(ApiError::incorrect_param_pattern("id", "UUID"));
    }
    Uuid::parse_str(raw).map_err(|_| ApiError::incorrect_param_pattern("id", "UUID"))
}

/// Hyphenated 8-4-4-4-12 hex, any case.
pub fn is_uuid_shaped(s: &str) -> bool {
    const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];
    let parts: Vec<&str> = s.split('-').collect();
    parts.len() == GROUPS.len()
        && parts
            .iter()
            .zip(GROUPS)
            .all(|(part, len)| part.len() == len && part.bytes().all(|b| b.is_ascii_hexdigit()))
}

fn body_object(ctx: &RequestContext) -> Result<&Map<String, Value>, ApiError> {
    ctx.body.as_object().ok_or_else(ApiError::malformed_json)
}

fn reject_extra_fields(body: &Map<String, Value>) -> Result<(), ApiError> {
    let extra: Vec<&str> = body
        .keys()
        .map(String::as_str)
        .filter(|key| !USER_FIELDS.contains(key))
        .collect();
    if extra.is_empty() {
        Ok(())
    } else {
        Err(ApiError::extra_fields(&extra))
    }
}

fn check_username(value: &Value) -> Result<(), ApiError> {
    if value.is_string() {
        Ok(())
    } else {
        Err(ApiError::incorrect_field_type("username", "string"))
    }
}

fn check_age(value: &Value) -> Result<(), ApiError> {
    let age = value
        .as_i64()
        .ok_or_else(|| ApiError::incorrect_field_type("age", "int"))?;
    if (AGE_MIN..=AGE_MAX).contains(&age) {
        Ok(())
    } else {
        Err(ApiError::incorrect_field_range("age", AGE_MIN, AGE_MAX))
    }
}

fn check_hobbies(value: &Value) -> Result<(), ApiError> {
    let hobbies = value
        .as_array()
        .ok_or_else(|| ApiError::incorrect_field_type("hobbies", "array"))?;
    if hobbies.iter().all(Value::is_string) {
        Ok(())
    } else {
        Err(ApiError::incorrect_array_field_type("hobbies", "string"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::InboundRequest;
    use crate::routing::Params;
    use axum::http::Method;
    use serde_json::json;

    const ID: &str = "0b7c6a3e-58f4-4c51-9a4e-3f2b1d0c9e8a";

    fn ctx(id: Option<&str>, body: Value) -> RequestContext {
        let mut params = Params::new();
        if let Some(id) = id {
            params.insert("id".into(), id.into());
        }
        let mut ctx = RequestContext::new(InboundRequest::new(Method::PUT, "/"), "/api/users/:id", params);
        ctx.body = body;
        ctx
    }

    fn valid_user() -> Value {
        json!({"username": "ann", "age": 30, "hobbies": ["chess"]})
    }

    #[test]
    fn test_uuid_shape() {
        assert!(is_uuid_shaped(ID));
        assert!(is_uuid_shaped(&ID.to_uppercase()));
        assert!(!is_uuid_shaped("0b7c6a3e58f44c519a4e3f2b1d0c9e8a"));
        assert!(!is_uuid_shaped("0b7c6a3e-58f4-4c51-9a4e-3f2b1d0c9e8z"));
        assert!(!is_uuid_shaped("not-a-uuid"));
    }

    #[test]
    fn test_id_param() {
        assert_eq!(user_id(&ctx(Some(ID), json!({}))).unwrap().to_string(), ID);
        assert_eq!(
            validate_user_id(&ctx(Some(""), json!({}))),
            Err(ApiError::required_param("id"))
        );
        assert_eq!(
            validate_user_id(&ctx(Some("123"), json!({}))).unwrap_err().client_message(),
            "Param \"id\" does not match \"UUID\" pattern"
        );
    }

    #[test]
    fn test_create_accepts_valid_user() {
        assert!(validate_create_user(&ctx(None, valid_user())).is_ok());
        assert!(validate_create_user(&ctx(None, json!({"username": "a", "age": 1, "hobbies": []}))).is_ok());
    }

    #[test]
    fn test_create_requires_all_fields() {
        let err = validate_create_user(&ctx(None, json!({"username": "ann"}))).unwrap_err();
        assert_eq!(
            err.client_message(),
            "Must be specified all required fields: [username, age, hobbies]"
        );
    }

    #[test]
    fn test_create_rejects_extra_fields() {
        let mut body = valid_user();
        body["email"] = json!("a@b.c");
        let err = validate_create_user(&ctx(None, body)).unwrap_err();
        assert_eq!(err.client_message(), "It has extra fields: [email]");
    }

    #[test]
    fn test_extra_fields_keep_request_order() {
        let body: Value =
            serde_json::from_str(r#"{"zeta": 1, "username": "a", "age": 1, "hobbies": [], "alpha": 2}"#)
                .unwrap();
        let err = validate_create_user(&ctx(None, body)).unwrap_err();
        assert_eq!(err.client_message(), "It has extra fields: [zeta, alpha]");
    }

    #[test]
    fn test_field_types() {
        let cases = [
            (json!({"username": 5, "age": 30, "hobbies": []}), "Field \"username\" must have \"string\" type"),
            (json!({"username": "a", "age": "30", "hobbies": []}), "Field \"age\" must have \"int\" type"),
            (json!({"username": "a", "age": 30.5, "hobbies": []}), "Field \"age\" must have \"int\" type"),
            (json!({"username": "a", "age": 0, "hobbies": []}), "Field \"age\" must be more or equal \"1\" but less or equal than 100"),
            (json!({"username": "a", "age": 101, "hobbies": []}), "Field \"age\" must be more or equal \"1\" but less or equal than 100"),
            (json!({"username": "a", "age": 30, "hobbies": "chess"}), "Field \"hobbies\" must have \"array\" type"),
            (json!({"username": "a", "age": 30, "hobbies": ["x", 1]}), "Field \"hobbies\" must have \"string\" type in array"),
        ];
        for (body, expected) in cases {
            let err = validate_create_user(&ctx(None, body.clone())).unwrap_err();
            assert_eq!(err.client_message(), expected, "body: {body}");
        }
    }

    #[test]
    fn test_non_object_body() {
        assert_eq!(
            validate_create_user(&ctx(None, json!([1, 2]))),
            Err(ApiError::malformed_json())
        );
    }

    #[test]
    fn test_update_checks_present_fields_only() {
        assert!(validate_update_user(&ctx(Some(ID), json!({"age": 42}))).is_ok());
        assert!(validate_update_user(&ctx(Some(ID), json!({}))).is_ok());
        assert!(validate_update_user(&ctx(Some(ID), json!({"age": 0}))).is_err());
        assert!(validate_update_user(&ctx(Some(ID), json!({"nick": "x"}))).is_err());
    }

    #[test]
    fn test_update_checks_id_first() {
        let err = validate_update_user(&ctx(Some("nope"), json!({"nick": "x"}))).unwrap_err();
        assert_eq!(err, ApiError::incorrect_param_pattern("id", "UUID"));
    }
}
