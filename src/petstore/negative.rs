// Negative pet store checks: malformed ids, payloads, headers and files.
//
// Most of these only log what the store answered. A check fails the unit
// when it reads the body as JSON and the store replied with something else,
// or when the request itself could not be made.

use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Result;
use reqwest::Method;
use serde_json::json;
use tracing::{info, warn};

use super::{log_body, note_status, unit, Pet, PetStatus};
use crate::config::Config;
use crate::test_context::{ApiResponse, TestCtx};
use crate::test_unit::TestUnit;

pub const MISSING_IMAGE: &str = "nonexistent_image.jpg";
pub const TEXT_FILE: &str = "image.txt";
pub const LARGE_IMAGE: &str = "large_image.jpg";

pub fn units(ctx: &Rc<TestCtx>, config: &Config) -> Vec<TestUnit> {
    let pet_image: PathBuf = config.image_path(super::positive::PET_IMAGE);
    let missing_image = config.image_path(MISSING_IMAGE);
    let text_file = config.image_path(TEXT_FILE);
    let large_image = config.image_path(LARGE_IMAGE);

    vec![
        unit(ctx, "get_pet_with_large_id", get_pet_with_large_id),
        unit(ctx, "get_pet_with_invalid_id_type", get_pet_with_invalid_id_type),
        unit(ctx, "get_pet_invalid_json_format", get_pet_invalid_json_format),
        unit(ctx, "get_pet_with_invalid_authorization", get_pet_with_invalid_authorization),
        unit(ctx, "get_pet_with_empty_id", get_pet_with_empty_id),
        unit(ctx, "get_pet_with_invalid_query_param", get_pet_with_invalid_query_param),
        unit(ctx, "get_pet_with_empty_authorization", get_pet_with_empty_authorization),
        unit(ctx, "get_pet_with_invalid_content_type", get_pet_with_invalid_content_type),
        unit(ctx, "create_pet_malformed_json", create_pet_malformed_json),
        unit(ctx, "create_pet_invalid_data_types", create_pet_invalid_data_types),
        unit(ctx, "create_pet_invalid_content_type", create_pet_invalid_content_type),
        unit(ctx, "create_pet_empty_photo_urls", create_pet_empty_photo_urls),
        unit(ctx, "create_pet_with_invalid_id", create_pet_with_invalid_id),
        unit(ctx, "create_pet_missing_name", create_pet_missing_name),
        unit(ctx, "create_pet_invalid_json_format", create_pet_invalid_json_format),
        unit(ctx, "create_pet_invalid_category_id", create_pet_invalid_category_id),
        unit(ctx, "update_pet_with_array_id", update_pet_with_array_id),
        unit(ctx, "update_pet_with_invalid_id_format", update_pet_with_invalid_id_format),
        unit(ctx, "update_pet_with_missing_field", update_pet_with_missing_field),
        unit(ctx, "update_pet_with_invalid_status_value", update_pet_with_invalid_status_value),
        unit(ctx, "update_pet_with_invalid_json_format", update_pet_with_invalid_json_format),
        unit(ctx, "update_pet_with_empty_id", update_pet_with_empty_id),
        unit(ctx, "update_pet_with_invalid_header", update_pet_with_invalid_header),
        unit(ctx, "update_pet_with_invalid_id", update_pet_with_invalid_id),
        unit(ctx, "get_pet_with_invalid_endpoint", get_pet_with_invalid_endpoint),
        unit(ctx, "delete_non_existent_pet", delete_non_existent_pet),
        unit(ctx, "delete_invalid_pet_id", delete_invalid_pet_id),
        unit(ctx, "upload_pet_image_invalid_pet_id", move |ctx| {
            upload_pet_image_invalid_pet_id(ctx, 9999990009, &pet_image)
        }),
        unit(ctx, "upload_pet_image_invalid_file_path", move |ctx| {
            upload_pet_image_invalid_file_path(ctx, 123, &missing_image)
        }),
        unit(ctx, "upload_pet_image_unsupported_file", move |ctx| {
            upload_pet_image_unsupported_file(ctx, 123, &text_file)
        }),
        unit(ctx, "upload_pet_image_large_file", move |ctx| {
            upload_pet_image_large_file(ctx, 123, &large_image)
        }),
        unit(ctx, "update_pet_status_invalid_pet_id", |ctx| {
            update_pet_status_invalid_pet_id(ctx, 99999, "sold")
        }),
        unit(ctx, "update_pet_status_invalid_status", |ctx| {
            update_pet_status_invalid_status(ctx, 12345, "not_active")
        }),
        unit(ctx, "update_pet_status_missing_fields", |ctx| {
            update_pet_status_missing_fields(ctx, json!(""))
        }),
        unit(ctx, "update_pet_status_invalid_json", |ctx| {
            update_pet_status_invalid_json(ctx, 123, "sold")
        }),
    ]
}

// Payloads

/// The update payload most PUT checks start from, with `id` swapped in.
fn update_payload(id: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "name": "Tommy Updated",
        "status": "sold",
        "category": { "id": 1, "name": "dog" },
        "tags": [{ "id": 1, "name": "playful" }]
    })
}

/// A PUT body whose id overflows every integer type the store could use.
/// serde cannot emit such a number, so the body is written out by hand.
fn oversized_id_payload() -> String {
    format!(
        r#"{{"id": {}, "name": "Tommy Updated", "status": "sold", "category": {{"id": 1, "name": "dog"}}, "tags": [{{"id": 1, "name": "playful"}}], "photoUrls": ["http://example.com/photo.jpg"]}}"#,
        "9".repeat(46)
    )
}

/// Status update body with the closing brace missing.
fn truncated_status_payload(pet_id: i64, new_status: &str) -> String {
    format!(r#"{{"id": {}, "status": "{}""#, pet_id, new_status)
}

fn log_json(label: &str, response: &ApiResponse) -> Result<()> {
    let body = response.json()?;
    info!(status = response.status, "{}: {}", label, body);
    Ok(())
}

fn log_text(label: &str, response: &ApiResponse) {
    info!(status = response.status, "{}: {}", label, response.body);
}

// GET

pub fn get_pet_with_large_id(ctx: &TestCtx) -> Result<()> {
    let response = ctx.get("/pet/999999999999999")?;
    log_json("get pet with large id", &response)
}

pub fn get_pet_with_invalid_id_type(ctx: &TestCtx) -> Result<()> {
    let response = ctx.get("/pet/abc123")?;
    log_json("get pet with invalid id type", &response)
}

pub fn get_pet_invalid_json_format(ctx: &TestCtx) -> Result<()> {
    let response = ctx.get_with_headers("/pet/12345", &[("Content-Type", "application/xml")])?;
    log_text("get pet with invalid json format", &response);
    Ok(())
}

pub fn get_pet_with_invalid_authorization(ctx: &TestCtx) -> Result<()> {
    let response = ctx.get_with_headers("/pet/12345", &[("Authorization", "Bearer invalid_token")])?;
    log_json("get pet with invalid authorization", &response)
}

pub fn get_pet_with_empty_id(ctx: &TestCtx) -> Result<()> {
    let response = ctx.get("/pet/")?;
    match response.status {
        405 => info!("method not allowed for empty id"),
        404 => info!("pet not found"),
        _ => log_body(&response),
    }
    Ok(())
}

pub fn get_pet_with_invalid_query_param(ctx: &TestCtx) -> Result<()> {
    let response = ctx.get_with_query("/pet", &[("status", "nonexistent_status")])?;
    if response.status == 405 {
        info!("method not allowed for invalid query parameter");
    } else {
        log_body(&response);
    }
    Ok(())
}

pub fn get_pet_with_empty_authorization(ctx: &TestCtx) -> Result<()> {
    let response = ctx.get_with_headers("/pet/12345", &[("Authorization", "")])?;
    log_json("get pet with empty authorization", &response)
}

pub fn get_pet_with_invalid_content_type(ctx: &TestCtx) -> Result<()> {
    let response = ctx.get_with_headers("/pet/12345", &[("Content-Type", "application/xml")])?;
    log_json("get pet with invalid content type", &response)
}

pub fn get_pet_with_invalid_endpoint(ctx: &TestCtx) -> Result<()> {
    let response = ctx.get("/invalid_endpoint")?;
    log_text("invalid endpoint", &response);
    Ok(())
}

// POST

pub fn create_pet_with_invalid_id(ctx: &TestCtx) -> Result<()> {
    let payload = json!({
        "id": "0,5",
        "name": "doggie",
        "status": "available",
        "category": { "id": 1, "name": "dog" },
        "tags": [{ "id": 1, "name": "friendly" }],
        "photoUrls": ["url1"]
    });
    let response = ctx.post_json("/pet", &payload)?;
    log_json("create pet with invalid id", &response)
}

pub fn create_pet_missing_name(ctx: &TestCtx) -> Result<()> {
    let payload = json!({
        "id": 12345,
        "status": "available",
        "category": { "id": 1, "name": "dog" },
        "tags": [{ "id": 1 }],
        "photoUrls": ["url1"]
    });
    let response = ctx.post_json("/pet", &payload)?;
    log_json("create pet missing name", &response)
}

pub fn create_pet_invalid_json_format(ctx: &TestCtx) -> Result<()> {
    // Single quotes are not JSON.
    let body = "{ 'id': 12345, 'name': 'doggie', 'status': 'available' }";
    let response = ctx.send_raw(Method::POST, "/pet", "application/json", body)?;
    log_text("create pet with invalid json format", &response);
    Ok(())
}

pub fn create_pet_invalid_category_id(ctx: &TestCtx) -> Result<()> {
    let payload = json!({
        "id": 12345,
        "name": "doggie",
        "status": "available",
        "category": { "id": "abcd", "name": "dog" },
        "tags": [{ "id": 1, "name": "friendly" }],
        "photoUrls": ["url1"]
    });
    let response = ctx.post_json("/pet", &payload)?;
    log_json("create pet with invalid category id", &response)
}

pub fn create_pet_malformed_json(ctx: &TestCtx) -> Result<()> {
    let body = r#"{"id": 12345, "name": "doggie", "status": "available",}"#;
    let response = ctx.send_raw(Method::POST, "/pet", "application/json", body)?;
    log_text("create pet malformed json", &response);
    Ok(())
}

pub fn create_pet_invalid_data_types(ctx: &TestCtx) -> Result<()> {
    let payload = json!({
        "id": "invalid_id",
        "name": 12345,
        "status": true,
        "photoUrls": "invalid_url"
    });
    let response = ctx.post_json("/pet", &payload)?;
    log_json("create pet invalid data types", &response)
}

pub fn create_pet_invalid_content_type(ctx: &TestCtx) -> Result<()> {
    let pet = Pet::new(12345, "doggie")
        .with_status(PetStatus::Available)
        .with_photo_url("string");
    let body = serde_json::to_string(&pet)?;
    let response = ctx.send_raw(Method::POST, "/pet", "text/plain", body)?;
    log_text("create pet invalid content type", &response);
    Ok(())
}

pub fn create_pet_empty_photo_urls(ctx: &TestCtx) -> Result<()> {
    let payload = json!({
        "id": 12345,
        "name": "doggie",
        "status": "available",
        "category": { "id": 1, "name": "dog" },
        "tags": [{ "id": 1, "name": "friendly" }],
        "photoUrls": {}
    });
    let response = ctx.post_json("/pet", &payload)?;
    log_json("create pet empty photo urls", &response)
}

// PUT

pub fn update_pet_with_array_id(ctx: &TestCtx) -> Result<()> {
    let response = ctx.put_json("/pet", &update_payload(json!([0, 99999999])))?;
    log_json("update pet with array id", &response)
}

pub fn update_pet_with_invalid_id_format(ctx: &TestCtx) -> Result<()> {
    let response = ctx.put_json("/pet", &update_payload(json!("invalid_id")))?;
    log_json("update pet with invalid id format", &response)
}

pub fn update_pet_with_missing_field(ctx: &TestCtx) -> Result<()> {
    let payload = json!({ "id": 12345, "status": "available" });
    let response = ctx.put_json("/pet", &payload)?;
    expect_rejection(&response, "missing required fields should return an error")
}

pub fn update_pet_with_invalid_status_value(ctx: &TestCtx) -> Result<()> {
    let mut payload = update_payload(json!(12345));
    payload["status"] = json!("invalid_status");
    let response = ctx.put_json("/pet", &payload)?;
    expect_rejection(&response, "invalid status should return an error")
}

pub fn update_pet_with_invalid_json_format(ctx: &TestCtx) -> Result<()> {
    let response = ctx.send_raw(Method::PUT, "/pet", "application/xml", "<xml>invalid data</xml>")?;
    log_text("update pet with invalid json format", &response);
    Ok(())
}

pub fn update_pet_with_empty_id(ctx: &TestCtx) -> Result<()> {
    let response = ctx.put_json("/pet", &update_payload(json!("")))?;
    expect_rejection(&response, "pet id should not be empty")
}

pub fn update_pet_with_invalid_header(ctx: &TestCtx) -> Result<()> {
    let body = serde_json::to_string(&update_payload(json!(12345)))?;
    let response = ctx.send_raw(Method::PUT, "/pet", "application/xml", body)?;
    log_text("update pet with invalid header", &response);
    Ok(())
}

pub fn update_pet_with_invalid_id(ctx: &TestCtx) -> Result<()> {
    let response = ctx.send_raw(Method::PUT, "/pet", "application/json", oversized_id_payload())?;
    log_text("update pet with invalid id", &response);
    Ok(())
}

/// A 200 here is logged as unexpected; any other answer must carry a JSON
/// error body.
fn expect_rejection(response: &ApiResponse, reason: &str) -> Result<()> {
    if response.status == 200 {
        warn!("unexpected response: {}", reason);
        Ok(())
    } else {
        log_json("rejected", response)
    }
}

// DELETE

pub fn delete_non_existent_pet(ctx: &TestCtx) -> Result<()> {
    let response = ctx.delete("/pet/99999999999999")?;
    if !note_status(&response, 404, "expected result: pet not found") {
        log_json("unexpected response", &response)?;
    }
    Ok(())
}

pub fn delete_invalid_pet_id(ctx: &TestCtx) -> Result<()> {
    let response = ctx.delete("/pet/invalid_id")?;
    if !note_status(&response, 400, "expected result: bad request due to invalid id") {
        log_json("unexpected response", &response)?;
    }
    Ok(())
}

// Image upload

fn upload(ctx: &TestCtx, pet_id: i64, file_path: &Path) -> Result<ApiResponse> {
    ctx.upload_file(&format!("/pet/{}/uploadImage", pet_id), "file", file_path)
}

pub fn upload_pet_image_invalid_pet_id(ctx: &TestCtx, pet_id: i64, file_path: &Path) -> Result<()> {
    let response = upload(ctx, pet_id, file_path)?;
    note_status(&response, 404, "pet not found");
    Ok(())
}

/// The file is expected to be missing; that is the outcome this check wants.
/// Any other failure to read it still fails the unit.
pub fn upload_pet_image_invalid_file_path(ctx: &TestCtx, pet_id: i64, file_path: &Path) -> Result<()> {
    let response = match upload(ctx, pet_id, file_path) {
        Ok(response) => response,
        Err(err) if is_not_found(&err) => {
            info!(file = %file_path.display(), "file not found");
            return Ok(());
        }
        Err(err) => return Err(err),
    };
    if response.status != 200 {
        warn!(status = response.status, "upload failed: {}", response.body);
    }
    Ok(())
}

fn is_not_found(err: &anyhow::Error) -> bool {
    err.root_cause()
        .downcast_ref::<io::Error>()
        .map_or(false, |err| err.kind() == io::ErrorKind::NotFound)
}

pub fn upload_pet_image_unsupported_file(ctx: &TestCtx, pet_id: i64, file_path: &Path) -> Result<()> {
    let response = upload(ctx, pet_id, file_path)?;
    note_status(&response, 415, "unsupported media type");
    Ok(())
}

pub fn upload_pet_image_large_file(ctx: &TestCtx, pet_id: i64, file_path: &Path) -> Result<()> {
    let response = upload(ctx, pet_id, file_path)?;
    note_status(&response, 413, "file size exceeds limit");
    Ok(())
}

// Status updates

pub fn update_pet_status_invalid_pet_id(ctx: &TestCtx, pet_id: i64, new_status: &str) -> Result<()> {
    let response = ctx.put_json("/pet", &json!({ "id": pet_id, "status": new_status }))?;
    note_status(&response, 404, "pet not found");
    Ok(())
}

pub fn update_pet_status_invalid_status(ctx: &TestCtx, pet_id: i64, new_status: &str) -> Result<()> {
    let response = ctx.put_json("/pet", &json!({ "id": pet_id, "status": new_status }))?;
    note_status(&response, 400, "invalid status provided");
    Ok(())
}

pub fn update_pet_status_missing_fields(ctx: &TestCtx, pet_id: serde_json::Value) -> Result<()> {
    // 'status' is left out on purpose.
    let response = ctx.put_json("/pet", &json!({ "id": pet_id }))?;
    note_status(&response, 400, "missing required fields");
    Ok(())
}

pub fn update_pet_status_invalid_json(ctx: &TestCtx, pet_id: i64, new_status: &str) -> Result<()> {
    let body = truncated_status_payload(pet_id, new_status);
    let response = ctx.send_raw(Method::PUT, "/pet", "application/json", body)?;
    note_status(&response, 400, "malformed json in request");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_payload_swaps_id() {
        let payload = update_payload(json!("invalid_id"));
        assert_eq!(payload["id"], "invalid_id");
        assert_eq!(payload["name"], "Tommy Updated");
        assert_eq!(payload["tags"][0]["name"], "playful");
    }

    #[test]
    fn test_oversized_id_payload_is_valid_json_with_huge_id() {
        let body = oversized_id_payload();
        assert!(body.contains(&"9".repeat(46)));
        // Parses as a float, which is exactly why it cannot be built with serde.
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(value["id"].as_i64().is_none());
        assert_eq!(value["photoUrls"][0], "http://example.com/photo.jpg");
    }

    #[test]
    fn test_truncated_status_payload_is_not_json() {
        let body = truncated_status_payload(123, "sold");
        assert_eq!(body, r#"{"id": 123, "status": "sold""#);
        assert!(serde_json::from_str::<serde_json::Value>(&body).is_err());
    }

    #[test]
    fn test_missing_upload_file_counts_as_expected() {
        let ctx = TestCtx::new(&Config::default()).unwrap();
        let result = upload_pet_image_invalid_file_path(&ctx, 123, Path::new("/definitely/not/here.jpg"));
        assert!(result.is_ok());
    }

    #[test]
    fn test_unreadable_upload_path_is_not_a_missing_file() {
        let ctx = TestCtx::new(&Config::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let err = upload_pet_image_invalid_file_path(&ctx, 123, dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to read upload file"));
    }

    #[test]
    fn test_other_uploads_fail_on_missing_file() {
        let ctx = TestCtx::new(&Config::default()).unwrap();
        let missing = Path::new("/definitely/not/here.txt");
        assert!(upload_pet_image_unsupported_file(&ctx, 123, missing).is_err());
        assert!(upload_pet_image_large_file(&ctx, 123, missing).is_err());
        assert!(upload_pet_image_invalid_pet_id(&ctx, 9999990009, missing).is_err());
    }

    #[test]
    fn test_unit_order_matches_suite() {
        let ctx = Rc::new(TestCtx::new(&Config::default()).unwrap());
        let names: Vec<String> = units(&ctx, &Config::default())
            .iter()
            .map(|u| u.name().to_owned())
            .collect();
        assert_eq!(names.first().map(String::as_str), Some("get_pet_with_large_id"));
        assert_eq!(names.last().map(String::as_str), Some("update_pet_status_invalid_json"));
        let array_id = names.iter().position(|n| n == "update_pet_with_array_id").unwrap();
        let invalid_id = names.iter().position(|n| n == "update_pet_with_invalid_id").unwrap();
        assert!(array_id < invalid_id);
    }
}
