// Positive pet store checks: the happy paths of create, read, update,
// delete, image upload and status queries.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{ensure, Context, Result};
use serde_json::{json, Value};
use tracing::{info, warn};

use super::{expect_status, unit, Pet, PetStatus};
use crate::config::Config;
use crate::test_context::{ApiResponse, TestCtx};
use crate::test_unit::TestUnit;

pub const PET_ID: i64 = 12345;
pub const PET_IMAGE: &str = "pets-3715733_1280.jpg";

pub fn units(ctx: &Rc<TestCtx>, config: &Config) -> Vec<TestUnit> {
    let image: PathBuf = config.image_path(PET_IMAGE);

    vec![
        unit(ctx, "create_pet", create_pet),
        unit(ctx, "create_multiple_pets", create_multiple_pets),
        unit(ctx, "create_pet_missing_fields", create_pet_missing_fields),
        unit(ctx, "create_pet_missing_nested_fields", create_pet_missing_nested_fields),
        unit(ctx, "get_pet", |ctx| get_pet(ctx, PET_ID).map(drop)),
        unit(ctx, "list_pets_by_status", |ctx| list_pets_by_status(ctx, PetStatus::Pending)),
        unit(ctx, "verify_pet_details", |ctx| {
            verify_pet_details(ctx, PET_ID, "doggie", PetStatus::Available)
        }),
        unit(ctx, "update_pet", |ctx| update_pet(ctx, PET_ID)),
        unit(ctx, "delete_pet", |ctx| delete_pet(ctx, PET_ID)),
        unit(ctx, "upload_pet_image", move |ctx| upload_pet_image(ctx, PET_ID, &image)),
        unit(ctx, "update_pet_status", |ctx| update_pet_status(ctx, PET_ID, PetStatus::Sold)),
        unit(ctx, "update_pet_category", |ctx| update_pet_category(ctx, PET_ID, 2, "cat")),
        unit(ctx, "add_pet_tag", |ctx| add_pet_tag(ctx, PET_ID, "playful")),
        unit(ctx, "list_pets_by_name", |ctx| list_pets_by_name(ctx, "Tommy")),
        unit(ctx, "create_multiple_and_validate_pets", create_multiple_and_validate_pets),
        unit(ctx, "update_pet_full_details", |ctx| update_pet_full_details(ctx, PET_ID)),
    ]
}

fn sample_pets() -> [Pet; 2] {
    [
        Pet::new(1111, "Rex")
            .with_status(PetStatus::Available)
            .with_category(1, "dog")
            .with_tag(1, "friendly"),
        Pet::new(2222, "Whiskers")
            .with_status(PetStatus::Pending)
            .with_category(2, "cat")
            .with_tag(2, "cute"),
    ]
}

pub fn create_pet(ctx: &TestCtx) -> Result<()> {
    let pet = Pet::new(PET_ID, "Tommy")
        .with_status(PetStatus::Available)
        .with_category(1, "dog")
        .with_tag(1, "friendly");
    let response = ctx.post_json("/pet", &pet)?;
    let body = response.json()?;
    info!(status = response.status, "create pet: {}", body);
    Ok(())
}

pub fn create_multiple_pets(ctx: &TestCtx) -> Result<()> {
    for pet in sample_pets() {
        let response = ctx.post_json("/pet", &pet)?;
        info!(pet_id = pet.id, status = response.status, "create pet");
        expect_status(&response, 200, &format!("Failed to create pet with ID {}", pet.id))?;
    }
    info!("multiple pets created successfully");
    Ok(())
}

pub fn create_pet_missing_fields(ctx: &TestCtx) -> Result<()> {
    // 'name' and 'photoUrls' are missing.
    let payload = json!({ "id": PET_ID, "status": "available" });
    let response = ctx.post_json("/pet", &payload)?;
    let body = response.json()?;
    info!(status = response.status, "create pet missing fields: {}", body);
    Ok(())
}

pub fn create_pet_missing_nested_fields(ctx: &TestCtx) -> Result<()> {
    let payload = json!({
        "id": PET_ID,
        "name": "doggie",
        "status": "available",
        "category": {},
        "tags": []
    });
    let response = ctx.post_json("/pet", &payload)?;
    let body = response.json()?;
    info!(status = response.status, "create pet missing nested fields: {}", body);
    Ok(())
}

pub fn get_pet(ctx: &TestCtx, pet_id: i64) -> Result<ApiResponse> {
    let response = ctx.get(&format!("/pet/{}", pet_id))?;
    if response.status == 200 {
        let body = response.json()?;
        info!(pet_id, "pet data: {}", body);
    } else {
        info!(pet_id, status = response.status, "pet not found");
    }
    Ok(response)
}

pub fn list_pets_by_status(ctx: &TestCtx, status: PetStatus) -> Result<()> {
    let response = ctx.get_with_query("/pet/findByStatus", &[("status", status.as_str())])?;
    if response.status == 200 {
        let pets = response.json()?;
        info!(status = status.as_str(), count = array_len(&pets), "pets listed by status");
    } else {
        warn!(status = response.status, "failed to fetch pets by status");
    }
    Ok(())
}

pub fn verify_pet_details(
    ctx: &TestCtx,
    pet_id: i64,
    expected_name: &str,
    expected_status: PetStatus,
) -> Result<()> {
    let response = get_pet(ctx, pet_id)?;
    if response.status != 200 {
        info!(pet_id, "pet not found for verification");
        return Ok(());
    }

    let pet = response.json()?;
    ensure!(pet["name"] == expected_name, "Pet name mismatch: got {}", pet["name"]);
    ensure!(
        pet["status"] == expected_status.as_str(),
        "Pet status mismatch: got {}",
        pet["status"]
    );
    info!(pet_id, "pet details are correct");
    Ok(())
}

pub fn update_pet(ctx: &TestCtx, pet_id: i64) -> Result<()> {
    let pet = Pet::new(pet_id, "Tommy Updated")
        .with_status(PetStatus::Sold)
        .with_category(1, "dog")
        .with_tag(1, "playful");
    let response = ctx.put_json("/pet", &pet)?;
    let body = response.json()?;
    info!(status = response.status, "update pet: {}", body);
    Ok(())
}

pub fn delete_pet(ctx: &TestCtx, pet_id: i64) -> Result<()> {
    let response = ctx.delete(&format!("/pet/{}", pet_id))?;
    if response.status == 200 {
        info!(pet_id, "pet deleted successfully");
    } else {
        warn!(pet_id, status = response.status, "error deleting pet");
    }
    Ok(())
}

pub fn upload_pet_image(ctx: &TestCtx, pet_id: i64, file_path: &Path) -> Result<()> {
    let response = ctx.upload_file(&format!("/pet/{}/uploadImage", pet_id), "file", file_path)?;
    if response.status == 200 {
        let body = response.json()?;
        info!(pet_id, "upload image: {}", body);
    } else {
        warn!(pet_id, status = response.status, "image upload failed");
    }
    Ok(())
}

pub fn update_pet_status(ctx: &TestCtx, pet_id: i64, new_status: PetStatus) -> Result<()> {
    let payload = json!({ "id": pet_id, "status": new_status });
    let response = ctx.put_json("/pet", &payload)?;
    if response.status == 200 {
        let body = response.json()?;
        info!(pet_id, "pet updated with status: {}", body);
    } else {
        warn!(pet_id, status = response.status, "pet status update failed");
    }
    Ok(())
}

pub fn update_pet_category(ctx: &TestCtx, pet_id: i64, category_id: i64, category_name: &str) -> Result<()> {
    let payload = json!({
        "id": pet_id,
        "category": { "id": category_id, "name": category_name }
    });
    let response = ctx.put_json("/pet", &payload)?;
    if response.status == 200 {
        let body = response.json()?;
        info!(pet_id, "pet updated with category: {}", body);
    } else {
        warn!(pet_id, status = response.status, "pet category update failed");
    }
    Ok(())
}

pub fn add_pet_tag(ctx: &TestCtx, pet_id: i64, tag_name: &str) -> Result<()> {
    let payload = json!({
        "id": pet_id,
        "tags": [{ "id": 2, "name": tag_name }]
    });
    let response = ctx.put_json("/pet", &payload)?;
    if response.status == 200 {
        let body = response.json()?;
        info!(pet_id, "pet updated with new tag: {}", body);
    } else {
        warn!(pet_id, status = response.status, "pet tag update failed");
    }
    Ok(())
}

pub fn list_pets_by_name(ctx: &TestCtx, name: &str) -> Result<()> {
    let response = ctx.get_with_query("/pet/findByStatus", &[("status", PetStatus::Available.as_str())])?;
    if response.status != 200 {
        warn!(status = response.status, "failed to fetch pets by name");
        return Ok(());
    }

    let pets = response.json()?;
    let matching = pets_named(&pets, name)?;
    info!(pet_name = name, count = matching.len(), "pets with matching name: {:?}", matching);
    Ok(())
}

/// Pets in a `findByStatus` listing whose name equals `name`. An entry
/// without a name fails the lookup.
fn pets_named<'a>(pets: &'a Value, name: &str) -> Result<Vec<&'a Value>> {
    let pets = pets.as_array().context("expected a JSON array of pets")?;
    let mut matching = Vec::new();
    for (index, pet) in pets.iter().enumerate() {
        let pet_name = pet
            .get("name")
            .with_context(|| format!("pet entry {} has no name: {}", index, pet))?;
        if pet_name == name {
            matching.push(pet);
        }
    }
    Ok(matching)
}

pub fn create_multiple_and_validate_pets(ctx: &TestCtx) -> Result<()> {
    for pet in sample_pets() {
        let response = ctx.post_json("/pet", &pet)?;
        info!(pet_id = pet.id, status = response.status, "create pet");
        if response.status == 200 {
            match created_pet_id(&response.json()?) {
                Some(created_id) => {
                    get_pet(ctx, created_id)?;
                }
                None => warn!(pet_id = pet.id, "created pet came back without an id"),
            }
        } else {
            warn!(pet_id = pet.id, "failed to create pet");
        }
    }
    Ok(())
}

pub fn update_pet_full_details(ctx: &TestCtx, pet_id: i64) -> Result<()> {
    let pet = Pet::new(pet_id, "Updated Pet Name")
        .with_status(PetStatus::Available)
        .with_category(1, "dog")
        .with_tag(1, "friendly");
    let response = ctx.put_json("/pet", &pet)?;
    if response.status == 200 {
        let body = response.json()?;
        info!(pet_id, "updated pet data: {}", body);
    } else {
        warn!(pet_id, status = response.status, "pet update failed");
    }
    Ok(())
}

fn created_pet_id(created: &Value) -> Option<i64> {
    created.get("id").and_then(Value::as_i64)
}

fn array_len(value: &Value) -> usize {
    value.as_array().map(Vec::len).unwrap_or_default()
}
