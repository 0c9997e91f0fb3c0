use actix_multipart::{Field, Multipart};
use actix_web::{HttpResponse, ResponseError, Result, web};
use futures_util::TryStreamExt;
use serde_json::json;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::middlewares::DistributorUser;
use crate::models::*;
use crate::services::FieldVisitService;

const MAX_PHOTOS: usize = 5;
const MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;

/// Mobile clients serialize absent form values as the literal string
/// "undefined"; treat those the same as an omitted field.
fn clean(value: String) -> Option<String> {
    let value = value.trim().to_string();
    if value.is_empty() || value == "undefined" || value == "null" {
        None
    } else {
        Some(value)
    }
}

fn apply_text_field(data: &mut CreateFieldVisit, name: &str, raw: String) -> AppResult<()> {
    let Some(value) = clean(raw) else {
        return Ok(());
    };

    match name {
        "assigned_visit_id" => {
            data.assigned_visit_id = Some(value.parse().map_err(|_| {
                AppError::ValidationError("Invalid assigned visit id".to_string())
            })?);
        }
        "visit_type" => data.visit_type = Some(value.to_lowercase().parse()?),
        "name" => data.name = Some(value),
        "village" => data.village = Some(value),
        "attendees" => {
            data.attendees = Some(
                value
                    .parse()
                    .map_err(|_| AppError::ValidationError("Invalid attendees".to_string()))?,
            );
        }
        "category" => data.category = Some(value.to_lowercase().parse()?),
        "business_potential" => data.business_potential = Some(value),
        "notes" => data.notes = Some(value),
        "latitude" => {
            data.latitude = Some(
                value
                    .parse()
                    .map_err(|_| AppError::ValidationError("Invalid latitude".to_string()))?,
            );
        }
        "longitude" => {
            data.longitude = Some(
                value
                    .parse()
                    .map_err(|_| AppError::ValidationError("Invalid longitude".to_string()))?,
            );
        }
        "sale_type" => data.sale_type = Some(value.to_uppercase().parse()?),
        "product_sku" => data.product_sku = Some(value),
        "pack_size" => data.pack_size = Some(value),
        "quantity" => {
            data.quantity = Some(
                value
                    .parse()
                    .map_err(|_| AppError::ValidationError("Invalid quantity".to_string()))?,
            );
        }
        "buyer_type" => data.buyer_type = Some(value),
        "buyer_name" => data.buyer_name = Some(value),
        "repeat_order" => data.repeat_order = matches!(value.as_str(), "true" | "1"),
        "visit_outcome" => data.visit_outcome = Some(value.to_lowercase().parse()?),
        // Unknown form fields are ignored, same as extra JSON keys would be
        _ => {}
    }

    Ok(())
}

async fn read_text(field: &mut Field) -> AppResult<String> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|_| AppError::ValidationError("Malformed multipart payload".to_string()))?
    {
        bytes.extend_from_slice(&chunk);
    }
    String::from_utf8(bytes)
        .map_err(|_| AppError::ValidationError("Form fields must be UTF-8".to_string()))
}

async fn save_photo(field: &mut Field, upload_dir: &str) -> AppResult<String> {
    let is_image = field
        .content_type()
        .map(|m| m.type_() == mime::IMAGE)
        .unwrap_or(false);
    if !is_image {
        return Err(AppError::ValidationError(
            "Only image uploads are allowed".to_string(),
        ));
    }

    let extension = field
        .content_disposition()
        .get_filename()
        .and_then(|f| f.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "jpg".to_string());

    let mut bytes = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|_| AppError::ValidationError("Malformed multipart payload".to_string()))?
    {
        if bytes.len() + chunk.len() > MAX_PHOTO_BYTES {
            return Err(AppError::ValidationError("Photo too large".to_string()));
        }
        bytes.extend_from_slice(&chunk);
    }

    let filename = format!("{}.{extension}", Uuid::new_v4());
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Photo storage unavailable: {e}")))?;
    tokio::fs::write(format!("{upload_dir}/{filename}"), bytes)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store photo: {e}")))?;

    Ok(format!("/uploads/{filename}"))
}

async fn parse_submission(
    mut payload: Multipart,
    upload_dir: &str,
) -> AppResult<CreateFieldVisit> {
    let mut data = CreateFieldVisit::default();

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|_| AppError::ValidationError("Malformed multipart payload".to_string()))?
    {
        let name = field
            .content_disposition()
            .get_name()
            .unwrap_or_default()
            .to_string();

        if name == "photos" {
            if data.photo_urls.len() >= MAX_PHOTOS {
                return Err(AppError::ValidationError(format!(
                    "A maximum of {MAX_PHOTOS} photos is allowed"
                )));
            }
            let url = save_photo(&mut field, upload_dir).await?;
            data.photo_urls.push(url);
        } else {
            let value = read_text(&mut field).await?;
            apply_text_field(&mut data, &name, value)?;
        }
    }

    Ok(data)
}

#[utoipa::path(
    post,
    path = "/field-visits/create",
    tag = "field-visits",
    security(("bearer_auth" = [])),
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Field report recorded", body = FieldVisitResponse),
        (status = 400, description = "Missing visit type, bad coordinates or bad upload"),
        (status = 403, description = "Distributor access required")
    )
)]
pub async fn create_field_visit(
    user: DistributorUser,
    config: web::Data<Config>,
    field_visit_service: web::Data<FieldVisitService>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let data = match parse_submission(payload, &config.storage.upload_dir).await {
        Ok(data) => data,
        Err(e) => return Ok(e.error_response()),
    };

    match field_visit_service.create_field_visit(user.0.id, data).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn field_visit_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/field-visits").route("/create", web::post().to(create_field_visit)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_sentinel_is_skipped() {
        let mut data = CreateFieldVisit::default();
        apply_text_field(&mut data, "name", "undefined".to_string()).unwrap();
        apply_text_field(&mut data, "notes", "  ".to_string()).unwrap();
        assert_eq!(data.name, None);
        assert_eq!(data.notes, None);
    }

    #[test]
    fn test_enum_fields_are_case_normalized() {
        let mut data = CreateFieldVisit::default();
        apply_text_field(&mut data, "visit_type", "Group".to_string()).unwrap();
        apply_text_field(&mut data, "category", "FARMER".to_string()).unwrap();
        apply_text_field(&mut data, "sale_type", "b2b".to_string()).unwrap();
        assert_eq!(data.visit_type, Some(VisitType::Group));
        assert_eq!(data.category, Some(Category::Farmer));
        assert_eq!(data.sale_type, Some(SaleType::B2b));
    }

    #[test]
    fn test_bad_enum_value_is_rejected() {
        let mut data = CreateFieldVisit::default();
        let err = apply_text_field(&mut data, "visit_type", "webinar".to_string()).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn test_repeat_order_parses_boolean_forms() {
        let mut data = CreateFieldVisit::default();
        apply_text_field(&mut data, "repeat_order", "true".to_string()).unwrap();
        assert!(data.repeat_order);
        apply_text_field(&mut data, "repeat_order", "false".to_string()).unwrap();
        assert!(!data.repeat_order);
    }

    #[test]
    fn test_numeric_fields_parse() {
        let mut data = CreateFieldVisit::default();
        apply_text_field(&mut data, "latitude", "28.81".to_string()).unwrap();
        apply_text_field(&mut data, "quantity", "12".to_string()).unwrap();
        assert_eq!(data.latitude, Some(28.81));
        assert_eq!(data.quantity, Some(12));
    }
}
