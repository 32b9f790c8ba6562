use axum::extract::Multipart;
use uuid::Uuid;

use crate::{error::ServiceError, services::images::UploadedImage};

/// Fields shared by the category and section multipart forms. Every field is
/// optional here; create handlers check what they require.
#[derive(Debug, Default)]
pub struct MenuForm {
    pub name: Option<String>,
    /// `Some("")` clears the stored description on update.
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub order: Option<i32>,
    pub category_id: Option<Uuid>,
    pub image: Option<UploadedImage>,
}

impl MenuForm {
    pub async fn parse(mut multipart: Multipart) -> Result<Self, ServiceError> {
        let mut form = MenuForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ServiceError::validation(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();
            if name == "image" {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ServiceError::validation(e.to_string()))?;
                if !data.is_empty() {
                    form.image = Some(UploadedImage { filename, content_type, data });
                }
                continue;
            }

            let text = field
                .text()
                .await
                .map_err(|e| ServiceError::validation(e.to_string()))?;
            form.set_text(&name, text)?;
        }

        Ok(form)
    }

    fn set_text(&mut self, name: &str, value: String) -> Result<(), ServiceError> {
        match name {
            "name" => self.name = Some(value),
            "description" => self.description = Some(value),
            "enabled" => self.enabled = Some(parse_bool(&value)?),
            "order" => {
                self.order = Some(
                    value
                        .trim()
                        .parse()
                        .map_err(|_| ServiceError::validation("order must be an integer"))?,
                )
            }
            "categoryId" => {
                self.category_id = Some(
                    value
                        .trim()
                        .parse()
                        .map_err(|_| ServiceError::validation("categoryId must be a UUID"))?,
                )
            }
            _ => {}
        }
        Ok(())
    }
}

pub fn parse_bool(value: &str) -> Result<bool, ServiceError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" => Ok(true),
        "false" | "0" | "off" => Ok(false),
        other => Err(ServiceError::validation(format!("invalid boolean: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booleans_from_form_values() {
        assert!(parse_bool("true").unwrap());
        assert!(parse_bool(" TRUE ").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn text_fields_are_typed() {
        let mut form = MenuForm::default();
        form.set_text("name", "Shisha".into()).unwrap();
        form.set_text("order", " 3 ".into()).unwrap();
        form.set_text("enabled", "false".into()).unwrap();
        form.set_text("unknown", "ignored".into()).unwrap();
        assert_eq!(form.name.as_deref(), Some("Shisha"));
        assert_eq!(form.order, Some(3));
        assert_eq!(form.enabled, Some(false));

        form.set_text("description", "".into()).unwrap();
        assert_eq!(form.description.as_deref(), Some(""));

        assert!(form.set_text("categoryId", "nope".into()).is_err());
        assert!(form.set_text("order", "first".into()).is_err());
    }
}
