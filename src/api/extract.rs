//! # 请求体提取器
//!
//! 物品的创建与修改同时接受 `multipart/form-data`（图片字段名 `image`）
//! 与 `application/json` 两种请求体。

use axum::{
    Json,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use serde::Deserialize;

use crate::error::RegistryError;
use crate::uploads::UploadedImage;

/// 物品文本字段，缺省或空白由服务层判断
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
}

impl ItemFields {
    fn set(&mut self, name: &str, value: String) {
        match name {
            "title" => self.title = Some(value),
            "description" => self.description = Some(value),
            "category" => self.category = Some(value),
            "location" => self.location = Some(value),
            "status" => self.status = Some(value),
            _ => {}
        }
    }
}

/// 物品表单：文本字段加可选图片
#[derive(Debug, Default)]
pub struct ItemForm {
    pub fields: ItemFields,
    pub image: Option<UploadedImage>,
}

impl<S> FromRequest<S> for ItemForm
where
    S: Send + Sync,
{
    type Rejection = RegistryError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if !is_multipart {
            let Json(fields) = Json::<ItemFields>::from_request(req, state)
                .await
                .map_err(|rejection| RegistryError::validation(rejection.body_text()))?;
            return Ok(Self {
                fields,
                image: None,
            });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| RegistryError::validation(rejection.body_text()))?;

        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == "image" {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    form.image = Some(UploadedImage {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
            } else {
                let value = field.text().await?;
                form.fields.set(&name, value);
            }
        }

        Ok(form)
    }
}
