//! # 图片上传存储
//!
//! 上传的图片以生成的文件名写入 `uploads.dir`，对外以 `<public_path>/<file>` 引用。

use std::path::{Path, PathBuf};

use axum::body::Bytes;
use chrono::Utc;

use crate::config::UploadConfig;
use crate::error::{Context, RegistryError, Result};
use crate::{linfo, lwarn, logging::{LogComponent, LogStage}};

/// 接受的图片类型及其扩展名
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

/// 请求中携带的图片文件
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// 客户端文件名
    pub file_name: Option<String>,
    /// 声明的 MIME 类型
    pub content_type: Option<String>,
    /// 文件内容
    pub bytes: Bytes,
}

impl UploadedImage {
    /// 根据 MIME 类型或文件扩展名确定保存时的扩展名
    fn extension(&self) -> Option<&'static str> {
        if let Some(content_type) = self.content_type.as_deref() {
            if let Some((_, ext)) = IMAGE_TYPES.iter().find(|(mime, _)| *mime == content_type) {
                return Some(ext);
            }
        }

        let ext = Path::new(self.file_name.as_deref()?)
            .extension()?
            .to_str()?
            .to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some("jpg"),
            "png" => Some("png"),
            "gif" => Some("gif"),
            "webp" => Some("webp"),
            _ => None,
        }
    }
}

/// 本地磁盘上的图片存储
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    public_path: String,
    max_file_size: usize,
}

impl UploadStore {
    /// 根据配置创建
    #[must_use]
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            dir: PathBuf::from(&config.dir),
            public_path: config.public_path.trim_end_matches('/').to_string(),
            max_file_size: config.max_file_size,
        }
    }

    /// 保存图片并返回对外访问路径
    pub async fn save(&self, image: &UploadedImage) -> Result<String> {
        if image.bytes.len() > self.max_file_size {
            return Err(RegistryError::validation_field(
                format!("Image exceeds the {} byte limit", self.max_file_size),
                "image",
            ));
        }

        let ext = image.extension().ok_or_else(|| {
            RegistryError::validation_field(
                "Only JPEG, PNG, GIF or WebP images are allowed",
                "image",
            )
        })?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .context("Failed to save image")?;

        let file_name = format!(
            "{}-{}.{ext}",
            Utc::now().timestamp_millis(),
            uuid::Uuid::new_v4().simple()
        );
        tokio::fs::write(self.dir.join(&file_name), &image.bytes)
            .await
            .context("Failed to save image")?;

        linfo!(
            "system",
            LogStage::BusinessLogic,
            LogComponent::Uploads,
            "image_saved",
            &format!("图片已保存: {file_name} ({} bytes)", image.bytes.len())
        );

        Ok(format!("{}/{file_name}", self.public_path))
    }

    /// 删除由本存储生成的图片
    ///
    /// 外部 URL 或找不到的文件直接忽略，删除失败只记日志。
    pub async fn remove(&self, image_url: &str) {
        let Some(file_name) = self.local_file_name(image_url) else {
            return;
        };

        if let Err(err) = tokio::fs::remove_file(self.dir.join(file_name)).await {
            if err.kind() != std::io::ErrorKind::NotFound {
                lwarn!(
                    "system",
                    LogStage::BusinessLogic,
                    LogComponent::Uploads,
                    "image_remove_fail",
                    &format!("删除图片失败: {image_url}"),
                    error = err
                );
            }
        }
    }

    /// 从访问路径中取出本地文件名，拒绝任何目录穿越
    fn local_file_name<'a>(&self, image_url: &'a str) -> Option<&'a str> {
        let file_name = image_url
            .strip_prefix(self.public_path.as_str())?
            .strip_prefix('/')?;
        let valid = !file_name.is_empty()
            && !file_name.contains(['/', '\\'])
            && !file_name.starts_with('.');
        valid.then_some(file_name)
    }
}
