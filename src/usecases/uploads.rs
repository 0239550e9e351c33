use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::entities::messages::NewAttachment;
use std::path::Path;
use uuid::Uuid;

const MAX_EXTENSION_LEN: usize = 10;

/// Writes attachment bytes to the upload directory under a randomized name,
/// keeping the original extension. The ceiling is enforced before anything
/// touches disk, so an oversized upload never leaves a partial file and the
/// caller never persists a message row for it.
pub async fn store_attachment(
    upload_dir: &Path,
    max_bytes: usize,
    original_name: &str,
    kind: Option<String>,
    data: &[u8],
) -> ServiceResult<NewAttachment> {
    if data.len() > max_bytes {
        return Err(AppError::UploadsTooLarge);
    }

    let stored_name = match safe_extension(original_name) {
        Some(ext) => format!("{}.{ext}", Uuid::new_v4()),
        None => Uuid::new_v4().to_string(),
    };
    let path = upload_dir.join(&stored_name);
    if let Err(e) = tokio::fs::create_dir_all(upload_dir).await {
        return unexpected(e);
    }
    if let Err(e) = tokio::fs::write(&path, data).await {
        return unexpected(e);
    }

    Ok(NewAttachment {
        stored_name,
        original_name: original_name.to_string(),
        path: path.to_string_lossy().into_owned(),
        kind,
    })
}

/// Reads a stored attachment back by its randomized name.
pub async fn read_attachment(upload_dir: &Path, stored_name: &str) -> ServiceResult<Vec<u8>> {
    validate_stored_name(stored_name)?;
    match tokio::fs::read(upload_dir.join(stored_name)).await {
        Ok(data) => Ok(data),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::FilesNotFound),
        Err(e) => unexpected(e),
    }
}

/// Stored names are single flat path components; anything path-like is
/// rejected before it reaches the filesystem.
pub fn validate_stored_name(stored_name: &str) -> ServiceResult<()> {
    if stored_name.is_empty()
        || stored_name.contains('/')
        || stored_name.contains('\\')
        || stored_name.contains("..")
    {
        return Err(AppError::FilesInvalidName);
    }
    Ok(())
}

fn safe_extension(original_name: &str) -> Option<&str> {
    let ext = Path::new(original_name).extension()?.to_str()?;
    if ext.len() <= MAX_EXTENSION_LEN && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(ext)
    } else {
        None
    }
}
