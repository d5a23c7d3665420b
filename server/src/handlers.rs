#![allow(clippy::unused_async)]
use crate::domain::StorageError;
use crate::file_reply::FileReply;
use crate::store::FileStore;
use crate::views;
use axum::extract::{Multipart, Query, State};
use axum::response::{Html, Redirect};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use kernel::{DownloadParams, FILE_FIELD, UPLOAD_ROUTE};
use std::sync::Arc;
use std::time::Instant;
use utoipa::{OpenApi, ToSchema};

/// Multipart body accepted by the upload endpoint.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// File to store. Its original file name becomes the stored name
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

#[derive(OpenApi)]
#[openapi(
    paths(upload_form, upload, download_form, download),
    components(schemas(UploadForm, kernel::FileInfo), responses(FileReply)),
    tags((name = "files", description = "File upload and download"))
)]
pub struct ApiDoc;

/// Shows the upload form and the name of the last uploaded file, once.
#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    responses(
        (status = 200, description = "Upload form", content_type = "text/html", body = String),
    ),
)]
pub async fn upload_form(jar: CookieJar) -> (CookieJar, Html<String>) {
    let (jar, uploaded) = views::take_flash(jar);
    (jar, views::upload_form(uploaded.as_deref()))
}

/// Stores the `file` field of a multipart form under its original name.
#[utoipa::path(
    post,
    path = "/files",
    tag = "files",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 303, description = "File stored, redirects to the upload form"),
        (status = 400, description = "Missing or unsafe file name", body = String),
        (status = 413, description = "Upload exceeds the size limit", body = String),
        (status = 500, description = "File cannot be written", body = String)
    ),
)]
pub async fn upload(
    State(store): State<Arc<FileStore>>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Result<(CookieJar, Redirect), StorageError> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_owned();
        let start = Instant::now();
        let mut data = Vec::new();
        while let Some(chunk) = field.chunk().await? {
            data.extend_from_slice(&chunk);
        }
        let stored = store.store(&file_name, &data).await?;
        tracing::info!(
            "file: {} read: {} stored in: {:?}",
            stored,
            data.len(),
            start.elapsed()
        );
        return Ok((views::set_flash(jar, &stored), Redirect::to(UPLOAD_ROUTE)));
    }
    Err(StorageError::InvalidFilename(String::new()))
}

/// Shows the download form.
#[utoipa::path(
    get,
    path = "/file",
    tag = "files",
    responses(
        (status = 200, description = "Download form", content_type = "text/html", body = String),
    ),
)]
pub async fn download_form() -> Html<String> {
    views::download_form()
}

/// Streams a stored file back as an attachment with its sniffed media type.
#[utoipa::path(
    get,
    path = "/file/download",
    tag = "files",
    params(DownloadParams),
    responses(
        (status = 200, response = FileReply),
        (status = 400, description = "Unsafe file name", body = String),
        (status = 404, description = "File not found", body = String)
    ),
)]
pub async fn download(
    State(store): State<Arc<FileStore>>,
    Query(params): Query<DownloadParams>,
) -> Result<FileReply, StorageError> {
    let download = store.retrieve(&params.filename).await?;
    tracing::info!(
        "file: {} media type: {} size: {}",
        download.info.name,
        download.info.media_type,
        download.info.size
    );
    Ok(FileReply::from(download))
}

pub async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_documents_routes() {
        // Act
        let doc = ApiDoc::openapi();

        // Assert
        assert!(doc.paths.paths.contains_key("/files"));
        assert!(doc.paths.paths.contains_key("/file"));
        assert!(doc.paths.paths.contains_key("/file/download"));
    }
}
