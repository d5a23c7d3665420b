#![warn(clippy::unwrap_in_result)]
#![warn(clippy::unwrap_used)]

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Name of the multipart form field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

/// Route serving the upload form and accepting uploads.
pub const UPLOAD_ROUTE: &str = "/files";

/// Route serving the download form.
pub const DOWNLOAD_FORM_ROUTE: &str = "/file";

/// Route streaming a stored file back.
pub const DOWNLOAD_ROUTE: &str = "/file/download";

/// Represents a file stored in the upload directory.
///
/// The file name is the only identity a stored file has; the media type is
/// detected from the file content on every download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FileInfo {
    /// File name inside the storage directory
    pub name: String,
    /// Media type sniffed from the file content
    pub media_type: String,
    /// Size of the file in bytes
    pub size: u64,
}

/// Query string of the download endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DownloadParams {
    /// Name of a previously uploaded file
    pub filename: String,
}
