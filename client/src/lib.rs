use std::path::Path;

use comfy_table::{presets::UTF8_HORIZONTAL_ONLY, Attribute, Cell, ContentArrangement, Table};
use futures::TryStreamExt;
use kernel::{DownloadParams, FileInfo, DOWNLOAD_ROUTE, FILE_FIELD, UPLOAD_ROUTE};
use reqwest::{header, redirect, Client, StatusCode};
use resource::Resource;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{self, BufWriter};
use tokio::io::AsyncWriteExt;
use tokio_util::io::{ReaderStream, StreamReader};

pub mod resource;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid server URI: '{0}'")]
    InvalidUri(String),

    #[error("Invalid file path: '{0}'")]
    InvalidPath(String),

    #[error("File not found on server: '{0}'")]
    NotFound(String),

    #[error("Server replied {status}: {message}")]
    Server { status: StatusCode, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Uploads a local file. The server stores it under the file's own name,
/// which is returned on success.
pub async fn upload_file(uri: &str, file: &Path) -> Result<String, ClientError> {
    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ClientError::InvalidPath(file.display().to_string()))?
        .to_owned();

    let mut resource = base_resource(uri)?;
    resource.append_path(UPLOAD_ROUTE);

    let f = File::open(file).await?;
    let meta = f.metadata().await?;
    let stream = reqwest::Body::wrap_stream(ReaderStream::new(f));
    let part = reqwest::multipart::Part::stream_with_length(stream, meta.len())
        .file_name(file_name.clone());
    let form = reqwest::multipart::Form::new()
        .percent_encode_noop()
        .part(FILE_FIELD, part);

    // The upload answers with a redirect to the form page, nothing to follow
    let client = Client::builder().redirect(redirect::Policy::none()).build()?;
    let response = client
        .post(resource.to_string())
        .multipart(form)
        .send()
        .await?;

    if response.status().is_redirection() {
        Ok(file_name)
    } else {
        Err(server_error(response).await)
    }
}

/// Downloads `name` into `target` and describes what was received.
pub async fn download_file(uri: &str, name: &str, target: &Path) -> Result<FileInfo, ClientError> {
    let mut resource = base_resource(uri)?;
    resource.append_path(DOWNLOAD_ROUTE);

    let params = DownloadParams {
        filename: name.to_owned(),
    };
    let response = Client::new()
        .get(resource.to_string())
        .query(&params)
        .send()
        .await?;

    match response.status() {
        StatusCode::OK => {}
        StatusCode::NOT_FOUND => return Err(ClientError::NotFound(name.to_owned())),
        _ => return Err(server_error(response).await),
    }

    let media_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_owned();

    let body = response.bytes_stream().map_err(io::Error::other);
    let body_reader = StreamReader::new(body);
    futures::pin_mut!(body_reader);

    let f = File::create(target).await?;
    let mut writer = BufWriter::new(f);
    let size = io::copy(&mut body_reader, &mut writer).await?;
    writer.flush().await?;

    Ok(FileInfo {
        name: name.to_owned(),
        media_type,
        size,
    })
}

pub fn print_file_info(info: &FileInfo) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_HORIZONTAL_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120)
        .set_header(vec![
            Cell::new("File").add_attribute(Attribute::Bold),
            Cell::new("Media type").add_attribute(Attribute::Bold),
            Cell::new("Size").add_attribute(Attribute::Bold),
        ]);
    table.add_row(vec![
        Cell::new(&info.name),
        Cell::new(&info.media_type),
        Cell::new(info.size),
    ]);
    println!("{table}");
}

fn base_resource(uri: &str) -> Result<Resource, ClientError> {
    Resource::new(uri).ok_or_else(|| ClientError::InvalidUri(uri.to_owned()))
}

async fn server_error(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let message = response.text().await.unwrap_or_default();
    ClientError::Server { status, message }
}
