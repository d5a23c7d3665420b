use axum::{
    body::Body,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use kernel::FileInfo;
use tokio_util::io::ReaderStream;
use utoipa::{
    openapi::{self, content, schema::Type, KnownFormat, ObjectBuilder, RefOr, ResponseBuilder, SchemaFormat},
    ToResponse,
};

use crate::store::Download;

pub struct FileReply {
    body: Body,
    info: FileInfo,
}

impl FileReply {
    #[must_use]
    pub fn new(body: Body, info: FileInfo) -> Self {
        Self { body, info }
    }
}

impl From<Download> for FileReply {
    fn from(download: Download) -> Self {
        let body = Body::from_stream(ReaderStream::new(download.file));
        Self::new(body, download.info)
    }
}

impl IntoResponse for FileReply {
    fn into_response(self) -> Response {
        let attachment = content_disposition(&self.info.name);
        let mut res = self.body.into_response();
        let headers = res.headers_mut();
        let content_type = HeaderValue::from_str(&self.info.media_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
        headers.insert(header::CONTENT_TYPE, content_type);
        if let Ok(val) = HeaderValue::from_str(attachment.as_str()) {
            headers.insert(header::CONTENT_DISPOSITION, val);
        }
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(self.info.size));

        res
    }
}

/// Builds an `attachment` disposition. Non-ASCII names get an RFC 5987
/// `filename*` next to an ASCII fallback.
fn content_disposition(name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();
    if name.is_ascii() && fallback == name {
        format!(r#"attachment; filename="{fallback}""#)
    } else {
        let encoded = urlencoding::encode(name);
        format!(r#"attachment; filename="{fallback}"; filename*=UTF-8''{encoded}"#)
    }
}

impl<'r> ToResponse<'r> for FileReply {
    fn response() -> (&'r str, RefOr<openapi::Response>) {
        let object = ObjectBuilder::new()
            .schema_type(Type::String)
            .format(Some(SchemaFormat::KnownFormat(KnownFormat::Binary)))
            .build();
        let content = content::ContentBuilder::new().schema(Some(object)).build();
        (
            "FileReply",
            ResponseBuilder::new()
                .description("File binary content with the sniffed media type")
                .content("application/octet-stream", content)
                .build()
                .into(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use rstest::rstest;

    #[rstest]
    #[case("file.ext", r#"attachment; filename="file.ext""#)]
    #[case("with space.txt", r#"attachment; filename="with space.txt""#)]
    #[case(
        r#"say"hi".txt"#,
        r#"attachment; filename="say_hi_.txt"; filename*=UTF-8''say%22hi%22.txt"#
    )]
    #[case(
        "파일.txt",
        r#"attachment; filename="__.txt"; filename*=UTF-8''%ED%8C%8C%EC%9D%BC.txt"#
    )]
    #[trace]
    fn content_disposition_tests(#[case] name: &str, #[case] expected: &str) {
        // Act
        let value = content_disposition(name);

        // Assert
        assert_eq!(value, expected);
    }

    #[tokio::test]
    async fn into_response_sets_file_headers() {
        // Arrange
        let info = FileInfo {
            name: "test.txt".to_owned(),
            media_type: "text/plain".to_owned(),
            size: 10,
        };
        let reply = FileReply::new(Body::from("hello file"), info);

        // Act
        let res = reply.into_response();

        // Assert
        let headers = res.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            r#"attachment; filename="test.txt""#
        );
        assert_eq!(headers[header::CONTENT_LENGTH], "10");
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"hello file");
    }
}
