use std::fmt::Write;

use axum::response::Html;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use kernel::{DOWNLOAD_ROUTE, FILE_FIELD, UPLOAD_ROUTE};

const FLASH_COOKIE: &str = "fstore_flash";

/// Remembers the stored file name until the upload form is shown next time.
#[must_use]
pub fn set_flash(jar: CookieJar, file_name: &str) -> CookieJar {
    let value = urlencoding::encode(file_name).into_owned();
    jar.add(flash_cookie(value))
}

/// Takes the flash value out of the jar. It is shown once only.
#[must_use]
pub fn take_flash(jar: CookieJar) -> (CookieJar, Option<String>) {
    let Some(value) = jar
        .get(FLASH_COOKIE)
        .map(|c| urlencoding::decode(c.value()).map(|v| v.into_owned()))
    else {
        return (jar, None);
    };
    let jar = jar.remove(flash_cookie(String::new()));
    (jar, value.ok())
}

fn flash_cookie(value: String) -> Cookie<'static> {
    Cookie::build((FLASH_COOKIE, value))
        .path(UPLOAD_ROUTE)
        .http_only(true)
        .build()
}

#[must_use]
pub fn upload_form(uploaded: Option<&str>) -> Html<String> {
    let mut page = String::from("<!DOCTYPE html>\n<html>\n<head><title>File upload</title></head>\n<body>\n");
    if let Some(name) = uploaded {
        let _ = writeln!(page, "<p>Uploaded file: {}</p>", escape(name));
    }
    let _ = write!(
        page,
        r#"<form method="post" action="{UPLOAD_ROUTE}" enctype="multipart/form-data">
<input type="file" name="{FILE_FIELD}">
<button type="submit">Upload</button>
</form>
</body>
</html>
"#
    );
    Html(page)
}

#[must_use]
pub fn download_form() -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>File download</title></head>
<body>
<form method="get" action="{DOWNLOAD_ROUTE}">
<input type="text" name="filename">
<button type="submit">Download</button>
</form>
</body>
</html>
"#
    ))
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("test.txt", "test.txt")]
    #[case("<script>.txt", "&lt;script&gt;.txt")]
    #[case(r#"a&b"c'.txt"#, "a&amp;b&quot;c&#39;.txt")]
    #[trace]
    fn escape_tests(#[case] raw: &str, #[case] expected: &str) {
        // Act
        let escaped = escape(raw);

        // Assert
        assert_eq!(escaped, expected);
    }

    #[test]
    fn upload_form_shows_flash() {
        // Act
        let Html(page) = upload_form(Some("<b>.txt"));

        // Assert
        assert!(page.contains("Uploaded file: &lt;b&gt;.txt"));
        assert!(page.contains(r#"name="file""#));
    }

    #[test]
    fn upload_form_without_flash() {
        // Act
        let Html(page) = upload_form(None);

        // Assert
        assert!(!page.contains("Uploaded file"));
    }

    #[test]
    fn flash_is_taken_once() {
        // Arrange
        let jar = set_flash(CookieJar::new(), "파일 1.txt");

        // Act
        let (jar, first) = take_flash(jar);
        let (_, second) = take_flash(jar);

        // Assert
        assert_eq!(first.as_deref(), Some("파일 1.txt"));
        assert_eq!(second, None);
    }
}
