extern crate url;

use self::url::Url;
use core::fmt;

const SEP: char = '/';

/// Server URL that grows path segments relative to whatever base path the
/// service is mounted under.
#[derive(Clone)]
pub struct Resource {
    url: Url,
}

impl Resource {
    #[must_use]
    pub fn new(uri: &str) -> Option<Resource> {
        let url = Url::parse(uri).ok()?;
        if url.cannot_be_a_base() {
            return None;
        }
        Some(Resource { url })
    }

    /// Appends `path` keeping a trailing separator only when `path` has one.
    pub fn append_path(&mut self, path: &str) -> &mut Self {
        let segments: Vec<&str> = self
            .url
            .path()
            .split(SEP)
            .chain(path.split(SEP))
            .filter(|s| !s.is_empty())
            .collect();

        let mut joined = String::from(SEP);
        joined.push_str(&segments.join("/"));
        if path.ends_with(SEP) && !segments.is_empty() {
            joined.push(SEP);
        }
        self.url.set_path(&joined);
        self
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://localhost", true)]
    #[case("http://localhost:5000/", true)]
    #[case("http/localhost", false)]
    #[case("mailto:someone@localhost", false)]
    #[trace]
    fn new_tests(#[case] uri: &str, #[case] valid: bool) {
        // Act
        let r = Resource::new(uri);

        // Assert
        assert_eq!(r.is_some(), valid);
    }

    #[rstest]
    #[case("http://localhost", "/files", "http://localhost/files")]
    #[case("http://localhost/", "files", "http://localhost/files")]
    #[case("http://localhost:5000", "/file/download", "http://localhost:5000/file/download")]
    #[case("http://localhost/store", "/files", "http://localhost/store/files")]
    #[case("http://localhost/store/", "/files", "http://localhost/store/files")]
    #[case("http://localhost/store", "files/", "http://localhost/store/files/")]
    #[case("http://localhost", "/", "http://localhost/")]
    #[trace]
    fn append_path_tests(#[case] base: &str, #[case] path: &str, #[case] expected: &str) {
        // Arrange
        let mut r = Resource::new(base).unwrap();

        // Act
        r.append_path(path);

        // Assert
        assert_eq!(r.to_string().as_str(), expected);
    }

    #[test]
    fn append_path_twice() {
        // Arrange
        let mut r = Resource::new("http://localhost").unwrap();

        // Act
        r.append_path("file").append_path("download");

        // Assert
        assert_eq!(r.to_string().as_str(), "http://localhost/file/download");
    }
}
