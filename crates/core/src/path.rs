use crate::error::CoreError;

/// POSIX-style decomposition of a slash-separated path.
///
/// - `dirname` is `.` when the path has no separator and `/` for a
///   root-level absolute path.
/// - `basename` is the last component; trailing slashes are ignored.
/// - `extension` is the text after the last `.` of the basename. A basename
///   whose only dot is its first character (`.env`) has no extension.
/// - `filename` is the basename without `.extension`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathInfo<'a> {
    pub dirname: &'a str,
    pub basename: &'a str,
    pub filename: &'a str,
    pub extension: Option<&'a str>,
}

impl<'a> PathInfo<'a> {
    pub fn parse(path: &'a str) -> Self {
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            return Self {
                dirname: if path.starts_with('/') { "/" } else { "." },
                basename: "",
                filename: "",
                extension: None,
            };
        }

        let (dirname, basename) = match trimmed.rfind('/') {
            Some(idx) => {
                let dir = trimmed[..idx].trim_end_matches('/');
                (if dir.is_empty() { "/" } else { dir }, &trimmed[idx + 1..])
            }
            None => (".", trimmed),
        };

        let (filename, extension) = match basename.rfind('.') {
            Some(0) | None => (basename, None),
            Some(idx) => (&basename[..idx], Some(&basename[idx + 1..])),
        };

        Self {
            dirname,
            basename,
            filename,
            extension,
        }
    }

    /// Whether the path has a directory component.
    pub fn has_directory(&self) -> bool {
        self.dirname != "."
    }
}

/// Normalize a caller-supplied path into the canonical relative form.
///
/// Backslashes become `/`, empty and `.` segments are dropped, `..` removes
/// the preceding segment, and leading/trailing slashes disappear. The result
/// may be empty (the storage root).
pub fn normalize(path: &str) -> Result<String, CoreError> {
    if let Some(c) = path.chars().find(|c| c.is_control()) {
        return Err(CoreError::InvalidPath {
            path: path.to_owned(),
            reason: format!("control character {c:?}"),
        });
    }

    let unified = path.replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(CoreError::PathTraversal(path.to_owned()));
                }
            }
            other => segments.push(other),
        }
    }
    Ok(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_nested_path() {
        let info = PathInfo::parse("docs/2024/report.pdf");
        assert_eq!(info.dirname, "docs/2024");
        assert_eq!(info.basename, "report.pdf");
        assert_eq!(info.filename, "report");
        assert_eq!(info.extension, Some("pdf"));
        assert!(info.has_directory());
    }

    #[test]
    fn parse_bare_filename() {
        let info = PathInfo::parse("avatar.png");
        assert_eq!(info.dirname, ".");
        assert_eq!(info.basename, "avatar.png");
        assert_eq!(info.filename, "avatar");
        assert!(!info.has_directory());
    }

    #[test]
    fn parse_multiple_dots_splits_on_last() {
        let info = PathInfo::parse("backups/db.tar.gz");
        assert_eq!(info.filename, "db.tar");
        assert_eq!(info.extension, Some("gz"));
    }

    #[test]
    fn parse_without_extension() {
        let info = PathInfo::parse("dir/README");
        assert_eq!(info.filename, "README");
        assert_eq!(info.extension, None);
    }

    #[test]
    fn parse_dotfile_has_no_extension() {
        let info = PathInfo::parse("config/.env");
        assert_eq!(info.filename, ".env");
        assert_eq!(info.extension, None);
    }

    #[test]
    fn parse_root_and_trailing_slashes() {
        let info = PathInfo::parse("/logo.svg");
        assert_eq!(info.dirname, "/");
        assert_eq!(info.basename, "logo.svg");

        let info = PathInfo::parse("a/b/");
        assert_eq!(info.dirname, "a");
        assert_eq!(info.basename, "b");

        let info = PathInfo::parse("");
        assert_eq!(info.dirname, ".");
        assert_eq!(info.basename, "");
    }

    #[test]
    fn normalize_cleans_segments() {
        assert_eq!(normalize("/a//b/./c.png/").unwrap(), "a/b/c.png");
        assert_eq!(normalize("a\\b\\c.png").unwrap(), "a/b/c.png");
        assert_eq!(normalize("a/b/../c.png").unwrap(), "a/c.png");
        assert_eq!(normalize("").unwrap(), "");
        assert_eq!(normalize("/").unwrap(), "");
    }

    #[test]
    fn normalize_rejects_traversal() {
        let err = normalize("a/../../etc/passwd").unwrap_err();
        assert!(matches!(err, CoreError::PathTraversal(_)));
    }

    #[test]
    fn normalize_rejects_control_characters() {
        let err = normalize("a/\u{7}bell.png").unwrap_err();
        assert!(matches!(err, CoreError::InvalidPath { .. }));
    }
}
