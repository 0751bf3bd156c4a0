//! Content-Type guessing by file extension.

use std::path::Path;

/// Fallback for unknown or missing extensions.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Guess a MIME type from the extension of `path`.
pub fn guess_content_type(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return DEFAULT_CONTENT_TYPE;
    };
    match ext.to_lowercase().as_str() {
        "txt" | "text" | "md" | "markdown" | "log" | "org" | "diary" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "js" => "text/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "rtf" => "application/rtf",
        "odt" => "application/vnd.oasis.opendocument.text",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "epub" => "application/epub+zip",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "mp3" => "audio/mpeg",
        "wav" => "audio/x-wav",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_types() {
        assert_eq!(guess_content_type(Path::new("parcel.txt")), "text/plain");
        assert_eq!(guess_content_type(Path::new("draft.MD")), "text/plain");
        assert_eq!(guess_content_type(Path::new("index.htm")), "text/html");
    }

    #[test]
    fn binary_types() {
        assert_eq!(guess_content_type(Path::new("a/b/c.pdf")), "application/pdf");
        assert_eq!(guess_content_type(Path::new("shot.JPEG")), "image/jpeg");
    }

    #[test]
    fn unknown_falls_back() {
        assert_eq!(guess_content_type(Path::new("noext")), DEFAULT_CONTENT_TYPE);
        assert_eq!(guess_content_type(Path::new("x.wordgrinder")), DEFAULT_CONTENT_TYPE);
        assert_eq!(guess_content_type(Path::new(".bashrc")), DEFAULT_CONTENT_TYPE);
    }
}
