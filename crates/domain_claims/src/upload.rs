//! Uploaded image parts: acceptance rules and object key naming

use bytes::Bytes;

use crate::error::ClaimError;

/// Form keys carrying claim images start with this prefix (`images[0]`, ...)
pub const IMAGE_FIELD_PREFIX: &str = "images";

/// Extensions accepted for claim images, lowercase
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Declared content types accepted for claim images
pub const ALLOWED_CONTENT_TYPES: [&str; 2] = ["image/png", "image/jpeg"];

/// One file part of a multipart submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Form key the part was sent under
    pub field: String,
    /// Client-supplied filename, possibly empty
    pub filename: String,
    /// Declared content type, if the client sent one
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(
        field: impl Into<String>,
        filename: impl Into<String>,
        content_type: Option<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            field: field.into(),
            filename: filename.into(),
            content_type,
            bytes: bytes.into(),
        }
    }

    /// Lowercased extension after the last `.` of the object key
    pub fn extension(&self) -> Option<String> {
        self.object_key()
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
    }

    /// Content type without parameters, lowercased
    pub fn mime_essence(&self) -> Option<String> {
        self.content_type.as_deref().map(|ct| {
            ct.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
    }

    /// Sanitized filename the object key is built from
    pub fn object_key(&self) -> String {
        sanitize_filename(&self.filename)
    }

    fn is_image_part(&self) -> bool {
        self.field.starts_with(IMAGE_FIELD_PREFIX)
    }
}

/// Returns true when both the extension and the declared type are allowed
pub fn allowed_file(file: &UploadedFile) -> bool {
    let has_allowed_extension = file
        .extension()
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()));

    let has_allowed_content_type = file
        .mime_essence()
        .is_some_and(|ct| ALLOWED_CONTENT_TYPES.contains(&ct.as_str()));

    has_allowed_extension && has_allowed_content_type
}

/// Picks the image parts out of a submission and checks each one
///
/// Parts under other keys are dropped. The accepted parts keep their
/// submission order.
///
/// # Errors
///
/// * `NoFilePart` - no key starts with `images`
/// * `NoSelectedFile` - an image part has an empty filename
/// * `FileTypeNotAllowed` - wrong extension, wrong content type, or a name
///   with nothing usable left after sanitizing
pub fn validate_files(files: Vec<UploadedFile>) -> Result<Vec<UploadedFile>, ClaimError> {
    let images: Vec<UploadedFile> = files.into_iter().filter(UploadedFile::is_image_part).collect();

    if images.is_empty() {
        return Err(ClaimError::NoFilePart);
    }

    for file in &images {
        if file.filename.is_empty() {
            return Err(ClaimError::NoSelectedFile);
        }
        if !allowed_file(file) || file.object_key().is_empty() {
            return Err(ClaimError::FileTypeNotAllowed);
        }
    }

    Ok(images)
}

/// Turns a client filename into a safe, flat object key
///
/// Path separators become spaces, whitespace runs become `_`, anything
/// outside `[A-Za-z0-9_.-]` is dropped, and leading/trailing `.`/`_` are
/// stripped so the key can never climb out of the bucket prefix.
pub fn sanitize_filename(name: &str) -> String {
    let spaced: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(field: &str, filename: &str, content_type: &str) -> UploadedFile {
        UploadedFile::new(field, filename, Some(content_type.to_string()), &b"data"[..])
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("My cool movie.mov"), "My_cool_movie.mov");
        assert_eq!(sanitize_filename("../../../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_filename("i contain cool \u{fc}ml\u{e4}uts.txt"), "i_contain_cool_mluts.txt");
        assert_eq!(sanitize_filename("..\\evil.png"), "evil.png");
        assert_eq!(sanitize_filename("photo.JPG"), "photo.JPG");
    }

    #[test]
    fn test_allowed_file_is_case_insensitive() {
        assert!(allowed_file(&part("images[0]", "CRASH.JPEG", "image/jpeg")));
        assert!(allowed_file(&part("images[0]", "dent.png", "IMAGE/PNG; charset=binary")));
    }

    #[test]
    fn test_allowed_file_needs_both_checks() {
        assert!(!allowed_file(&part("images[0]", "clip.mp4", "image/jpeg")));
        assert!(!allowed_file(&part("images[0]", "photo.jpg", "video/mp4")));
        assert!(!allowed_file(&part("images[0]", "photo", "image/jpeg")));
        assert!(!allowed_file(&UploadedFile::new("images[0]", "photo.jpg", None, &b""[..])));
    }

    #[test]
    fn test_extension_is_read_from_the_sanitized_name() {
        assert_eq!(part("images[0]", "../.jpg", "image/jpeg").extension(), None);
        assert_eq!(part("images[0]", "dir/shot.PNG", "image/png").extension(), Some("png".to_string()));

        let result = validate_files(vec![part("images[0]", "../.jpg", "image/jpeg")]);
        assert!(matches!(result, Err(ClaimError::FileTypeNotAllowed)));
    }

    #[test]
    fn test_validate_files_keeps_image_parts_in_order() {
        let files = vec![
            part("images[0]", "a.jpg", "image/jpeg"),
            part("attachment", "notes.txt", "text/plain"),
            part("images[1]", "b.png", "image/png"),
        ];

        let accepted = validate_files(files).unwrap();
        let names: Vec<_> = accepted.iter().map(|f| f.filename.as_str()).collect();

        assert_eq!(names, vec!["a.jpg", "b.png"]);
    }
}
