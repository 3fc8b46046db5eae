/// File extensions the upload page offers in its pickers.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["txt", "docx", "pdf"];

/// Value for the file input `accept` attribute.
pub fn accept_attribute() -> String {
    ACCEPTED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{}", ext))
        .collect::<Vec<_>>()
        .join(",")
}

fn extension(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

pub fn is_accepted(file_name: &str) -> bool {
    extension(file_name).is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

pub fn detect_document_mime(file_name: &str) -> &'static str {
    match extension(file_name).as_deref() {
        Some("txt") => "text/plain",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("pdf") => "application/pdf",
        _ => {
            tracing::warn!(
                "Unrecognized document type for '{}', falling back to application/octet-stream",
                file_name
            );
            "application/octet-stream"
        }
    }
}
