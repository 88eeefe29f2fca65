use crate::consultation::errors::FieldError;

pub const BRIEF_FIELD: &str = "project-brief";
pub const MAX_BRIEF_BYTES: u64 = 10 * 1024 * 1024;

const ALLOWED_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Metadata of an uploaded project brief. The file itself never leaves the page.
#[derive(Clone, Debug, PartialEq)]
pub struct BriefAttachment {
    pub name: String,
    pub size: u64,
    pub mime: String,
}

impl BriefAttachment {
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.size > MAX_BRIEF_BYTES {
            return Err(FieldError::new(BRIEF_FIELD, "File size must be less than 10MB"));
        }
        if !ALLOWED_TYPES.contains(&self.mime.as_str()) {
            return Err(FieldError::new(BRIEF_FIELD, "Only PDF, DOC, and DOCX files are allowed"));
        }
        Ok(())
    }

    pub fn size_label(&self) -> String {
        format!("Size: {}", format_file_size(self.size))
    }
}

pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let mut exponent = 0;
    let mut unit = 1u64;
    while exponent < UNITS.len() - 1 && bytes >= unit * 1024 {
        unit *= 1024;
        exponent += 1;
    }
    let scaled = bytes as f64 / unit as f64;
    // Two decimals, trailing zeros trimmed
    let rounded = (scaled * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[exponent])
}
