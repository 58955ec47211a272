use bytes::Bytes;

use crate::error::AppError;

/// What we know how to turn into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    /// Decides from the declared content type, falling back to the file
    /// extension when the client sent `application/octet-stream` or nothing.
    pub fn detect(content_type: Option<&str>, file_name: &str) -> Option<Self> {
        match content_type.map(essence).as_deref() {
            Some("application/pdf") => Some(Self::Pdf),
            Some("text/plain") | Some("text/markdown") | Some("text/x-markdown") => {
                Some(Self::PlainText)
            }
            None | Some("") | Some("application/octet-stream") => Self::from_extension(file_name),
            Some(_) => None,
        }
    }

    fn from_extension(file_name: &str) -> Option<Self> {
        let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" | "md" | "markdown" => Some(Self::PlainText),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::PlainText => "text/plain",
        }
    }

    /// Content type recorded for the document: the declared one when it was
    /// specific, otherwise the type implied by the extension.
    pub fn stored_mime(self, content_type: Option<&str>) -> String {
        match content_type.map(essence) {
            Some(mime) if !mime.is_empty() && mime != "application/octet-stream" => mime,
            _ => self.mime().to_string(),
        }
    }
}

fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase()
}

/// Pulls the text out of one uploaded file. NUL characters are dropped since
/// Postgres `TEXT` cannot hold them; blank results count as failures.
pub async fn extract_text(
    file_name: &str,
    kind: DocumentKind,
    data: Bytes,
) -> Result<String, AppError> {
    let failed = || AppError::Extraction(format!("Could not extract text from {file_name}."));

    let text = match kind {
        DocumentKind::PlainText => String::from_utf8(data.to_vec()).map_err(|_| failed())?,
        DocumentKind::Pdf => {
            // CPU bound; a panic in the parser surfaces as a JoinError.
            let joined =
                tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
                    .await;
            match joined {
                Ok(Ok(text)) => text,
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, file_name, "pdf extraction failed");
                    return Err(failed());
                }
                Err(e) => {
                    tracing::warn!(error = %e, file_name, "pdf extraction panicked");
                    return Err(failed());
                }
            }
        }
    };

    let text = if text.contains('\0') {
        text.replace('\0', "")
    } else {
        text
    };
    if text.trim().is_empty() {
        return Err(failed());
    }
    Ok(text)
}
