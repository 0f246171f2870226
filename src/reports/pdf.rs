use tracing::warn;

/// Best-effort text recovery from PDF bytes, concatenated in page order.
///
/// Returns an empty string on any parse failure. Callers must treat empty
/// output as "extraction failed" and branch on it; this layer never errors.
pub fn extract_text(pdf_bytes: &[u8]) -> String {
    match pdf_extract::extract_text_from_mem(pdf_bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "pdf text extraction failed");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_yield_empty_string() {
        assert_eq!(extract_text(b"this is not a pdf"), "");
    }

    #[test]
    fn empty_input_yields_empty_string() {
        assert_eq!(extract_text(&[]), "");
    }
}
