//! URL template expansion
//!
//! Templates address one work through two placeholders:
//! `{code}` (zero-padded six digits) and `{id}` (the bare integer).

use core_library::WorkId;

pub const CODE_PLACEHOLDER: &str = "{code}";
pub const ID_PLACEHOLDER: &str = "{id}";

/// Substitute the work placeholders in `template`
pub fn expand(template: &str, id: WorkId) -> String {
    template
        .replace(CODE_PLACEHOLDER, &id.code())
        .replace(ID_PLACEHOLDER, &id.get().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_code() {
        let id = WorkId::new(42).unwrap();
        assert_eq!(
            expand("https://hvdb.me/WorkImages/RJ{code}.jpg", id),
            "https://hvdb.me/WorkImages/RJ000042.jpg"
        );
    }

    #[test]
    fn test_expand_id_and_code() {
        let id = WorkId::new(123_456).unwrap();
        assert_eq!(
            expand("http://localhost/api/{id}?rj=RJ{code}", id),
            "http://localhost/api/123456?rj=RJ123456"
        );
    }

    #[test]
    fn test_template_without_placeholders_is_unchanged() {
        let id = WorkId::new(1).unwrap();
        assert_eq!(expand("http://static/cover.jpg", id), "http://static/cover.jpg");
    }
}
