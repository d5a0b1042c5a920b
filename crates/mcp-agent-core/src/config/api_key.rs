//! API key lookup and display helpers

/// Environment variables checked for the Gemini key, in order
pub const GOOGLE_API_KEY_VARS: &[&str] = &["GOOGLE_API_KEY", "GEMINI_API_KEY"];

/// Mask an API key for display, keeping a short prefix and suffix
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let len = chars.len();
    if len <= 12 {
        return "*".repeat(len);
    }

    let prefix: String = chars[..8].iter().collect();
    let suffix: String = chars[len - 4..].iter().collect();
    let mask_len = len - 12;

    format!("{}{}...{}", prefix, "*".repeat(mask_len.min(8)), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_api_key() {
        assert_eq!(mask_api_key("short"), "*****");
        assert_eq!(mask_api_key("exactly12chr"), "************");
        assert_eq!(
            mask_api_key("AIzaSyA1234567890abcdefXYZW"),
            "AIzaSyA1********...XYZW"
        );
    }

    #[test]
    fn test_mask_never_leaks_middle() {
        let key = "AIzaSy-super-secret-middle-part-0000";
        assert!(!mask_api_key(key).contains("secret"));
    }
}
