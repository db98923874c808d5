/// Extract a clean error message from wrapped error strings
///
/// Drops technical prefixes such as:
/// "error returned from database: 1062 (23000): Duplicate entry 'abc' for key 'PRIMARY'"
/// "Sign-in provider error: INVALID_IDP_RESPONSE : Invalid Idp Response"
///
/// Returning only the meaningful part:
/// "Duplicate entry 'abc' for key 'PRIMARY'"
/// "Invalid Idp Response"
pub fn extract_clean_error(error_msg: &str) -> String {
    if error_msg.contains("error returned from database:") {
        // Everything after the last colon is the actual message
        if let Some(last_colon) = error_msg.rfind(": ") {
            return error_msg[last_colon + 2..].trim().to_string();
        }
        return error_msg.to_string();
    }

    // Provider messages look like "CODE : Human readable detail"
    if let Some(detail) = error_msg.split(" : ").nth(1) {
        let detail = detail.trim();
        if !detail.is_empty() {
            return detail.to_string();
        }
    }

    error_msg.trim().to_string()
}
