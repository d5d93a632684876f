pub const AUTH_SUCCESS: &str = "Authentication success";
pub const UNKNOWN_STATE: &str = "Unknown callback state";
pub const FAILED_TO_COMPLETE: &str = "Failed to complete authentication";
pub const PROCESSING_CONNECTION: &str = "Processing connection...";

/// User-facing text for an OAuth `error` code.
pub fn oauth_error_message(code: Option<&str>) -> String {
    let Some(code) = code else {
        return "Authentication failed.".to_string();
    };

    let message = match code {
        "access_denied" => "You denied access. Please try again if you want to connect.",
        "invalid_client" => "Invalid application configuration.",
        "invalid_grant" => "Authorization code expired. Please try again.",
        "invalid_scope" => "Invalid permissions requested.",
        "missing_params" => "Missing required parameters.",
        "invalid_state" => "Security validation failed. Please try again.",
        "auth_failed" => "Authentication process failed. Please try again.",
        "auth_required" => "You need to be logged in to connect. Please log in first.",
        "user_not_found" => "User authentication failed. Please log in again and try connecting.",
        other => return format!("Authentication failed: {}", other),
    };
    message.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(
            oauth_error_message(Some("access_denied")),
            "You denied access. Please try again if you want to connect."
        );
        assert_eq!(
            oauth_error_message(Some("invalid_grant")),
            "Authorization code expired. Please try again."
        );
        assert_eq!(
            oauth_error_message(Some("auth_required")),
            "You need to be logged in to connect. Please log in first."
        );
    }

    #[test]
    fn test_unknown_code_is_echoed() {
        assert_eq!(
            oauth_error_message(Some("server_error")),
            "Authentication failed: server_error"
        );
    }

    #[test]
    fn test_missing_code() {
        assert_eq!(oauth_error_message(None), "Authentication failed.");
    }
}
