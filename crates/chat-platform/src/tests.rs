#[cfg(test)]
mod tests {
    use crate::http::*;
    use chat_types::ChatError;

    // ─── Error mapping ───────────────────────────────────────

    #[test]
    fn test_detail_body() {
        let err = error_from_response(403, "Forbidden", r#"{"detail":"not yours"}"#);
        assert_eq!(err, ChatError::Remote { status: 403, message: "not yours".to_string() });
    }

    #[test]
    fn test_message_body() {
        let err = error_from_response(409, "Conflict", r#"{"message":"email taken"}"#);
        assert_eq!(err, ChatError::Remote { status: 409, message: "email taken".to_string() });
    }

    #[test]
    fn test_structured_detail_kept_as_json() {
        let err = error_from_response(422, "Unprocessable Entity", r#"{"detail":[{"loc":["body"]}]}"#);
        match err {
            ChatError::Remote { status, message } => {
                assert_eq!(status, 422);
                assert!(message.contains("loc"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_body_uses_status_text() {
        let err = error_from_response(502, "Bad Gateway", "<html>upstream</html>");
        assert_eq!(err, ChatError::Remote { status: 502, message: "Bad Gateway".to_string() });

        let err = error_from_response(500, "", "");
        assert_eq!(err, ChatError::Remote { status: 500, message: "request failed".to_string() });
    }

    #[test]
    fn test_401_is_unauthorized() {
        let err = error_from_response(401, "Unauthorized", r#"{"detail":"login required"}"#);
        assert!(err.is_unauthorized());
        assert_eq!(err, ChatError::Unauthorized("login required".to_string()));
    }

    #[test]
    fn test_404_counts_as_not_found() {
        assert!(error_from_response(404, "Not Found", "{}").is_not_found());
    }

    // ─── Reply parsing ───────────────────────────────────────

    #[test]
    fn test_parse_status() {
        let identity = parse_status(
            r#"{"logged_in":true,"email":"kim@example.com","id":4,"name":"Kim"}"#,
        )
        .unwrap();
        assert_eq!(identity.id, 4);
        assert_eq!(identity.email, "kim@example.com");
        assert_eq!(identity.name, "Kim");
    }

    #[test]
    fn test_parse_status_logged_out() {
        let err = parse_status(r#"{"logged_in":false,"email":"","id":0}"#).unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_parse_auth_envelope() {
        let reply = parse_auth_envelope(
            r#"{"success":true,"message":"signed up","data":{"id":9,"name":"Lee","email":"lee@example.com"}}"#,
        )
        .unwrap();
        assert_eq!(reply.identity.name, "Lee");
        assert_eq!(reply.message.as_deref(), Some("signed up"));
    }

    #[test]
    fn test_parse_auth_envelope_without_data() {
        let err = parse_auth_envelope(r#"{"success":true,"message":"ok"}"#).unwrap_err();
        assert!(matches!(err, ChatError::Serialization(_)));
    }

    #[test]
    fn test_parse_auth_envelope_garbage() {
        assert!(matches!(parse_auth_envelope("not json"), Err(ChatError::Serialization(_))));
    }
}
