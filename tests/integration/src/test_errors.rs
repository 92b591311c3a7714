//! Failure result integration tests.

#[cfg(test)]
mod tests {
    use crate::{gateway_url, http_client, test_key};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_missing_object() {
        let key = test_key("missing");
        let resp = http_client()
            .get(format!("{}/read?bucket=integration&key={key}", gateway_url()))
            .send()
            .await
            .expect("read request");

        assert_eq!(resp.status().as_u16(), 404);
        let json: serde_json::Value = resp.json().await.expect("failure json");
        assert_eq!(json["key"], key.as_str());
        assert!(json["message"].is_string());
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_require_upload_destination() {
        let resp = http_client()
            .post(format!("{}/write", gateway_url()))
            .header("content-type", "text/plain")
            .body("not a form")
            .send()
            .await
            .expect("write request");

        assert_eq!(resp.status().as_u16(), 400);
        let json: serde_json::Value = resp.json().await.expect("failure json");
        assert_eq!(
            json["message"],
            "bucket name, key, body, and apikey are required for this operation."
        );
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_unknown_action() {
        let resp = http_client()
            .get(format!("{}/delete", gateway_url()))
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status().as_u16(), 404);
    }
}
