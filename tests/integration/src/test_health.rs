//! Health endpoint integration tests.

#[cfg(test)]
mod tests {
    use crate::{gateway_url, http_client};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_running() {
        let resp = http_client()
            .get(format!("{}/health", gateway_url()))
            .send()
            .await
            .expect("health request");

        assert_eq!(resp.status().as_u16(), 200);
        assert_eq!(
            resp.headers().get("server").and_then(|v| v.to_str().ok()),
            Some("cosproxy")
        );
        assert!(resp.headers().contains_key("x-request-id"));

        let json: serde_json::Value = resp.json().await.expect("health json");
        assert_eq!(json["status"], "running");
        assert_eq!(json["service"], "cosproxy");
    }
}
