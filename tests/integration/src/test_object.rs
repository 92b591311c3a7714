//! Object write/read integration tests.

#[cfg(test)]
mod tests {
    use crate::{gateway_url, http_client, test_key, upload};

    const BUCKET: &str = "integration";

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_write_and_read_text_object() {
        let client = http_client();
        let key = test_key("text");

        let resp = upload(&client, BUCKET, &key, "text/plain", b"hello from cosproxy").await;
        assert_eq!(resp.status().as_u16(), 200);
        let json: serde_json::Value = resp.json().await.expect("write json");
        assert_eq!(json["bucket"], BUCKET);
        assert_eq!(json["key"], key.as_str());
        assert!(json["body"]["ETag"].as_str().is_some_and(|e| e.starts_with('"')));

        let resp = client
            .get(format!("{}/read?bucket={BUCKET}&key={key}", gateway_url()))
            .send()
            .await
            .expect("read request");
        assert_eq!(resp.status().as_u16(), 200);
        assert_eq!(
            resp.headers().get("content-type").and_then(|v| v.to_str().ok()),
            Some("text/plain")
        );
        assert_eq!(resp.text().await.expect("read body"), "hello from cosproxy");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_round_trip_binary_object() {
        let client = http_client();
        let key = test_key("binary");
        let data: Vec<u8> = (0..=255u8).chain(b"\r\n--not-a-boundary\r\n".iter().copied()).collect();

        let resp = upload(&client, BUCKET, &key, "application/octet-stream", &data).await;
        assert_eq!(resp.status().as_u16(), 200);

        let resp = client
            .post(format!("{}/read", gateway_url()))
            .header("content-type", "application/json")
            .body(serde_json::json!({ "bucket": BUCKET, "key": key }).to_string())
            .send()
            .await
            .expect("read request");
        assert_eq!(resp.status().as_u16(), 200);
        assert_eq!(resp.bytes().await.expect("read body").as_ref(), data.as_slice());
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_overwrite_existing_object() {
        let client = http_client();
        let key = test_key("overwrite");

        upload(&client, BUCKET, &key, "text/plain", b"first").await;
        upload(&client, BUCKET, &key, "text/plain", b"second").await;

        let body = client
            .get(format!("{}/read?bucket={BUCKET}&key={key}", gateway_url()))
            .send()
            .await
            .expect("read request")
            .text()
            .await
            .expect("read body");
        assert_eq!(body, "second");
    }
}
