//! Bank lookups.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::{BankCodeClient, decode_json};
use crate::error::Result;
use crate::page::{Page, null_as_default};
use crate::request::{GetParameter, ListParameter};

/// A financial institution.
///
/// Attributes left out by a `fields` projection are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bank {
    /// Four-digit bank code.
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: String,
    /// Official name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Name in half-width katakana.
    #[serde(default, deserialize_with = "null_as_default")]
    pub half_width_kana: String,
    /// Name in full-width katakana.
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_width_kana: String,
    /// Name in hiragana.
    #[serde(default, deserialize_with = "null_as_default")]
    pub hiragana: String,
}

/// A page of banks.
pub type Banks = Page<Bank>;

impl BankCodeClient {
    /// Fetches one bank by its code.
    ///
    /// # Errors
    ///
    /// Fails at any stage described by [`BankCodeError`](crate::BankCodeError);
    /// an unknown code is a status error with code 404.
    pub async fn get_bank(
        &self,
        cancel: &CancellationToken,
        code: &str,
        params: &GetParameter,
    ) -> Result<Bank> {
        let request = self.build_get_request(&["banks", code], params)?;
        let bank: Bank = self.execute(cancel, request, decode_json).await?;

        debug!(code = %bank.code, "Bank fetched");
        Ok(bank)
    }

    /// Lists banks one page at a time.
    ///
    /// Follow [`Page::next_params`] to walk the remaining pages.
    ///
    /// # Errors
    ///
    /// Fails at any stage described by [`BankCodeError`](crate::BankCodeError).
    pub async fn list_banks(
        &self,
        cancel: &CancellationToken,
        params: &ListParameter,
    ) -> Result<Banks> {
        let request = self.build_list_request(&["banks"], params)?;
        let banks: Banks = self.execute(cancel, request, decode_json).await?;

        if !banks.is_consistent() {
            warn!(size = banks.size, received = banks.len(), "Bank page size mismatch");
        }
        debug!(count = banks.len(), has_next = banks.has_next, "Banks listed");
        Ok(banks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Plan;
    use crate::test_support::{MockResponse, MockServer, TEST_API_KEY, project};
    use serde_json::json;
    use std::time::Duration;

    fn mizuho() -> serde_json::Value {
        json!({
            "code": "0001",
            "name": "みずほ",
            "halfWidthKana": "ﾐｽﾞﾎ",
            "fullWidthKana": "ミズホ",
            "hiragana": "みずほ"
        })
    }

    #[tokio::test]
    async fn test_get_bank() {
        let server = MockServer::start(|_| MockResponse::json(mizuho().to_string())).await;
        let client = server.client(Plan::Pro);

        let bank = client
            .get_bank(&CancellationToken::new(), "0001", &GetParameter::new())
            .await
            .unwrap();

        assert_eq!(bank.code, "0001");
        assert_eq!(bank.name, "みずほ");
        assert_eq!(bank.half_width_kana, "ﾐｽﾞﾎ");
        assert_eq!(bank.full_width_kana, "ミズホ");
        assert_eq!(bank.hiragana, "みずほ");

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "/v1/banks/0001");
        assert_eq!(requests[0].query_value("apikey"), Some(TEST_API_KEY));
        assert_eq!(requests[0].header("apikey"), None);
    }

    #[tokio::test]
    async fn test_get_bank_fields() {
        let server = MockServer::start(|request| {
            MockResponse::json(project(mizuho(), request.query_value("fields")).to_string())
        })
        .await;
        let client = server.client(Plan::Pro);

        let bank = client
            .get_bank(
                &CancellationToken::new(),
                "0001",
                &GetParameter::new().fields(["code", "name"]),
            )
            .await
            .unwrap();

        assert_eq!(bank.code, "0001");
        assert_eq!(bank.name, "みずほ");
        assert_eq!(bank.half_width_kana, "");
        assert_eq!(bank.full_width_kana, "");
        assert_eq!(bank.hiragana, "");
        assert_eq!(server.requests()[0].query_value("fields"), Some("code,name"));
    }

    #[tokio::test]
    async fn test_get_bank_null_attributes() {
        let server = MockServer::start(|_| {
            MockResponse::json(r#"{"code":"0005","name":null,"hiragana":null}"#)
        })
        .await;
        let client = server.client(Plan::Pro);

        let bank = client
            .get_bank(&CancellationToken::new(), "0005", &GetParameter::new())
            .await
            .unwrap();

        assert_eq!(bank.code, "0005");
        assert_eq!(bank.name, "");
        assert_eq!(bank.hiragana, "");
    }

    #[tokio::test]
    async fn test_get_bank_not_found() {
        let server = MockServer::start(|_| MockResponse::status(404, "not found")).await;
        let client = server.client(Plan::Pro);

        let err = client
            .get_bank(&CancellationToken::new(), "9999", &GetParameter::new())
            .await
            .unwrap_err();

        assert_eq!(err.stage(), "status");
        assert_eq!(err.status_code(), Some(404));
    }

    #[tokio::test]
    async fn test_get_bank_server_error_body_not_decoded() {
        let server = MockServer::start(|_| MockResponse::status(500, "<html>oops</html>")).await;
        let client = server.client(Plan::Pro);

        let err = client
            .get_bank(&CancellationToken::new(), "0001", &GetParameter::new())
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), Some(500));
    }

    #[tokio::test]
    async fn test_get_bank_malformed_body() {
        let server = MockServer::start(|_| MockResponse::json(r#"{"code": 1"#)).await;
        let client = server.client(Plan::Pro);

        let err = client
            .get_bank(&CancellationToken::new(), "0001", &GetParameter::new())
            .await
            .unwrap_err();

        assert_eq!(err.stage(), "decode");
    }

    #[tokio::test]
    async fn test_get_bank_code_cannot_inject_query() {
        let server = MockServer::start(|_| MockResponse::status(404, "")).await;
        let client = server.client(Plan::Pro);

        let err = client
            .get_bank(&CancellationToken::new(), "0001?apikey=evil", &GetParameter::new())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(404));

        let requests = server.requests();
        assert_eq!(requests[0].path, "/v1/banks/0001%3Fapikey=evil");
        assert_eq!(requests[0].query.len(), 1);
        assert_eq!(requests[0].query_value("apikey"), Some(TEST_API_KEY));
    }

    #[tokio::test]
    async fn test_override_key_and_header_mode() {
        let server = MockServer::start(|_| MockResponse::json(mizuho().to_string())).await;
        let client = BankCodeClient::new(server.config().key_in_header(true).plan(Plan::Pro).build())
            .unwrap();
        let cancel = CancellationToken::new();

        client.get_bank(&cancel, "0001", &GetParameter::new()).await.unwrap();
        client
            .get_bank(&cancel, "0001", &GetParameter::new().api_key("call-key"))
            .await
            .unwrap();

        let requests = server.requests();
        assert_eq!(requests[0].header("apikey"), Some(TEST_API_KEY));
        assert_eq!(requests[0].query_value("apikey"), None);
        assert_eq!(requests[1].header("apikey"), Some("call-key"));
        assert_eq!(requests[1].query_value("apikey"), None);
    }

    #[tokio::test]
    async fn test_list_banks_pagination() {
        let server = MockServer::start(|request| {
            let body = match request.query_value("cursor") {
                None => json!({
                    "data": [mizuho()],
                    "size": 1,
                    "limit": 1,
                    "hasNext": true,
                    "nextCursor": "cursor-page-2",
                    "hasPrev": false,
                    "prevCursor": "",
                    "version": "2024-04-01"
                }),
                Some(_) => json!({
                    "data": [{"code": "0005", "name": "三菱ＵＦＪ"}],
                    "size": 1,
                    "limit": 1,
                    "hasNext": false,
                    "nextCursor": "",
                    "hasPrev": true,
                    "prevCursor": "cursor-page-1",
                    "version": "2024-04-01"
                }),
            };
            MockResponse::json(body.to_string())
        })
        .await;
        let client = server.client(Plan::Pro);
        let cancel = CancellationToken::new();
        let params = ListParameter::new().limit(1).filter("code>=0001");

        let first = client.list_banks(&cancel, &params).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first.data[0].code, "0001");
        assert!(first.prev_params(&params).is_none());

        let next = first.next_params(&params).unwrap();
        let second = client.list_banks(&cancel, &next).await.unwrap();
        assert_eq!(second.data[0].code, "0005");
        assert!(second.has_prev);
        assert!(!second.prev_cursor.is_empty());
        assert!(second.next_params(&next).is_none());

        let requests = server.requests();
        assert_eq!(requests[0].path, "/v1/banks");
        assert_eq!(requests[0].query_value("cursor"), None);
        assert_eq!(requests[1].query_value("cursor"), Some("cursor-page-2"));
        assert_eq!(requests[1].query_value("limit"), Some("1"));
        assert_eq!(requests[1].query_value("filter"), Some("code>=0001"));
    }

    #[tokio::test]
    async fn test_list_banks_inconsistent_page_is_returned() {
        let server = MockServer::start(|_| {
            MockResponse::json(json!({"data": [mizuho()], "size": 2}).to_string())
        })
        .await;
        let client = server.client(Plan::Pro);

        let banks = client
            .list_banks(&CancellationToken::new(), &ListParameter::new())
            .await
            .unwrap();

        assert!(!banks.is_consistent());
        assert_eq!(banks.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_calls_on_free_plan() {
        let server = MockServer::start(|_| MockResponse::json(mizuho().to_string())).await;
        let client = server.client(Plan::Free);

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let client = client.clone();
                tokio::spawn(async move {
                    client
                        .get_bank(&CancellationToken::new(), "0001", &GetParameter::new())
                        .await
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().code, "0001");
        }

        let requests = server.requests();
        assert_eq!(requests.len(), 3);
        for pair in requests.windows(2) {
            let gap = pair[1].received_at - pair[0].received_at;
            assert!(gap >= Duration::from_millis(2900), "gap {gap:?}");
        }
    }
}
