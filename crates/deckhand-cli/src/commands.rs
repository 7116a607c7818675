//! Command handlers. Each returns the JSON document the binary prints.

use chrono::{DateTime, Duration, Utc};
use deckhand_core::{DeckhandError, RequestContext, SessionSigner};
use deckhand_filter::{Filter, FilterFields};
use deckhand_in::{ResponseCache, TextBackend, Translator};
use serde_json::{json, Value};

/// Translate `query` and, when the result describes cards, the canonical
/// filter for them.
pub async fn translate<B, C>(
    translator: &Translator<B, C>,
    query: &str,
    context: &RequestContext,
) -> Result<Value, DeckhandError>
where
    B: TextBackend,
    C: ResponseCache,
{
    let result = translator.translate(query, context).await?;

    let filter = result.context.as_ref().map(|context| {
        let filter = Filter::new(FilterFields::from_context(context));
        filter_report(&filter)
    });

    Ok(json!({
        "result": result,
        "filter": filter,
    }))
}

/// Canonical params, search text and digest for filter fields given as JSON.
pub fn canonicalize(input: Value, filter_id: Option<u64>) -> Result<Value, DeckhandError> {
    let fields = FilterFields::from_json(input)?;
    let filter = match filter_id {
        Some(id) => Filter::persisted(id, fields),
        None => Filter::new(fields),
    };
    Ok(filter_report(&filter))
}

pub fn sign_session(signer: &SessionSigner, user_id: &str, ttl: Duration, now: DateTime<Utc>) -> Value {
    let expires_at = now + ttl;
    json!({
        "sig": signer.sign(user_id, expires_at),
        "expires_at": expires_at,
    })
}

pub fn verify_session(signer: &SessionSigner, sig: &str, now: DateTime<Utc>) -> Result<Value, DeckhandError> {
    let user_id = signer.verify(sig, now)?;
    Ok(json!({ "user_id": user_id }))
}

fn filter_report(filter: &Filter) -> Value {
    json!({
        "params": filter.to_params(),
        "query": filter.search_query(),
        "digest": filter.digest(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use deckhand_core::{ActingUser, View};
    use deckhand_in::{BackendError, CompletionRequest};

    struct Fixed(&'static str);

    #[async_trait]
    impl TextBackend for Fixed {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String, BackendError> {
            Ok(self.0.to_string())
        }
    }

    fn context() -> RequestContext {
        RequestContext::new(ActingUser::new("u-3"), View::CardList)
    }

    #[tokio::test]
    async fn test_translate_reports_filter() {
        let translator = Translator::new(Fixed(
            r#"{ "context": { "tag_ids": ["v2", "design"], "collection_ids": ["writebook"] }, "commands": ["/assign <deckhand:ME>"] }"#,
        ));
        let report = translate(&translator, "assign #design #v2 writebook cards to me", &context())
            .await
            .unwrap();

        assert_eq!(report["result"]["commands"], json!(["/assign u-3"]));
        assert_eq!(report["filter"]["params"]["tag_ids"], json!(["design", "v2"]));
        assert_eq!(report["filter"]["params"]["bucket_ids"], json!(["writebook"]));
        assert_eq!(report["filter"]["digest"].as_str().unwrap().len(), 64);
    }

    #[tokio::test]
    async fn test_translate_without_context_has_no_filter() {
        let translator = Translator::new(Fixed(r#"{ "commands": ["/search 123"] }"#));
        let report = translate(&translator, "123", &context()).await.unwrap();

        assert_eq!(report["filter"], Value::Null);
    }

    #[test]
    fn test_canonicalize() {
        let report = canonicalize(
            json!({ "terms": ["logo"], "indexed_by": "latest", "card_ids": [7] }),
            Some(12),
        )
        .unwrap();

        assert_eq!(report["params"], json!({ "terms": ["logo"], "filter_id": 12 }));
        assert_eq!(report["query"], json!("logo"));
    }

    #[test]
    fn test_canonicalize_rejects_bad_shape() {
        let err = canonicalize(json!({ "tag_ids": 5 }), None).unwrap_err();
        assert!(err.to_string().starts_with("CONTRACT/"));
    }

    #[test]
    fn test_session_round_trip() {
        let signer = SessionSigner::new("secret");
        let now = Utc::now();
        let signed = sign_session(&signer, "u-3", Duration::seconds(60), now);
        let sig = signed["sig"].as_str().unwrap();

        assert_eq!(verify_session(&signer, sig, now).unwrap(), json!({ "user_id": "u-3" }));
        let err = verify_session(&signer, sig, now + Duration::seconds(61)).unwrap_err();
        assert!(err.is_unauthorized());
    }
}
