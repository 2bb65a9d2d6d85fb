//! Network-backed summarizers: a direct chat-completions client holding an
//! in-memory key, and a client for a local proxy that keeps the key server-side.
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::fmt;

use super::transport::{HttpResponse, HttpTransport};
use super::{SummarizeError, Summarizer};
use crate::constants::{DEFAULT_CHAT_ENDPOINT, DEFAULT_CHAT_MODEL, DEFAULT_PROXY_URL};
use crate::derive::DerivationResult;
use crate::quests::QuestIdea;
use crate::state::AppState;

const SUMMARY_SYSTEM_PROMPT: &str = "Kurz, prägnant, deutsch.";
const QUEST_SYSTEM_PROMPT: &str = "Du erzeugst sehr kompakte Quest-Ideen.";
const MAX_REMOTE_IDEAS: usize = 3;

/// API key held only in memory. Cleared bytes are overwritten, not just dropped.
pub struct Credential(String);

impl Credential {
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    #[must_use]
    pub fn expose(&self) -> Option<&str> {
        (!self.0.is_empty()).then_some(self.0.as_str())
    }

    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        let mut bytes = std::mem::take(&mut self.0).into_bytes();
        bytes.fill(0);
        std::hint::black_box(&bytes);
    }
}

impl Drop for Credential {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_cleared() {
            f.write_str("Credential(cleared)")
        } else {
            f.write_str("Credential(***)")
        }
    }
}

fn expect_success(response: HttpResponse) -> Result<Value, SummarizeError> {
    if response.is_success() {
        Ok(response.body)
    } else {
        Err(SummarizeError::Status(response.status))
    }
}

fn summary_prompt(text: &str, derived: Option<&DerivationResult>) -> String {
    let mut prompt =
        format!("Fasse das Tagebuch in 1 kurzen Satz (max 18 Wörter) zusammen. Text:\n{text}\n");
    if let Some(derived) = derived.filter(|d| !d.keywords.is_empty()) {
        prompt.push_str(&format!("Keywords: {}", derived.keywords.join(", ")));
    }
    prompt
}

fn quest_prompt(state: &AppState) -> String {
    let attrs = serde_json::to_string(&state.stats.attributes).unwrap_or_else(|_| "{}".into());
    format!(
        "Erzeuge 3 kurze Questideen für einen Tagebuch-RPG-Charakter.\n\
         Level: {}\nAttribute: {attrs}\n\n\
         Format JSON Array: [{{\"title\":\"...\",\"desc\":\"...\",\"reward\":{{\"xp\":Number,\"attribute\":{{\"fokus\":1}}?}}}}].\n\
         Jede title max 6 Wörter, desc max 14 Wörter.",
        state.stats.level
    )
}

fn chat_content(body: &Value) -> Option<&str> {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Options for the direct chat-completions client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectOptions {
    pub endpoint: String,
    pub model: String,
}

impl Default for DirectOptions {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_CHAT_ENDPOINT.to_string(),
            model: DEFAULT_CHAT_MODEL.to_string(),
        }
    }
}

/// Calls an OpenAI-compatible chat endpoint with an in-memory key.
#[derive(Debug)]
pub struct DirectSummarizer<T> {
    transport: T,
    credential: Credential,
    options: DirectOptions,
}

impl<T: HttpTransport> DirectSummarizer<T> {
    #[must_use]
    pub const fn new(transport: T, credential: Credential, options: DirectOptions) -> Self {
        Self {
            transport,
            credential,
            options,
        }
    }

    /// Overwrite the held key; later calls fail with `CredentialCleared`.
    pub fn dispose(&mut self) {
        self.credential.clear();
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.credential.is_cleared()
    }

    async fn chat(
        &self,
        system: &str,
        user: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<Value, SummarizeError> {
        let key = self
            .credential
            .expose()
            .ok_or(SummarizeError::CredentialCleared)?;
        let body = json!({
            "model": self.options.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ],
            "temperature": temperature,
            "max_tokens": max_tokens
        });
        let response = self
            .transport
            .post_json(&self.options.endpoint, Some(key), &body)
            .await?;
        expect_success(response)
    }
}

#[async_trait(?Send)]
impl<T: HttpTransport> Summarizer for DirectSummarizer<T> {
    async fn summarize_entry(
        &self,
        text: &str,
        derived: &DerivationResult,
    ) -> Result<String, SummarizeError> {
        let prompt = summary_prompt(text, Some(derived));
        let body = self.chat(SUMMARY_SYSTEM_PROMPT, &prompt, 0.4, 60).await?;
        chat_content(&body)
            .map(str::to_string)
            .ok_or_else(|| SummarizeError::Malformed("missing choices[0].message.content".into()))
    }

    async fn suggest_quests(&self, state: &AppState) -> Result<Vec<QuestIdea>, SummarizeError> {
        let body = self
            .chat(QUEST_SYSTEM_PROMPT, &quest_prompt(state), 0.7, 180)
            .await?;
        let content = chat_content(&body).unwrap_or("[]");
        let mut ideas: Vec<QuestIdea> = serde_json::from_str(content)
            .map_err(|err| SummarizeError::Malformed(format!("quest ideas: {err}")))?;
        ideas.truncate(MAX_REMOTE_IDEAS);
        Ok(ideas)
    }
}

#[derive(Debug, Deserialize)]
struct ProxySummary {
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProxyQuests {
    #[serde(default)]
    quests: Vec<QuestIdea>,
}

#[derive(Debug, Deserialize)]
struct ProxyPing {
    #[serde(default)]
    ok: bool,
}

/// Calls a trusted local proxy that owns the API key.
#[derive(Debug, Clone)]
pub struct ProxySummarizer<T> {
    transport: T,
    base_url: String,
}

impl<T: HttpTransport> ProxySummarizer<T> {
    #[must_use]
    pub fn new(transport: T, base_url: Option<&str>) -> Self {
        let base_url = base_url.unwrap_or(DEFAULT_PROXY_URL).trim_end_matches('/');
        Self {
            transport,
            base_url: base_url.to_string(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Liveness probe against `/api/ping`.
    ///
    /// # Errors
    ///
    /// Returns an error if the proxy is unreachable or reports `ok: false`.
    pub async fn ping(&self) -> Result<(), SummarizeError> {
        let url = format!("{}/api/ping", self.base_url);
        let body = expect_success(self.transport.get_json(&url).await?)?;
        let ping: ProxyPing = serde_json::from_value(body)
            .map_err(|err| SummarizeError::Malformed(format!("ping: {err}")))?;
        if ping.ok {
            Ok(())
        } else {
            Err(SummarizeError::Unavailable(url))
        }
    }
}

#[async_trait(?Send)]
impl<T: HttpTransport> Summarizer for ProxySummarizer<T> {
    async fn summarize_entry(
        &self,
        text: &str,
        derived: &DerivationResult,
    ) -> Result<String, SummarizeError> {
        let url = format!("{}/api/summarize", self.base_url);
        let payload = json!({ "text": text, "derived": derived });
        let body = expect_success(self.transport.post_json(&url, None, &payload).await?)?;
        let parsed: ProxySummary = serde_json::from_value(body)
            .map_err(|err| SummarizeError::Malformed(format!("summary: {err}")))?;
        parsed
            .summary
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| SummarizeError::Malformed("empty summary".into()))
    }

    async fn suggest_quests(&self, state: &AppState) -> Result<Vec<QuestIdea>, SummarizeError> {
        let url = format!("{}/api/quests", self.base_url);
        let payload = json!({ "state": state });
        let body = expect_success(self.transport.post_json(&url, None, &payload).await?)?;
        let parsed: ProxyQuests = serde_json::from_value(body)
            .map_err(|err| SummarizeError::Malformed(format!("quests: {err}")))?;
        Ok(parsed.quests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarize::test_support::ScriptedTransport;

    fn derived() -> DerivationResult {
        DerivationResult {
            words: 4,
            keywords: vec!["yoga".into()],
            xp_gained: 15,
            stat_diff: Default::default(),
        }
    }

    #[test]
    fn cleared_credential_is_overwritten_and_hidden() {
        let mut credential = Credential::new("gsk_secret");
        assert_eq!(credential.expose(), Some("gsk_secret"));
        assert_eq!(format!("{credential:?}"), "Credential(***)");
        credential.clear();
        assert!(credential.is_cleared());
        assert_eq!(credential.expose(), None);
        assert_eq!(format!("{credential:?}"), "Credential(cleared)");
    }

    #[tokio::test]
    async fn direct_sends_bearer_and_reads_content() {
        let transport = ScriptedTransport::new(vec![Ok(HttpResponse {
            status: 200,
            body: json!({ "choices": [{ "message": { "content": "  Ein guter Tag.  " } }] }),
        })]);
        let client = DirectSummarizer::new(
            transport.clone(),
            Credential::new("k-123"),
            DirectOptions::default(),
        );
        let summary = client.summarize_entry("text", &derived()).await.unwrap();
        assert_eq!(summary, "Ein guter Tag.");

        let calls = transport.calls();
        assert_eq!(calls[0].url, DEFAULT_CHAT_ENDPOINT);
        assert_eq!(calls[0].bearer.as_deref(), Some("k-123"));
        assert_eq!(calls[0].body["model"], DEFAULT_CHAT_MODEL);
        assert_eq!(calls[0].body["max_tokens"], 60);
    }

    #[tokio::test]
    async fn disposed_direct_client_refuses_to_call() {
        let transport = ScriptedTransport::new(vec![]);
        let mut client =
            DirectSummarizer::new(transport.clone(), Credential::new("k"), DirectOptions::default());
        client.dispose();
        assert!(client.is_disposed());
        let err = client.summarize_entry("t", &derived()).await.unwrap_err();
        assert!(matches!(err, SummarizeError::CredentialCleared));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn direct_quests_parse_json_array_from_content() {
        let content = r#"[{"title":"A","reward":{"xp":5}},{"title":"B","reward":{"xp":5}},{"title":"C","reward":{"xp":5}},{"title":"D","reward":{"xp":5}}]"#;
        let transport = ScriptedTransport::new(vec![Ok(HttpResponse {
            status: 200,
            body: json!({ "choices": [{ "message": { "content": content } }] }),
        })]);
        let client = DirectSummarizer::new(transport, Credential::new("k"), DirectOptions::default());
        let state = AppState::initial(chrono::Utc::now());
        let ideas = client.suggest_quests(&state).await.unwrap();
        assert_eq!(ideas.len(), 3);
    }

    #[tokio::test]
    async fn proxy_maps_status_and_shape_errors() {
        let transport = ScriptedTransport::new(vec![
            Ok(HttpResponse {
                status: 500,
                body: json!({ "error": "boom" }),
            }),
            Ok(HttpResponse {
                status: 200,
                body: json!({ "unexpected": true }),
            }),
            Ok(HttpResponse {
                status: 200,
                body: json!({ "summary": "Kurz und gut" }),
            }),
        ]);
        let proxy = ProxySummarizer::new(transport.clone(), Some("http://localhost:9000/"));
        assert!(matches!(
            proxy.summarize_entry("t", &derived()).await,
            Err(SummarizeError::Status(500))
        ));
        assert!(matches!(
            proxy.summarize_entry("t", &derived()).await,
            Err(SummarizeError::Malformed(_))
        ));
        assert_eq!(
            proxy.summarize_entry("t", &derived()).await.unwrap(),
            "Kurz und gut"
        );
        let calls = transport.calls();
        assert_eq!(calls[0].url, "http://localhost:9000/api/summarize");
        assert_eq!(calls[0].bearer, None);
        assert_eq!(calls[0].body["derived"]["xpGained"], 15);
    }

    #[tokio::test]
    async fn ping_requires_ok_flag() {
        let transport = ScriptedTransport::new(vec![
            Ok(HttpResponse {
                status: 200,
                body: json!({ "ok": true, "model": "mixtral-8x7b" }),
            }),
            Ok(HttpResponse {
                status: 200,
                body: json!({ "ok": false }),
            }),
        ]);
        let proxy = ProxySummarizer::new(transport, None);
        assert!(proxy.ping().await.is_ok());
        assert!(matches!(
            proxy.ping().await,
            Err(SummarizeError::Unavailable(_))
        ));
    }
}
