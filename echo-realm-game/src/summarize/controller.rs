//! Chooses the active summarizer and enforces the direct-key session limits.
use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::str::FromStr;

use super::local::LocalSummarizer;
use super::remote::{Credential, DirectOptions, DirectSummarizer, ProxySummarizer};
use super::transport::HttpTransport;
use super::{SummarizeError, Summarizer};
use crate::constants::{DIRECT_SESSION_TTL_MINUTES, HIDDEN_REVERT_MINUTES};
use crate::derive::DerivationResult;
use crate::quests::{QuestIdea, sanitize_quest_ideas};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyMode {
    #[default]
    Local,
    Direct,
    Proxied,
}

impl StrategyMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Direct => "direct",
            Self::Proxied => "proxy",
        }
    }
}

impl fmt::Display for StrategyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "direct" | "groq" => Ok(Self::Direct),
            "proxy" | "proxied" => Ok(Self::Proxied),
            _ => Err(()),
        }
    }
}

/// Why the controller dropped back to local.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertReason {
    /// Direct session reached its time limit
    Expired,
    /// Host was hidden for too long
    Hidden,
}

struct DirectSession<T> {
    client: DirectSummarizer<T>,
    activated_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    hidden_since: Option<DateTime<Utc>>,
}

enum Active<T> {
    Local,
    Direct(DirectSession<T>),
    Proxied(ProxySummarizer<T>),
}

/// Exactly one strategy is active at a time. Local is the resting state.
pub struct StrategyController<T> {
    transport: T,
    direct_options: DirectOptions,
    local: LocalSummarizer,
    session_ttl: Duration,
    hidden_limit: Duration,
    active: Active<T>,
}

impl<T> fmt::Debug for StrategyController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyController")
            .field("mode", &self.mode())
            .field("expires_at", &self.expires_at())
            .finish_non_exhaustive()
    }
}

impl<T> StrategyController<T> {
    #[must_use]
    pub fn mode(&self) -> StrategyMode {
        match self.active {
            Active::Local => StrategyMode::Local,
            Active::Direct(_) => StrategyMode::Direct,
            Active::Proxied(_) => StrategyMode::Proxied,
        }
    }

    #[must_use]
    pub fn activated_at(&self) -> Option<DateTime<Utc>> {
        match &self.active {
            Active::Direct(session) => Some(session.activated_at),
            _ => None,
        }
    }

    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match &self.active {
            Active::Direct(session) => Some(session.expires_at),
            _ => None,
        }
    }
}

impl<T: HttpTransport + Clone> StrategyController<T> {
    #[must_use]
    pub fn new(transport: T, direct_options: DirectOptions) -> Self {
        Self {
            transport,
            direct_options,
            local: LocalSummarizer,
            session_ttl: Duration::minutes(DIRECT_SESSION_TTL_MINUTES),
            hidden_limit: Duration::minutes(HIDDEN_REVERT_MINUTES),
            active: Active::Local,
        }
    }

    /// Override the direct session lifetime and the hidden-host limit.
    #[must_use]
    pub fn with_session_limits(mut self, ttl: Duration, hidden_limit: Duration) -> Self {
        self.session_ttl = ttl;
        self.hidden_limit = hidden_limit;
        self
    }

    /// Hold `key` in memory and route calls to the chat endpoint until expiry.
    ///
    /// Re-activating replaces the previous session and its expiry.
    pub fn activate_direct(&mut self, key: impl Into<String>, now: DateTime<Utc>) {
        self.deactivate();
        let client = DirectSummarizer::new(
            self.transport.clone(),
            Credential::new(key),
            self.direct_options.clone(),
        );
        let expires_at = now + self.session_ttl;
        self.active = Active::Direct(DirectSession {
            client,
            activated_at: now,
            expires_at,
            hidden_since: None,
        });
        log::info!("AI strategy switched to direct until {}", expires_at.to_rfc3339());
    }

    /// Switch to the proxy after a successful ping. The current strategy is kept on failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the proxy does not answer its liveness probe.
    pub async fn activate_proxied(&mut self, base_url: Option<&str>) -> Result<(), SummarizeError> {
        let proxy = ProxySummarizer::new(self.transport.clone(), base_url);
        proxy.ping().await?;
        self.deactivate();
        log::info!("AI strategy switched to proxy at {}", proxy.base_url());
        self.active = Active::Proxied(proxy);
        Ok(())
    }

    /// Return to local, overwriting any held credential.
    pub fn deactivate(&mut self) {
        let previous = std::mem::replace(&mut self.active, Active::Local);
        match previous {
            Active::Local => {}
            Active::Direct(mut session) => {
                session.client.dispose();
                log::info!("AI strategy switched to local");
            }
            Active::Proxied(_) => log::info!("AI strategy switched to local"),
        }
    }

    /// Apply time-based reverts; returns the reason if one fired.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<RevertReason> {
        let Active::Direct(session) = &self.active else {
            return None;
        };
        let hidden_limit = self.hidden_limit;
        let reason = if now >= session.expires_at {
            Some(RevertReason::Expired)
        } else {
            session
                .hidden_since
                .filter(|since| now - *since >= hidden_limit)
                .map(|_| RevertReason::Hidden)
        };
        if let Some(reason) = reason {
            log::info!("direct AI session ended: {reason:?}");
            self.deactivate();
        }
        reason
    }

    /// Host visibility changed. Only matters while a direct session is active.
    pub fn set_visibility(&mut self, hidden: bool, now: DateTime<Utc>) -> Option<RevertReason> {
        if let Active::Direct(session) = &mut self.active {
            session.hidden_since = if hidden {
                session.hidden_since.or(Some(now))
            } else {
                None
            };
        }
        self.tick(now)
    }

    /// Summary from the active strategy, or the local summary if that fails.
    pub async fn summarize_entry(
        &mut self,
        now: DateTime<Utc>,
        text: &str,
        derived: &DerivationResult,
    ) -> String {
        self.tick(now);
        let result = match &self.active {
            Active::Local => return LocalSummarizer::summary(derived),
            Active::Direct(session) => session.client.summarize_entry(text, derived).await,
            Active::Proxied(proxy) => proxy.summarize_entry(text, derived).await,
        };
        match result {
            Ok(summary) => summary,
            Err(err) => {
                log::warn!("remote summary failed, using local: {err}");
                LocalSummarizer::summary(derived)
            }
        }
    }

    /// Sanitised quest ideas from the active strategy; empty on failure.
    pub async fn suggest_quests(&mut self, now: DateTime<Utc>, state: &AppState) -> Vec<QuestIdea> {
        self.tick(now);
        let result = match &self.active {
            Active::Local => self.local.suggest_quests(state).await,
            Active::Direct(session) => session.client.suggest_quests(state).await,
            Active::Proxied(proxy) => proxy.suggest_quests(state).await,
        };
        match result {
            Ok(ideas) => sanitize_quest_ideas(ideas),
            Err(err) => {
                log::warn!("remote quest ideas failed: {err}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarize::test_support::ScriptedTransport;
    use crate::summarize::transport::{HttpResponse, TransportError};
    use chrono::TimeZone;
    use serde_json::json;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn derived() -> DerivationResult {
        DerivationResult {
            words: 30,
            keywords: vec!["fokus".into()],
            xp_gained: 26,
            stat_diff: [("fokus", 1)].into_iter().collect(),
        }
    }

    fn controller(responses: Vec<Result<HttpResponse, TransportError>>) -> StrategyController<ScriptedTransport> {
        StrategyController::new(ScriptedTransport::new(responses), DirectOptions::default())
    }

    #[test]
    fn mode_parses_cli_names() {
        assert_eq!("proxy".parse(), Ok(StrategyMode::Proxied));
        assert_eq!("Direct".parse(), Ok(StrategyMode::Direct));
        assert_eq!("remote".parse::<StrategyMode>(), Err(()));
        assert_eq!(StrategyMode::Local.to_string(), "local");
    }

    #[test]
    fn direct_session_expires_after_fifteen_minutes() {
        let mut ctl = controller(vec![]);
        ctl.activate_direct("k", t0());
        assert_eq!(ctl.mode(), StrategyMode::Direct);
        assert_eq!(ctl.expires_at(), Some(t0() + Duration::minutes(15)));
        assert_eq!(ctl.tick(t0() + Duration::minutes(14)), None);
        assert_eq!(
            ctl.tick(t0() + Duration::minutes(15)),
            Some(RevertReason::Expired)
        );
        assert_eq!(ctl.mode(), StrategyMode::Local);
        assert_eq!(ctl.expires_at(), None);
    }

    #[test]
    fn reactivation_replaces_pending_expiry() {
        let mut ctl = controller(vec![]);
        ctl.activate_direct("k1", t0());
        ctl.activate_direct("k2", t0() + Duration::minutes(10));
        assert_eq!(ctl.tick(t0() + Duration::minutes(16)), None);
        assert_eq!(ctl.activated_at(), Some(t0() + Duration::minutes(10)));
    }

    #[test]
    fn hidden_host_reverts_after_limit() {
        let mut ctl = controller(vec![])
            .with_session_limits(Duration::minutes(60), Duration::minutes(20));
        ctl.activate_direct("k", t0());
        assert_eq!(ctl.set_visibility(true, t0() + Duration::minutes(1)), None);
        // becoming visible again resets the hidden clock
        assert_eq!(ctl.set_visibility(false, t0() + Duration::minutes(15)), None);
        assert_eq!(ctl.set_visibility(true, t0() + Duration::minutes(16)), None);
        assert_eq!(ctl.set_visibility(true, t0() + Duration::minutes(30)), None);
        assert_eq!(ctl.tick(t0() + Duration::minutes(35)), None);
        assert_eq!(
            ctl.tick(t0() + Duration::minutes(36)),
            Some(RevertReason::Hidden)
        );
        assert_eq!(ctl.mode(), StrategyMode::Local);
    }

    #[test]
    fn visibility_is_ignored_outside_direct_mode() {
        let mut ctl = controller(vec![]);
        assert_eq!(ctl.set_visibility(true, t0()), None);
        assert_eq!(ctl.tick(t0() + Duration::hours(2)), None);
        assert_eq!(ctl.mode(), StrategyMode::Local);
    }

    #[tokio::test]
    async fn remote_failure_falls_back_to_local_summary() {
        let mut ctl = controller(vec![Err(TransportError::Timeout)]);
        ctl.activate_direct("k", t0());
        let summary = ctl.summarize_entry(t0(), "text", &derived()).await;
        assert_eq!(summary, "XP +26, fokus+1 | fokus");
        assert_eq!(ctl.mode(), StrategyMode::Direct);
    }

    #[tokio::test]
    async fn expired_session_answers_locally_without_network() {
        let transport = ScriptedTransport::new(vec![]);
        let mut ctl = StrategyController::new(transport.clone(), DirectOptions::default());
        ctl.activate_direct("k", t0());
        let summary = ctl
            .summarize_entry(t0() + Duration::minutes(30), "text", &derived())
            .await;
        assert_eq!(summary, "XP +26, fokus+1 | fokus");
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn failed_ping_keeps_current_strategy() {
        let mut ctl = controller(vec![
            Err(TransportError::Network("refused".into())),
            Ok(HttpResponse {
                status: 200,
                body: json!({ "ok": true }),
            }),
        ]);
        assert!(ctl.activate_proxied(None).await.is_err());
        assert_eq!(ctl.mode(), StrategyMode::Local);
        ctl.activate_proxied(Some("http://127.0.0.1:8787")).await.unwrap();
        assert_eq!(ctl.mode(), StrategyMode::Proxied);
    }

    #[tokio::test]
    async fn proxied_quest_ideas_are_sanitised() {
        let mut ctl = controller(vec![
            Ok(HttpResponse {
                status: 200,
                body: json!({ "ok": true }),
            }),
            Ok(HttpResponse {
                status: 200,
                body: json!({ "quests": [
                    { "title": "Spaziergang", "desc": "20 Minuten draußen", "reward": { "xp": 15 } },
                    { "desc": "ohne Titel", "reward": { "xp": 5 } }
                ] }),
            }),
        ]);
        ctl.activate_proxied(None).await.unwrap();
        let state = AppState::initial(t0());
        let ideas = ctl.suggest_quests(t0(), &state).await;
        assert_eq!(ideas.len(), 1);
        assert_eq!(ideas[0].title.as_deref(), Some("Spaziergang"));
    }
}
