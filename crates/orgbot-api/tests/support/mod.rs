//! Test doubles for the reconciliation engine: an in-memory ledger, a
//! scripted invitation sender, a fixed-answer oracle, and a stub row
//! source.

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use orgbot_api::{
    InvitationLedger, InvitationSender, LedgerError, Membership, MembershipOracle, RowSource,
    RowSourceError, SendOutcome, SenderError,
};
use orgbot_db::{InvitationAttempt, InvitationStatus, NewInvitationAttempt};
use orgbot_sheets::OrderRow;

pub fn row(order_id: i64, username: &str, email: &str) -> OrderRow {
    OrderRow {
        order_id,
        username: username.to_string(),
        email: email.to_string(),
    }
}

/// In-memory ledger mirroring the Postgres lookup and update semantics.
///
/// Timestamps come from a logical clock so recency ordering is
/// deterministic. `fail_on_username` poisons lookups for one identity to
/// simulate a ledger outage on a single row.
#[derive(Default)]
pub struct MemoryLedger {
    rows: Mutex<Vec<InvitationAttempt>>,
    clock: AtomicI64,
    pub fail_on_username: Option<String>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(username: &str) -> Self {
        Self {
            fail_on_username: Some(username.to_string()),
            ..Self::default()
        }
    }

    fn tick(&self) -> chrono::DateTime<Utc> {
        let t = self.clock.fetch_add(1, Ordering::SeqCst);
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(t)
    }

    /// Seed a historical lineage directly.
    pub fn insert(&self, order_id: i64, username: &str, email: &str, status: InvitationStatus) -> Uuid {
        let id = Uuid::new_v4();
        let now = self.tick();
        self.rows.lock().unwrap().push(InvitationAttempt {
            id,
            order_id,
            username: username.to_string(),
            email: email.to_string(),
            status,
            first_error: None,
            created_at: now,
            updated_at: now,
        });
        id
    }

    pub fn snapshot(&self) -> Vec<InvitationAttempt> {
        self.rows.lock().unwrap().clone()
    }

    pub fn get(&self, id: Uuid) -> Option<InvitationAttempt> {
        self.rows.lock().unwrap().iter().find(|a| a.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl InvitationLedger for MemoryLedger {
    async fn find_active_lineage(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<InvitationAttempt>, LedgerError> {
        if self.fail_on_username.as_deref() == Some(username) {
            return Err(LedgerError::Query("simulated ledger outage".to_string()));
        }
        let rows = self.rows.lock().unwrap();
        // An empty identity field never matches.
        let mut matches: Vec<&InvitationAttempt> = rows
            .iter()
            .filter(|a| {
                (!username.is_empty() && a.username == username)
                    || (!email.is_empty() && a.email == email)
            })
            .collect();
        // Unresolved lineages first, most recently updated within each group.
        matches.sort_by_key(|a| {
            (
                a.status == InvitationStatus::Succeeded,
                std::cmp::Reverse(a.updated_at),
            )
        });
        Ok(matches.first().map(|a| (*a).clone()))
    }

    async fn create(&self, data: NewInvitationAttempt) -> Result<InvitationAttempt, LedgerError> {
        let now = self.tick();
        let attempt = InvitationAttempt {
            id: data.id,
            order_id: data.order_id,
            username: data.username,
            email: data.email,
            status: InvitationStatus::Pending,
            first_error: None,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(attempt.clone());
        Ok(attempt)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: InvitationStatus,
        first_error: Option<&str>,
    ) -> Result<InvitationAttempt, LedgerError> {
        let now = self.tick();
        let mut rows = self.rows.lock().unwrap();
        let attempt = rows
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| LedgerError::Query(format!("no lineage with id {id}")))?;
        attempt.status = status;
        attempt.first_error = match status {
            InvitationStatus::Succeeded => None,
            _ => attempt
                .first_error
                .take()
                .or_else(|| first_error.map(str::to_string)),
        };
        attempt.updated_at = now;
        Ok(attempt.clone())
    }

    async fn list_by_status(
        &self,
        status: InvitationStatus,
    ) -> Result<Vec<InvitationAttempt>, LedgerError> {
        let mut matches: Vec<InvitationAttempt> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.status == status)
            .cloned()
            .collect();
        matches.sort_by_key(|a| std::cmp::Reverse(a.updated_at));
        Ok(matches)
    }
}

/// One scripted reply of the sender.
#[derive(Debug, Clone)]
pub enum Reply {
    Created,
    AlreadyInvited,
    Fail(&'static str),
}

/// Sender that plays back a script of replies and counts calls.
///
/// An exhausted script answers `Created`.
#[derive(Default)]
pub struct ScriptedSender {
    script: Mutex<VecDeque<Reply>>,
    calls: AtomicUsize,
}

impl ScriptedSender {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            script: Mutex::new(replies.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn always_created() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InvitationSender for ScriptedSender {
    async fn invite(&self, _username: &str, _email: &str) -> Result<SendOutcome, SenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().unwrap().pop_front() {
            None | Some(Reply::Created) => Ok(SendOutcome::Created),
            Some(Reply::AlreadyInvited) => Ok(SendOutcome::AlreadyInvited),
            Some(Reply::Fail(message)) => Err(SenderError::Rejected(message.to_string())),
        }
    }
}

/// Oracle that always gives the same answer and counts calls.
pub struct StaticOracle {
    answer: Membership,
    calls: AtomicUsize,
}

impl StaticOracle {
    pub fn new(answer: Membership) -> Self {
        Self {
            answer,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MembershipOracle for StaticOracle {
    async fn membership(&self, _username: &str) -> Membership {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}

/// Row source returning a fixed set of rows, or an error.
pub struct StubRows {
    result: Result<Vec<OrderRow>, String>,
}

impl StubRows {
    pub fn with_rows(rows: Vec<OrderRow>) -> Self {
        Self { result: Ok(rows) }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
        }
    }
}

#[async_trait]
impl RowSource for StubRows {
    async fn fetch_range(&self, _start: &str, _end: &str) -> Result<Vec<OrderRow>, RowSourceError> {
        match &self.result {
            Ok(rows) => Ok(rows.clone()),
            Err(message) => Err(RowSourceError(message.clone())),
        }
    }
}
