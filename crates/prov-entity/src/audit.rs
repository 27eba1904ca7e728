//! Hash-chained audit log
//!
//! Mutating operations outside the append-only norm (quarantine flips, group
//! nukes) are recorded here. Each event is sealed against the previous
//! event's hash, so after-the-fact edits are detectable by recomputing the
//! chain.

use crate::ids::AuditEventId;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Action recorded by an audit event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    /// An artifact's quarantine flag was raised
    Quarantine,
    /// An artifact's quarantine flag was cleared
    Release,
    /// A group and its descendants were deleted
    NukeGroup,
}

impl AuditAction {
    fn as_u8(self) -> u8 {
        match self {
            Self::Quarantine => 0,
            Self::Release => 1,
            Self::NukeGroup => 2,
        }
    }
}

/// One sealed audit event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique identifier
    pub event_id: AuditEventId,
    /// When the event was appended
    pub timestamp: DateTime<Utc>,
    /// Who triggered the mutation
    pub actor: String,
    /// What happened
    pub action: AuditAction,
    /// Display reference of the affected entity
    pub subject: String,
    /// Hash of the previous event (zeroes for the first)
    pub prev_hash: [u8; 32],
    /// Hash sealing this event
    pub hash: [u8; 32],
}

impl AuditEvent {
    /// Hex encoding of the sealing hash, for logs and diagnostics
    #[inline]
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }
}

/// Integrity failures detected in the audit chain
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuditError {
    /// A recomputed hash did not match the stored chain
    #[error("audit chain integrity violation")]
    IntegrityViolation,
}

/// Append-only audit log with a SHA-256 hash chain
#[derive(Debug, Default)]
pub struct AuditLog {
    inner: Mutex<Vec<AuditEvent>>,
}

impl AuditLog {
    /// Create an empty log
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, sealing it against the current chain head
    pub fn append(
        &self,
        actor: impl Into<String>,
        action: AuditAction,
        subject: impl Into<String>,
    ) -> AuditEventId {
        let mut guard = self.inner.lock();
        let prev_hash = guard.last().map(|e| e.hash).unwrap_or([0u8; 32]);
        let mut event = AuditEvent {
            event_id: AuditEventId::new(),
            timestamp: Utc::now(),
            actor: actor.into(),
            action,
            subject: subject.into(),
            prev_hash,
            hash: [0u8; 32],
        };
        event.hash = compute_hash(&event);
        let id = event.event_id;
        guard.push(event);
        id
    }

    /// Snapshot of all events in append order
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.inner.lock().clone()
    }

    /// Recompute the chain and verify every link
    pub fn verify_integrity(&self) -> Result<(), AuditError> {
        let guard = self.inner.lock();
        let mut prev = [0u8; 32];
        for event in guard.iter() {
            if event.prev_hash != prev {
                return Err(AuditError::IntegrityViolation);
            }
            if compute_hash(event) != event.hash {
                return Err(AuditError::IntegrityViolation);
            }
            prev = event.hash;
        }
        Ok(())
    }
}

fn compute_hash(event: &AuditEvent) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(event.event_id.0.as_bytes());
    hasher.update(event.timestamp.timestamp_micros().to_le_bytes());
    hasher.update(event.actor.as_bytes());
    hasher.update([0, event.action.as_u8()]);
    hasher.update(event.subject.as_bytes());
    hasher.update(event.prev_hash);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_log_verifies() {
        assert!(AuditLog::new().verify_integrity().is_ok());
    }

    #[test]
    fn chain_links_events() {
        let log = AuditLog::new();
        log.append("ops", AuditAction::Quarantine, "artifact:x");
        log.append("ops", AuditAction::NukeGroup, "group:y");

        let events = log.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].prev_hash, events[0].hash);
        assert_eq!(events[0].hash_hex().len(), 64);
        assert!(log.verify_integrity().is_ok());
    }

    #[test]
    fn tampering_is_detected() {
        let log = AuditLog::new();
        log.append("ops", AuditAction::Quarantine, "artifact:x");
        log.append("ops", AuditAction::Release, "artifact:x");

        {
            let mut guard = log.inner.lock();
            guard[0].subject = "artifact:other".to_string();
        }
        assert_eq!(log.verify_integrity(), Err(AuditError::IntegrityViolation));
    }
}
