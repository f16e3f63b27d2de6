//! In-process memory of each session's latest roster.
//!
//! Lets monotonic roster growth hold across turns even when callers do not
//! echo the previous roster back. The cache lives as long as the process and
//! keeps at most `capacity` sessions, evicting the least recently recorded.

use council_domain::{AgentId, Roster, SessionId};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use tracing::debug;

/// Sessions remembered by default
pub const DEFAULT_SESSION_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Default)]
struct SessionTurns {
    roster: BTreeSet<AgentId>,
    turns: u32,
    /// Sequence number of the last `record`
    touched: u64,
}

#[derive(Debug, Default)]
struct Sessions {
    by_id: BTreeMap<SessionId, SessionTurns>,
    sequence: u64,
}

/// What the cache knows about a session before its next turn.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorTurn {
    pub roster: Vec<AgentId>,
    /// 1-based number of the upcoming turn
    pub turn: u32,
}

#[derive(Debug)]
pub struct SessionRosterCache {
    sessions: Mutex<Sessions>,
    capacity: usize,
}

impl Default for SessionRosterCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SESSION_CAPACITY)
    }
}

impl SessionRosterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache holding at most `capacity` sessions (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: Mutex::new(Sessions::default()),
            capacity: capacity.max(1),
        }
    }

    /// Prior roster for `session`, unioned with the one the caller supplied.
    pub fn prior(&self, session: &SessionId, supplied: Option<&[AgentId]>) -> PriorTurn {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let cached = sessions.by_id.get(session).cloned().unwrap_or_default();

        let mut roster = cached.roster;
        roster.extend(supplied.unwrap_or_default().iter().cloned());

        PriorTurn {
            roster: roster.into_iter().collect(),
            turn: cached.turns + 1,
        }
    }

    /// Remember the roster used by the turn that just finished.
    pub fn record(&self, session: &SessionId, roster: &Roster) -> u32 {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.sequence += 1;
        let touched = sessions.sequence;

        let entry = sessions.by_id.entry(session.clone()).or_default();
        entry.roster.extend(roster.ids().cloned());
        entry.turns += 1;
        entry.touched = touched;
        let turns = entry.turns;

        if sessions.by_id.len() > self.capacity {
            let oldest = sessions
                .by_id
                .iter()
                .min_by_key(|(_, cached)| cached.touched)
                .map(|(id, _)| id.clone());
            if let Some(oldest) = oldest {
                debug!(session = %oldest, "Evicting session roster");
                sessions.by_id.remove(&oldest);
            }
        }
        turns
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .by_id
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::{AgentSpec, Request, RosterSelector, WeightRegistry};

    fn roster(text: &str, prior: &[AgentId]) -> Roster {
        let registry = WeightRegistry::from_specs([
            AgentSpec::new("a", 0.3).mandatory(),
            AgentSpec::new("b", 0.3).with_triggers(["deploy"]),
            AgentSpec::new("c", 0.2).with_triggers(["cost"]),
            AgentSpec::new("d", 0.1),
            AgentSpec::new("e", 0.1),
        ]);
        let request = Request::new(text, "s").unwrap();
        RosterSelector::default()
            .select(&request, prior, &registry)
            .unwrap()
    }

    #[test]
    fn test_first_turn_has_no_prior() {
        let cache = SessionRosterCache::new();
        let prior = cache.prior(&SessionId::new("s"), None);
        assert!(prior.roster.is_empty());
        assert_eq!(prior.turn, 1);
    }

    #[test]
    fn test_turns_accumulate() {
        let cache = SessionRosterCache::new();
        let session = SessionId::new("s");

        let first = roster("deploy", &[]);
        assert_eq!(cache.record(&session, &first), 1);

        let prior = cache.prior(&session, None);
        assert_eq!(prior.turn, 2);
        assert_eq!(prior.roster, first.to_ids());

        let second = roster("cost", &prior.roster);
        assert!(second.is_superset_of(first.ids()));
        assert_eq!(cache.record(&session, &second), 2);
    }

    #[test]
    fn test_supplied_roster_is_unioned() {
        let cache = SessionRosterCache::new();
        let session = SessionId::new("s");
        cache.record(&session, &roster("deploy", &[]));

        let supplied = vec![AgentId::new("zeta")];
        let prior = cache.prior(&session, Some(&supplied));
        assert!(prior.roster.contains(&AgentId::new("zeta")));
        assert!(prior.roster.contains(&AgentId::new("b")));
    }

    #[test]
    fn test_sessions_are_independent() {
        let cache = SessionRosterCache::new();
        cache.record(&SessionId::new("one"), &roster("deploy", &[]));
        let other = cache.prior(&SessionId::new("two"), None);
        assert!(other.roster.is_empty());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_least_recent_session_is_evicted() {
        let cache = SessionRosterCache::with_capacity(2);
        let deploy = roster("deploy", &[]);
        cache.record(&SessionId::new("one"), &deploy);
        cache.record(&SessionId::new("two"), &deploy);
        cache.record(&SessionId::new("one"), &deploy);
        cache.record(&SessionId::new("three"), &deploy);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.prior(&SessionId::new("one"), None).turn, 3);
        assert_eq!(cache.prior(&SessionId::new("two"), None).turn, 1);
        assert!(cache.prior(&SessionId::new("two"), None).roster.is_empty());
    }
}
