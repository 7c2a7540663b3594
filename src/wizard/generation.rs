//! Generation counters used to recognise late asynchronous responses.
//!
//! Every request is stamped with a [`Ticket`] when it is dispatched. A
//! response is only applied if its ticket still matches the live counters:
//! reopening the wizard bumps the session, entering a step bumps that step's
//! entry counter and editing a step bumps its revision.

/// Identity of the wizard state a request was issued against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    session: u64,
    step: usize,
    entry: Option<(u64, u64)>,
}

impl Ticket {
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    /// Session-scoped tickets survive navigation between steps.
    pub fn is_session_scoped(&self) -> bool {
        self.entry.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct GenerationTracker {
    session: u64,
    entries: Vec<u64>,
    revisions: Vec<u64>,
}

impl GenerationTracker {
    pub fn new(steps: usize) -> Self {
        Self {
            session: 0,
            entries: vec![0; steps],
            revisions: vec![0; steps],
        }
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn begin_session(&mut self) -> u64 {
        self.session += 1;
        self.session
    }

    pub fn enter(&mut self, step: usize) {
        if let Some(entry) = self.entries.get_mut(step) {
            *entry += 1;
        }
    }

    pub fn touch(&mut self, step: usize) {
        if let Some(revision) = self.revisions.get_mut(step) {
            *revision += 1;
        }
    }

    pub fn session_ticket(&self, step: usize) -> Ticket {
        Ticket {
            session: self.session,
            step,
            entry: None,
        }
    }

    pub fn entry_ticket(&self, step: usize) -> Ticket {
        Ticket {
            session: self.session,
            step,
            entry: Some((
                self.entries.get(step).copied().unwrap_or_default(),
                self.revisions.get(step).copied().unwrap_or_default(),
            )),
        }
    }

    /// `active` is the step currently shown, if any.
    pub fn is_current(&self, ticket: &Ticket, active: Option<usize>) -> bool {
        if ticket.session != self.session {
            return false;
        }
        match ticket.entry {
            None => true,
            Some((entry, revision)) => {
                active == Some(ticket.step)
                    && self.entries.get(ticket.step) == Some(&entry)
                    && self.revisions.get(ticket.step) == Some(&revision)
            }
        }
    }
}
