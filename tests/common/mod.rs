#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use admin_wizard::collaborators::{
    CachedIdentity, ConflictChecker, FixedClock, OptionItem, OptionsKind, OptionsProvider,
    SubmitReceipt, Submitter, ADMIN_ROLE,
};
use admin_wizard::errors::{CollaboratorError, HTTP_CONFLICT};
use admin_wizard::flows::{self, FlowContext, WizardKind};
use admin_wizard::scheduling::{Booking, ConflictQuery};
use admin_wizard::wizard::WizardController;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

/// 2026-10-19 10:01, a Monday.
pub fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 19)
        .expect("valid date")
        .and_hms_opt(10, 1, 0)
        .expect("valid time")
}

pub fn context() -> FlowContext {
    let identity = CachedIdentity::new("admin", vec![ADMIN_ROLE.to_string()]);
    FlowContext::new(Arc::new(identity), Arc::new(FixedClock(now())))
}

pub fn wizard(kind: WizardKind) -> WizardController {
    admin_wizard::init();
    flows::controller(kind, &context()).expect("flow builds")
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitCall {
    pub resource: String,
    pub id: Option<String>,
    pub payload: Value,
}

/// Answers with queued failures first, then succeeds.
#[derive(Default)]
pub struct ScriptedSubmitter {
    failures: Mutex<VecDeque<CollaboratorError>>,
    calls: Mutex<Vec<SubmitCall>>,
}

impl ScriptedSubmitter {
    pub fn failing_with(errors: Vec<CollaboratorError>) -> Self {
        Self {
            failures: Mutex::new(errors.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn conflict() -> CollaboratorError {
        CollaboratorError::Status {
            status: HTTP_CONFLICT,
            message: "already exists".into(),
        }
    }

    pub fn calls(&self) -> Vec<SubmitCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: SubmitCall) -> Result<SubmitReceipt, CollaboratorError> {
        self.calls.lock().expect("calls lock").push(call);
        if let Some(err) = self.failures.lock().expect("failures lock").pop_front() {
            return Err(err);
        }
        Ok(SubmitReceipt {
            id: "created-1".into(),
            location: None,
        })
    }
}

#[async_trait]
impl Submitter for ScriptedSubmitter {
    async fn create(
        &self,
        resource: &str,
        payload: &Value,
    ) -> Result<SubmitReceipt, CollaboratorError> {
        self.record(SubmitCall {
            resource: resource.into(),
            id: None,
            payload: payload.clone(),
        })
    }

    async fn save(
        &self,
        resource: &str,
        id: &str,
        payload: &Value,
    ) -> Result<SubmitReceipt, CollaboratorError> {
        self.record(SubmitCall {
            resource: resource.into(),
            id: Some(id.into()),
            payload: payload.clone(),
        })
    }
}

/// Returns the same bookings for every query and remembers the queries.
#[derive(Default)]
pub struct FixedConflicts {
    bookings: Vec<Booking>,
    queries: Mutex<Vec<ConflictQuery>>,
}

impl FixedConflicts {
    pub fn new(bookings: Vec<Booking>) -> Self {
        Self {
            bookings,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<ConflictQuery> {
        self.queries.lock().expect("queries lock").clone()
    }
}

#[async_trait]
impl ConflictChecker for FixedConflicts {
    async fn check(&self, query: &ConflictQuery) -> Result<Vec<Booking>, CollaboratorError> {
        self.queries.lock().expect("queries lock").push(query.clone());
        Ok(self.bookings.clone())
    }
}

/// Serves the same options for every kind, or fails every fetch.
pub struct FlatOptions(pub Result<Vec<OptionItem>, String>);

#[async_trait]
impl OptionsProvider for FlatOptions {
    async fn fetch(&self, _kind: OptionsKind) -> Result<Vec<OptionItem>, CollaboratorError> {
        self.0
            .clone()
            .map_err(CollaboratorError::Unreachable)
    }
}

pub fn booking(title: &str, device: &str, start: NaiveDateTime, minutes: i64) -> Booking {
    Booking {
        title: title.into(),
        device: device.into(),
        start,
        end: start + chrono::Duration::minutes(minutes),
    }
}
