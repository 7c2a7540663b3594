mod common;

use admin_wizard::flows::WizardKind;
use admin_wizard::wizard::{Transition, WizardState};
use serde_json::json;

use common::wizard;

#[test]
fn next_stays_put_while_the_name_is_empty() {
    let mut wizard = wizard(WizardKind::NewAcl);
    assert_eq!(wizard.current_index(), Some(0));

    let transition = wizard.next().unwrap();

    assert_eq!(transition, Transition::Blocked { at: 0 });
    assert_eq!(wizard.current_index(), Some(0));
    assert_eq!(
        wizard.step_failures(0),
        vec![("metadata/name".to_string(), "required".to_string())]
    );
}

#[test]
fn valid_name_advances_and_survives_going_back() {
    let mut wizard = wizard(WizardKind::NewAcl);
    let status = wizard.set_field("metadata", "name", json!("Team A")).unwrap();
    assert!(status.is_valid());

    assert_eq!(wizard.next().unwrap(), Transition::Moved { from: 0, to: 1 });
    assert_eq!(wizard.current_step().map(|step| step.name()), Some("access"));

    assert_eq!(wizard.previous().unwrap(), Transition::Moved { from: 1, to: 0 });
    assert_eq!(wizard.payload().lookup("metadata/name"), &json!("Team A"));
}

#[test]
fn next_advances_exactly_one_step() {
    let mut wizard = wizard(WizardKind::NewAcl);
    wizard.set_field("metadata", "name", json!("Team A")).unwrap();
    wizard.next().unwrap();
    wizard
        .set_field("access", "policies", json!([{ "role": "ROLE_ADMIN", "read": true, "write": true }]))
        .unwrap();

    assert_eq!(wizard.next().unwrap(), Transition::Moved { from: 1, to: 2 });
    assert!(wizard.is_last_step());
    assert_eq!(wizard.next().unwrap(), Transition::Unchanged { at: 2 });
    assert_eq!(wizard.previous().unwrap().position(), 1);
}

#[test]
fn incomplete_access_rules_block_with_notices() {
    let mut wizard = wizard(WizardKind::NewAcl);
    wizard.set_field("metadata", "name", json!("Team A")).unwrap();
    wizard.next().unwrap();
    wizard
        .set_field("access", "policies", json!([{ "role": "ROLE_USER", "read": true }]))
        .unwrap();

    assert_eq!(wizard.next().unwrap(), Transition::Blocked { at: 1 });
    assert!(wizard.notifications().contains("MISSING_ACL_RULES"));

    // any edit clears the step notices
    wizard
        .set_field("access", "policies", json!([{ "role": "ROLE_ADMIN", "read": true, "write": true }]))
        .unwrap();
    assert!(!wizard.notifications().contains("MISSING_ACL_RULES"));
    assert!(wizard.next().unwrap().moved());
}

#[test]
fn forward_jumps_need_every_earlier_step_valid() {
    let mut wizard = wizard(WizardKind::NewAcl);
    assert_eq!(wizard.jump_to_step("summary").unwrap(), Transition::Blocked { at: 0 });

    wizard.set_field("metadata", "name", json!("Team A")).unwrap();
    wizard
        .set_field("access", "policies", json!([{ "role": "ROLE_ADMIN", "read": true, "write": true }]))
        .unwrap();
    assert_eq!(
        wizard.jump_to_step("summary").unwrap(),
        Transition::Moved { from: 0, to: 2 }
    );
    assert_eq!(wizard.jump_to(0).unwrap(), Transition::Moved { from: 2, to: 0 });
}

#[test]
fn payload_has_one_entry_per_step_in_declared_order() {
    let mut wizard = wizard(WizardKind::NewEvent);
    wizard.set_field("access", "template", json!("public")).unwrap();
    wizard.set_field("metadata", "title", json!("Lecture 1")).unwrap();

    let payload = wizard.payload();
    assert_eq!(
        payload.names().collect::<Vec<_>>(),
        vec!["metadata", "source", "access", "summary"]
    );

    let json = serde_json::to_string(&payload.to_json()).unwrap();
    let positions: Vec<usize> = ["\"metadata\"", "\"source\"", "\"access\"", "\"summary\""]
        .iter()
        .map(|key| json.find(key).unwrap())
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn payload_does_not_depend_on_edit_order() {
    let policies = json!([{ "role": "ROLE_ADMIN", "read": true, "write": true }]);

    let mut in_order = wizard(WizardKind::NewEvent);
    in_order.set_field("metadata", "title", json!("Lecture 1")).unwrap();
    in_order.set_field("source", "tracks", json!(["lecture.mp4"])).unwrap();
    in_order.set_field("access", "policies", policies.clone()).unwrap();

    let mut shuffled = wizard(WizardKind::NewEvent);
    shuffled.set_field("access", "policies", policies).unwrap();
    shuffled.set_field("metadata", "title", json!("Lecture 1")).unwrap();
    assert!(shuffled.next().unwrap().moved());
    shuffled.set_field("source", "tracks", json!(["lecture.mp4"])).unwrap();
    assert!(shuffled.previous().unwrap().moved());

    assert_eq!(
        shuffled.payload().names().collect::<Vec<_>>(),
        vec!["metadata", "source", "access", "summary"]
    );
    assert_eq!(shuffled.payload().to_json(), in_order.payload().to_json());
}

#[test]
fn reopening_resets_every_draft() {
    let mut wizard = wizard(WizardKind::NewAcl);
    let fresh_valid = wizard.step_is_valid(0);
    wizard.set_field("metadata", "name", json!("Team A")).unwrap();
    wizard.next().unwrap();
    wizard
        .set_field("access", "policies", json!([{ "role": "ROLE_ADMIN", "read": true, "write": true }]))
        .unwrap();

    wizard.reopen();

    assert_eq!(wizard.state(), WizardState::AtStep(0));
    assert_eq!(wizard.step_is_valid(0), fresh_valid);
    assert_eq!(wizard.payload().lookup("metadata/name"), &json!(""));
    assert_eq!(wizard.payload().lookup("access/policies"), &json!([]));
}

#[test]
fn summary_previews_other_steps_on_entry() {
    let mut wizard = wizard(WizardKind::NewGroup);
    wizard.set_field("metadata", "name", json!("Tutors")).unwrap();
    wizard.jump_to_step("summary").unwrap();

    let preview = wizard.current_step().unwrap().state().describe();
    assert!(preview.iter().any(|line| line.contains("name=Tutors")));
}
