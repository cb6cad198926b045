//! Tests for the per-action progress ledger.

use crate::task::domain::{
    Action, ActionId, ActionProgressFields, ActionStatus, RobotId, TaskDomainError, TaskPlan,
    TaskProgress, Timestamp,
};
use eyre::{OptionExt, Result, ensure};
use rstest::{fixture, rstest};

fn plan_of(len: usize) -> TaskPlan {
    let robot = RobotId::new("ropod_001").expect("valid robot id");
    let actions = (0..len)
        .map(|step| Action::go_to([format!("waypoint_{step}")]))
        .collect();
    TaskPlan::new(robot, actions)
}

fn action_at(plan: &TaskPlan, index: usize) -> ActionId {
    plan.actions()
        .get(index)
        .map(Action::id)
        .expect("plan has the action")
}

#[fixture]
fn three_step_plan() -> TaskPlan {
    plan_of(3)
}

#[rstest]
fn initialize_marks_every_action_planned(three_step_plan: TaskPlan) {
    let first = action_at(&three_step_plan, 0);

    let progress = TaskProgress::initialize(first, std::slice::from_ref(&three_step_plan));

    assert_eq!(progress.current_action(), Some(first));
    assert_eq!(progress.actions().len(), 3);
    assert!(progress
        .actions()
        .iter()
        .all(|entry| entry.status() == ActionStatus::Planned));
}

#[rstest]
fn initialize_falls_back_to_first_plan_action(three_step_plan: TaskPlan) {
    let progress =
        TaskProgress::initialize(ActionId::new(), std::slice::from_ref(&three_step_plan));

    assert_eq!(
        progress.current_action(),
        Some(action_at(&three_step_plan, 0))
    );
}

#[rstest]
fn initialize_without_plan_is_empty() {
    let progress = TaskProgress::initialize(ActionId::new(), &[]);

    assert!(progress.actions().is_empty());
    assert_eq!(progress.current_action(), None);
}

#[rstest]
fn completing_first_action_advances_to_second(three_step_plan: TaskPlan) -> Result<()> {
    let first = action_at(&three_step_plan, 0);
    let mut progress = TaskProgress::initialize(first, std::slice::from_ref(&three_step_plan));

    progress.update(first, ActionStatus::Completed, ActionProgressFields::new())?;

    ensure!(progress.current_action() == Some(action_at(&three_step_plan, 1)));
    ensure!(progress.get_action(first)?.status() == ActionStatus::Completed);
    Ok(())
}

#[rstest]
fn completing_only_action_keeps_current_action() -> Result<()> {
    let plan = plan_of(1);
    let only = action_at(&plan, 0);
    let mut progress = TaskProgress::initialize(only, std::slice::from_ref(&plan));

    progress.update(only, ActionStatus::Completed, ActionProgressFields::new())?;

    ensure!(progress.current_action() == Some(only));
    progress.complete();
    ensure!(progress.current_action().is_none());
    Ok(())
}

#[rstest]
fn ongoing_update_does_not_advance(three_step_plan: TaskPlan) -> Result<()> {
    let first = action_at(&three_step_plan, 0);
    let mut progress = TaskProgress::initialize(first, std::slice::from_ref(&three_step_plan));

    progress.update(first, ActionStatus::Ongoing, ActionProgressFields::new())?;

    ensure!(progress.current_action() == Some(first));
    Ok(())
}

#[rstest]
fn update_replaces_the_whole_entry(three_step_plan: TaskPlan) -> Result<()> {
    let first = action_at(&three_step_plan, 0);
    let mut progress = TaskProgress::initialize(first, std::slice::from_ref(&three_step_plan));
    let start = Timestamp::parse("2024-01-01T10:02:00")?;

    progress.update(
        first,
        ActionStatus::Ongoing,
        ActionProgressFields::new().with_start_time(start.clone()),
    )?;
    ensure!(progress.get_action(first)?.start_time() == Some(&start));

    progress.update(
        first,
        ActionStatus::Completed,
        ActionProgressFields::new().with_finish_time(Timestamp::parse("2024-01-01T10:04:00")?),
    )?;
    let entry = progress.get_action(first)?;
    ensure!(entry.start_time().is_none());
    ensure!(entry.finish_time().is_some());
    Ok(())
}

#[rstest]
fn string_action_ids_match_typed_ids(three_step_plan: TaskPlan) -> Result<()> {
    let second = action_at(&three_step_plan, 1);
    let mut progress = TaskProgress::initialize(
        action_at(&three_step_plan, 0),
        std::slice::from_ref(&three_step_plan),
    );

    progress.update(
        second.to_string(),
        ActionStatus::Ongoing,
        ActionProgressFields::new(),
    )?;

    let entry = progress
        .actions()
        .get(1)
        .ok_or_eyre("second ledger entry")?;
    ensure!(entry.action_id() == second);
    ensure!(entry.status() == ActionStatus::Ongoing);
    Ok(())
}

#[rstest]
fn unknown_action_leaves_ledger_untouched(three_step_plan: TaskPlan) {
    let first = action_at(&three_step_plan, 0);
    let mut progress = TaskProgress::initialize(first, std::slice::from_ref(&three_step_plan));
    let before = progress.clone();
    let stranger = ActionId::new();

    let result = progress.update(stranger, ActionStatus::Completed, ActionProgressFields::new());

    assert_eq!(result, Err(TaskDomainError::ActionNotFound(stranger)));
    assert_eq!(progress.actions().len(), 3);
    assert_eq!(progress, before);
}

#[rstest]
fn malformed_action_id_is_rejected(three_step_plan: TaskPlan) {
    let mut progress = TaskProgress::initialize(
        action_at(&three_step_plan, 0),
        std::slice::from_ref(&three_step_plan),
    );

    let result = progress.update("step-2", ActionStatus::Ongoing, ActionProgressFields::new());

    assert_eq!(
        result,
        Err(TaskDomainError::MalformedIdentity("step-2".to_owned()))
    );
}

#[rstest]
#[case("planned", ActionStatus::Planned)]
#[case("ONGOING", ActionStatus::Ongoing)]
#[case("Completed", ActionStatus::Completed)]
#[case("failed", ActionStatus::Failed)]
fn action_status_parses_case_insensitively(#[case] text: &str, #[case] expected: ActionStatus) {
    assert_eq!(ActionStatus::try_from(text), Ok(expected));
}
