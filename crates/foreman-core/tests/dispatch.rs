//! Command dispatch through a scripted backend.

#![allow(clippy::unwrap_used, clippy::panic, clippy::indexing_slicing)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{Reply, SameSpot, ScriptedBackend, ScriptedWorld, fleet};
use foreman_agents::AgentError;
use foreman_core::{Commander, SpawnSpec};
use foreman_planner::{PlanError, PromptComposer};
use foreman_types::{BlockPos, Command, Ore, Task, TaskKind};

const MIXED_PLAN: &str = r#"{"reasoning":"gear up","plan":"mine then follow","tasks":[
    {"action":"mine","parameters":{"block":"iron","quantity":8}},
    {"action":"build","parameters":{"structure":"castle9000","blocks":["oak_planks","cobblestone"]}},
    {"action":"follow","parameters":{"player":"Alice"}}]}"#;

fn commander(backend: ScriptedBackend) -> Commander<ScriptedBackend> {
    Commander::new(
        backend,
        PromptComposer::new().unwrap(),
        Arc::new(SameSpot(BlockPos::new(7, 64, -3))),
        Duration::from_secs(7),
    )
}

fn one_agent(world: &Arc<ScriptedWorld>) -> foreman_core::FleetManager<ScriptedWorld> {
    let mut fleet = fleet(world);
    fleet
        .reset_fleet(&[SpawnSpec::new("Steve", BlockPos::new(7, 64, -3))])
        .unwrap();
    fleet
}

#[tokio::test]
async fn valid_tasks_are_queued_in_plan_order() {
    let world = Arc::new(ScriptedWorld::default());
    let fleet = one_agent(&world);
    let agent = fleet.agent_by_name("Steve").unwrap();
    let commander = commander(ScriptedBackend::text(MIXED_PLAN));

    let report = commander
        .dispatch(agent, &Command::new("Alice", "get iron and come here"))
        .await;

    assert_eq!(report.enqueued, 2);
    assert!(report.diagnostic.is_none());
    assert_eq!(report.plan.summary, "mine then follow");
    assert_eq!(report.rejections.len(), 1);
    assert_eq!(report.rejections[0].index, 1);

    agent.wait_idle().await;
    let kinds: Vec<TaskKind> = world.performed().iter().map(|(_, t)| t.kind()).collect();
    assert_eq!(kinds, vec![TaskKind::Mine, TaskKind::Follow]);
    assert!(matches!(
        world.performed()[0].1,
        Task::Mine { ore: Ore::Iron, .. }
    ));
}

#[tokio::test]
async fn prompt_carries_command_and_situation() {
    let world = Arc::new(ScriptedWorld::default());
    let fleet = one_agent(&world);
    let agent = fleet.agent_by_name("Steve").unwrap();
    let commander = commander(ScriptedBackend::text(r#"{"tasks":[]}"#));

    commander
        .dispatch(agent, &Command::new("Alice", "construye una casa"))
        .await;

    let prompts = commander.backend().prompts.lock().unwrap().clone();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].user.contains("Position: [7, 64, -3]"));
    assert!(prompts[0].user.contains("\"construye una casa\""));
    assert!(prompts[0].user.contains("Nearby Players: Alice"));
}

#[tokio::test]
async fn malformed_reply_queues_nothing() {
    let world = Arc::new(ScriptedWorld::default());
    let fleet = one_agent(&world);
    let agent = fleet.agent_by_name("Steve").unwrap();
    let commander = commander(ScriptedBackend::new(vec![
        Reply::Text("build a house please".to_owned()),
        Reply::Text(r#"{"tasks":[{"action":"attack","parameters":{"target":"hostile"}}]}"#.to_owned()),
    ]));

    let report = commander
        .dispatch(agent, &Command::new("Alice", "build a house"))
        .await;
    assert_eq!(report.enqueued, 0);
    assert!(report.plan.is_empty());
    assert!(matches!(
        report.diagnostic,
        Some(PlanError::MalformedResponse { .. })
    ));
    assert_eq!(agent.status().queued, 0);

    let report = commander
        .dispatch(agent, &Command::new("Alice", "kill the zombies"))
        .await;
    assert_eq!(report.enqueued, 1);
}

#[tokio::test(start_paused = true)]
async fn slow_backend_times_out_and_agent_stays_usable() {
    let world = Arc::new(ScriptedWorld::default());
    let fleet = one_agent(&world);
    let agent = fleet.agent_by_name("Steve").unwrap();
    let commander = commander(ScriptedBackend::new(vec![
        Reply::Hang,
        Reply::Text(r#"{"tasks":[{"action":"follow","parameters":{"player":"Alice"}}]}"#.to_owned()),
    ]));

    let report = commander
        .dispatch(agent, &Command::new("Alice", "follow me"))
        .await;
    let Some(PlanError::MalformedResponse { reason }) = report.diagnostic.clone() else {
        panic!("expected a timeout diagnostic, got {:?}", report.diagnostic);
    };
    assert!(reason.contains("7000 ms"), "{reason}");
    assert_eq!(report.enqueued, 0);

    let report = commander
        .dispatch(agent, &Command::new("Alice", "follow me"))
        .await;
    assert_eq!(report.enqueued, 1);
}

#[tokio::test]
async fn backend_error_degrades_to_empty_plan() {
    let world = Arc::new(ScriptedWorld::default());
    let fleet = one_agent(&world);
    let agent = fleet.agent_by_name("Steve").unwrap();
    let commander = commander(ScriptedBackend::new(vec![Reply::Fail]));

    let report = commander
        .dispatch(agent, &Command::new("Alice", "mine diamonds"))
        .await;
    assert_eq!(report.enqueued, 0);
    assert!(matches!(
        report.diagnostic,
        Some(PlanError::MalformedResponse { .. })
    ));
    assert!(report.to_string().starts_with("no plan"));
}

#[tokio::test]
async fn despawned_agent_refuses_commands() {
    let world = Arc::new(ScriptedWorld::default());
    let mut fleet = one_agent(&world);
    let agent = fleet.agent_by_name("Steve").unwrap().clone();
    fleet.teardown();

    let commander = commander(ScriptedBackend::text(MIXED_PLAN));
    let report = commander
        .dispatch(&agent, &Command::new("Alice", "mine iron"))
        .await;

    assert_eq!(report.refused, Some(AgentError::Despawned(agent.id())));
    assert_eq!(report.enqueued, 0);
    assert!(commander.backend().prompts.lock().unwrap().is_empty());
}
