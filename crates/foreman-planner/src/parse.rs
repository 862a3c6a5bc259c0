//! LLM response parsing into validated task plans.
//!
//! Parsing is strict: the response must be exactly one JSON object
//! (surrounding whitespace aside) carrying a `tasks` array. Prose, code
//! fences, trailing text, and top-level arrays are all rejected as
//! [`PlanError::MalformedResponse`]. This is where an unusable response
//! stops, before anything reaches an agent.
//!
//! Validation is per task. A task with an unknown action or bad
//! parameters is dropped and reported in [`ParsedPlan::rejections`]; its
//! siblings are kept in their original order.

use std::num::NonZeroU32;

use foreman_types::{
    AttackTarget, BlockPos, BlockType, BuildTask, Dimensions, Ore, StructureKind, Task, TaskKind,
    TaskPlan,
};
use foreman_world::resolve_dimensions;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::PlanError;

/// Minimum number of block types in a Build task.
pub const MIN_BUILD_BLOCKS: usize = 2;

/// Maximum number of block types in a Build task.
pub const MAX_BUILD_BLOCKS: usize = 3;

/// A validated plan plus the tasks that did not survive validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPlan {
    /// The accepted tasks, in response order.
    pub plan: TaskPlan,
    /// Every dropped task, by its index in the response.
    pub rejections: Vec<TaskRejection>,
}

/// One task the validator dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRejection {
    /// Zero-based position of the task in the response's `tasks` array.
    pub index: usize,
    /// Why it was dropped.
    pub error: PlanError,
}

/// Top-level response shape, checked after the object test.
#[derive(Debug, serde::Deserialize)]
struct RawPlan {
    #[serde(default)]
    reasoning: String,
    #[serde(default)]
    plan: String,
    tasks: Vec<Value>,
}

/// Parse and validate a raw LLM response.
///
/// Pure function of `raw`.
///
/// # Errors
///
/// Returns [`PlanError::MalformedResponse`] if `raw` is not a single JSON
/// object with a `tasks` array. Per-task problems are not errors; they
/// are reported in [`ParsedPlan::rejections`].
pub fn parse(raw: &str) -> Result<ParsedPlan, PlanError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| PlanError::malformed(format!("not a single JSON document: {e}")))?;
    if !value.is_object() {
        return Err(PlanError::malformed("top-level value is not an object"));
    }
    let raw_plan: RawPlan = serde_json::from_value(value)
        .map_err(|e| PlanError::malformed(format!("unexpected plan shape: {e}")))?;

    let mut tasks = Vec::with_capacity(raw_plan.tasks.len());
    let mut rejections = Vec::new();
    for (index, item) in raw_plan.tasks.iter().enumerate() {
        match validate_task(item) {
            Ok(task) => tasks.push(task),
            Err(error) => {
                warn!(index, error = %error, "dropping invalid task");
                rejections.push(TaskRejection { index, error });
            }
        }
    }

    Ok(ParsedPlan {
        plan: TaskPlan {
            reasoning: raw_plan.reasoning,
            summary: raw_plan.plan,
            tasks,
        },
        rejections,
    })
}

// ---------------------------------------------------------------------------
// Per-task validation
// ---------------------------------------------------------------------------

/// Validate one entry of the `tasks` array.
fn validate_task(item: &Value) -> Result<Task, PlanError> {
    let action = item
        .get("action")
        .and_then(Value::as_str)
        .ok_or_else(|| PlanError::UnknownActionType {
            action: String::new(),
        })?;
    let kind = TaskKind::from_name(action).ok_or_else(|| PlanError::UnknownActionType {
        action: action.to_owned(),
    })?;

    let empty = Map::new();
    let params = match item.get("parameters") {
        None | Some(Value::Null) => &empty,
        Some(Value::Object(map)) => map,
        Some(_) => return Err(PlanError::invalid(kind, "parameters is not an object")),
    };

    match kind {
        TaskKind::Attack => validate_attack(params),
        TaskKind::Build => validate_build(params).map(Task::Build),
        TaskKind::Mine => validate_mine(params),
        TaskKind::Follow => validate_follow(params),
        TaskKind::Pathfind => validate_pathfind(params),
    }
}

fn validate_attack(params: &Map<String, Value>) -> Result<Task, PlanError> {
    let target = str_param(params, "target", TaskKind::Attack)?;
    if target != AttackTarget::Hostile.as_str() {
        return Err(PlanError::invalid(
            TaskKind::Attack,
            format!("target must be \"hostile\", got {target:?}"),
        ));
    }
    Ok(Task::Attack {
        target: AttackTarget::Hostile,
    })
}

fn validate_build(params: &Map<String, Value>) -> Result<BuildTask, PlanError> {
    let name = str_param(params, "structure", TaskKind::Build)?;
    let structure = StructureKind::from_name(name).ok_or_else(|| {
        PlanError::invalid(TaskKind::Build, format!("unknown structure {name:?}"))
    })?;

    let entries = params
        .get("blocks")
        .and_then(Value::as_array)
        .ok_or_else(|| PlanError::invalid(TaskKind::Build, "blocks must be an array"))?;
    if !(MIN_BUILD_BLOCKS..=MAX_BUILD_BLOCKS).contains(&entries.len()) {
        return Err(PlanError::invalid(
            TaskKind::Build,
            format!(
                "blocks must list {MIN_BUILD_BLOCKS} to {MAX_BUILD_BLOCKS} types, got {}",
                entries.len()
            ),
        ));
    }
    let blocks = entries
        .iter()
        .map(|entry| {
            entry
                .as_str()
                .and_then(BlockType::from_name)
                .ok_or_else(|| {
                    PlanError::invalid(TaskKind::Build, format!("unknown block type {entry}"))
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let requested = params.get("dimensions").and_then(parse_dimensions);
    if requested.is_none() {
        debug!(structure = %structure, "using default footprint");
    }

    Ok(BuildTask {
        structure,
        blocks,
        dimensions: resolve_dimensions(structure, requested),
    })
}

/// Three positive integers, or `None`.
fn parse_dimensions(value: &Value) -> Option<Dimensions> {
    let axis = |v: &Value| v.as_u64().and_then(|n| u32::try_from(n).ok());
    match value.as_array()?.as_slice() {
        [w, h, d] => Dimensions::new(axis(w)?, axis(h)?, axis(d)?),
        _ => None,
    }
}

fn validate_mine(params: &Map<String, Value>) -> Result<Task, PlanError> {
    let name = params
        .get("block")
        .or_else(|| params.get("resource"))
        .and_then(Value::as_str)
        .ok_or_else(|| PlanError::invalid(TaskKind::Mine, "missing string parameter `block`"))?;
    let ore = Ore::from_name(name)
        .ok_or_else(|| PlanError::invalid(TaskKind::Mine, format!("unknown ore {name:?}")))?;

    let quantity = params
        .get("quantity")
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .and_then(NonZeroU32::new)
        .ok_or_else(|| PlanError::invalid(TaskKind::Mine, "quantity must be a positive integer"))?;

    Ok(Task::Mine { ore, quantity })
}

fn validate_follow(params: &Map<String, Value>) -> Result<Task, PlanError> {
    let player = str_param(params, "player", TaskKind::Follow)?.trim();
    if player.is_empty() {
        return Err(PlanError::invalid(TaskKind::Follow, "player must not be empty"));
    }
    Ok(Task::Follow {
        player: player.to_owned(),
    })
}

fn validate_pathfind(params: &Map<String, Value>) -> Result<Task, PlanError> {
    let coord = |key: &str| {
        params
            .get(key)
            .and_then(Value::as_i64)
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| {
                PlanError::invalid(
                    TaskKind::Pathfind,
                    format!("`{key}` must be an integer block coordinate"),
                )
            })
    };
    Ok(Task::Pathfind {
        target: BlockPos::new(coord("x")?, coord("y")?, coord("z")?),
    })
}

fn str_param<'a>(
    params: &'a Map<String, Value>,
    key: &str,
    kind: TaskKind,
) -> Result<&'a str, PlanError> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| PlanError::invalid(kind, format!("missing string parameter `{key}`")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn dims(w: u32, h: u32, d: u32) -> Dimensions {
        Dimensions::new(w, h, d).unwrap()
    }

    #[test]
    fn parses_attack_build_mine() {
        let raw = r#"{"reasoning":"r","plan":"p","tasks":[
            {"action":"attack","parameters":{"target":"hostile"}},
            {"action":"build","parameters":{"structure":"house","blocks":["oak_planks","cobblestone"],"dimensions":[9,6,9]}},
            {"action":"mine","parameters":{"block":"iron","quantity":8}}]}"#;
        let parsed = parse(raw).unwrap();

        assert!(parsed.rejections.is_empty());
        assert_eq!(parsed.plan.reasoning, "r");
        assert_eq!(parsed.plan.summary, "p");
        assert_eq!(
            parsed.plan.tasks,
            vec![
                Task::Attack {
                    target: AttackTarget::Hostile
                },
                Task::Build(BuildTask {
                    structure: StructureKind::House,
                    blocks: vec![BlockType::OakPlanks, BlockType::Cobblestone],
                    dimensions: dims(9, 6, 9),
                }),
                Task::Mine {
                    ore: Ore::Iron,
                    quantity: NonZeroU32::new(8).unwrap(),
                },
            ]
        );
    }

    #[test]
    fn prose_is_malformed() {
        let err = parse("build a house please").unwrap_err();
        assert!(matches!(err, PlanError::MalformedResponse { .. }));
    }

    #[test]
    fn empty_input_is_malformed() {
        assert!(matches!(parse(""), Err(PlanError::MalformedResponse { .. })));
        assert!(matches!(parse("   \n"), Err(PlanError::MalformedResponse { .. })));
    }

    #[test]
    fn code_fence_is_malformed() {
        let raw = "```json\n{\"tasks\": []}\n```";
        assert!(matches!(parse(raw), Err(PlanError::MalformedResponse { .. })));
    }

    #[test]
    fn trailing_content_is_malformed() {
        let raw = r#"{"tasks": []} and then some"#;
        assert!(matches!(parse(raw), Err(PlanError::MalformedResponse { .. })));
        let raw = r#"{"tasks": []}{"tasks": []}"#;
        assert!(matches!(parse(raw), Err(PlanError::MalformedResponse { .. })));
    }

    #[test]
    fn non_object_documents_are_malformed() {
        assert!(matches!(parse("[]"), Err(PlanError::MalformedResponse { .. })));
        assert!(matches!(parse(r#"["r", "p", []]"#), Err(PlanError::MalformedResponse { .. })));
        assert!(matches!(parse("42"), Err(PlanError::MalformedResponse { .. })));
    }

    #[test]
    fn missing_tasks_is_malformed() {
        let raw = r#"{"reasoning": "thinking", "plan": "nothing"}"#;
        assert!(matches!(parse(raw), Err(PlanError::MalformedResponse { .. })));
        let raw = r#"{"tasks": {"action": "attack"}}"#;
        assert!(matches!(parse(raw), Err(PlanError::MalformedResponse { .. })));
    }

    #[test]
    fn surrounding_whitespace_is_allowed() {
        let parsed = parse("\n  {\"tasks\": []}  \n").unwrap();
        assert!(parsed.plan.is_empty());
        assert!(parsed.plan.reasoning.is_empty());
    }

    #[test]
    fn unknown_structure_drops_only_that_task() {
        let raw = r#"{"tasks":[
            {"action":"build","parameters":{"structure":"castle9000","blocks":["oak_planks","glass_pane"]}},
            {"action":"follow","parameters":{"player":"Alice"}}]}"#;
        let parsed = parse(raw).unwrap();

        assert_eq!(
            parsed.plan.tasks,
            vec![Task::Follow {
                player: "Alice".to_owned()
            }]
        );
        assert_eq!(parsed.rejections.len(), 1);
        let rejection = &parsed.rejections[0];
        assert_eq!(rejection.index, 0);
        assert!(matches!(
            rejection.error,
            PlanError::InvalidTaskParameter {
                action: TaskKind::Build,
                ..
            }
        ));
    }

    #[test]
    fn unknown_action_is_reported_by_tag() {
        let raw = r#"{"tasks":[{"action":"dance"},{"action":"attack","parameters":{"target":"hostile"}}]}"#;
        let parsed = parse(raw).unwrap();
        assert_eq!(parsed.plan.tasks.len(), 1);
        assert_eq!(
            parsed.rejections[0].error,
            PlanError::UnknownActionType {
                action: "dance".to_owned()
            }
        );
    }

    #[test]
    fn action_tags_ignore_case() {
        let raw = r#"{"tasks":[{"action":" ATTACK ","parameters":{"target":"hostile"}}]}"#;
        assert_eq!(parse(raw).unwrap().plan.tasks.len(), 1);
    }

    #[test]
    fn attack_requires_hostile() {
        for target in [r#""zombie""#, r#""Hostile""#, "3"] {
            let raw = format!(r#"{{"tasks":[{{"action":"attack","parameters":{{"target":{target}}}}}]}}"#);
            let parsed = parse(&raw).unwrap();
            assert!(parsed.plan.tasks.is_empty(), "accepted target {target}");
            assert_eq!(parsed.rejections.len(), 1);
        }
    }

    #[test]
    fn bad_dimensions_fall_back_to_default() {
        for dimensions in ["[0,6,9]", "[-1,6,9]", "[9,6]", "\"big\"", "[9.5,6,9]"] {
            let raw = format!(
                r#"{{"tasks":[{{"action":"build","parameters":{{"structure":"barn","blocks":["oak_planks","stone_bricks"],"dimensions":{dimensions}}}}}]}}"#
            );
            let parsed = parse(&raw).unwrap();
            let Some(Task::Build(build)) = parsed.plan.tasks.first() else {
                panic!("build rejected for dimensions {dimensions}");
            };
            assert_eq!(build.dimensions, dims(12, 8, 14), "dimensions {dimensions}");
        }
    }

    #[test]
    fn missing_dimensions_use_template_footprint() {
        let raw = r#"{"tasks":[{"action":"build","parameters":{"structure":"OldHouse","blocks":["cobblestone","glass_pane","stone_bricks"]}}]}"#;
        let Some(Task::Build(build)) = parse(raw).unwrap().plan.tasks.pop() else {
            panic!("build rejected");
        };
        assert_eq!(build.structure, StructureKind::OldHouse);
        assert_eq!(build.dimensions, dims(10, 7, 10));
    }

    #[test]
    fn block_list_must_have_two_or_three_palette_entries() {
        for blocks in [r#"["oak_planks"]"#, r#"["oak_planks","cobblestone","glass_pane","stone_bricks"]"#, r#"["oak_planks","dirt"]"#, "[]"] {
            let raw = format!(
                r#"{{"tasks":[{{"action":"build","parameters":{{"structure":"house","blocks":{blocks}}}}}]}}"#
            );
            let parsed = parse(&raw).unwrap();
            assert!(parsed.plan.tasks.is_empty(), "accepted blocks {blocks}");
        }
    }

    #[test]
    fn mine_accepts_resource_alias() {
        let raw = r#"{"tasks":[{"action":"mine","parameters":{"resource":"Diamond","quantity":3}}]}"#;
        assert_eq!(
            parse(raw).unwrap().plan.tasks,
            vec![Task::Mine {
                ore: Ore::Diamond,
                quantity: NonZeroU32::new(3).unwrap()
            }]
        );
    }

    #[test]
    fn mine_quantity_must_be_positive_integer() {
        for quantity in ["0", "-4", "2.5", "\"eight\"", "99999999999"] {
            let raw = format!(
                r#"{{"tasks":[{{"action":"mine","parameters":{{"block":"coal","quantity":{quantity}}}}}]}}"#
            );
            assert!(parse(&raw).unwrap().plan.tasks.is_empty(), "accepted quantity {quantity}");
        }
        let raw = r#"{"tasks":[{"action":"mine","parameters":{"block":"dirt","quantity":1}}]}"#;
        assert!(parse(raw).unwrap().plan.tasks.is_empty());
    }

    #[test]
    fn follow_requires_a_name() {
        let raw = r#"{"tasks":[{"action":"follow","parameters":{"player":"  "}},{"action":"follow"}]}"#;
        let parsed = parse(raw).unwrap();
        assert!(parsed.plan.tasks.is_empty());
        assert_eq!(parsed.rejections.len(), 2);
    }

    #[test]
    fn pathfind_requires_i32_coordinates() {
        let raw = r#"{"tasks":[{"action":"pathfind","parameters":{"x":10,"y":-60,"z":3}}]}"#;
        assert_eq!(
            parse(raw).unwrap().plan.tasks,
            vec![Task::Pathfind {
                target: BlockPos::new(10, -60, 3)
            }]
        );

        let raw = r#"{"tasks":[{"action":"pathfind","parameters":{"x":10,"y":64,"z":3000000000}}]}"#;
        assert!(parse(raw).unwrap().plan.tasks.is_empty());
        let raw = r#"{"tasks":[{"action":"pathfind","parameters":{"x":10,"y":64}}]}"#;
        assert!(parse(raw).unwrap().plan.tasks.is_empty());
    }

    #[test]
    fn non_object_task_entries_are_rejected() {
        let raw = r#"{"tasks":["attack", 7, {"action":"attack","parameters":{"target":"hostile"}}]}"#;
        let parsed = parse(raw).unwrap();
        assert_eq!(parsed.plan.tasks.len(), 1);
        let indices: Vec<_> = parsed.rejections.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn parameters_must_be_an_object() {
        let raw = r#"{"tasks":[{"action":"mine","parameters":["iron", 8]}]}"#;
        let parsed = parse(raw).unwrap();
        assert!(matches!(
            parsed.rejections[0].error,
            PlanError::InvalidTaskParameter {
                action: TaskKind::Mine,
                ..
            }
        ));
    }

    #[test]
    fn parse_is_deterministic() {
        let raw = r#"{"tasks":[{"action":"build","parameters":{"structure":"tower","blocks":["cobblestone","stone_bricks"]}}]}"#;
        assert_eq!(parse(raw).unwrap(), parse(raw).unwrap());
    }
}
