//! End-to-end tests through the builder and the API surface.

use std::sync::Arc;

use prometheus_placement::builders::SchedulerBuilder;
use prometheus_placement::config::{PlacementMode, SchedulerConfig};
use prometheus_placement::core::{
    AllOptionsPolicy, EnactmentGraph, EnactmentMode, Mapping, MappingCatalog, Resource,
    ScheduleAction, SchedulerError, Specification, Task, UniformCapacity,
};
use prometheus_placement::runtime::{
    health, schedule_by_id, ScheduleRequest, ScheduleStatus, TokioSpawner,
};

fn spec() -> Arc<Specification> {
    let graph = EnactmentGraph::new()
        .with_task(Task::user("resize"))
        .with_task(Task::user("thumb"))
        .with_task(Task::user("encode"))
        .with_task(Task::other("join"));
    let catalog = MappingCatalog::new()
        .with_mapping(Mapping::new("resize", "edge", EnactmentMode::Local, "native"))
        .with_mapping(Mapping::new("thumb", "edge", EnactmentMode::Local, "native"))
        .with_mapping(Mapping::new("encode", "edge", EnactmentMode::Local, "native"))
        .with_mapping(Mapping::new("encode", "lambda", EnactmentMode::Serverless, "encode-fn"));
    Arc::new(
        Specification::new(graph, catalog)
            .with_resource(Resource::limited("edge"))
            .with_resource(Resource::new("lambda")),
    )
}

#[tokio::test]
async fn test_schedule_by_id_reports_status() {
    let (builder, audit) = SchedulerBuilder::default()
        .specification(Arc::new(spec()))
        .calculator(Arc::new(UniformCapacity::new(2).unwrap()))
        .in_memory_audit();
    let scheduler = builder.build(TokioSpawner::current()).unwrap();

    let resize = schedule_by_id(&scheduler, ScheduleRequest { task_id: "resize".into() }).await;
    assert_eq!(resize.status, ScheduleStatus::Scheduled);
    assert_eq!(resize.mappings[0].target, "edge");

    let thumb = schedule_by_id(&scheduler, ScheduleRequest { task_id: "thumb".into() }).await;
    assert_eq!(thumb.status, ScheduleStatus::Scheduled);

    // Edge holds two tasks; the encode request only fits on lambda now.
    let encode = schedule_by_id(&scheduler, ScheduleRequest { task_id: "encode".into() }).await;
    assert_eq!(encode.status, ScheduleStatus::Scheduled);
    assert_eq!(encode.mappings[0].target, "lambda");

    let join = schedule_by_id(&scheduler, ScheduleRequest { task_id: "join".into() }).await;
    assert_eq!(join.status, ScheduleStatus::NotApplicable);

    let ghost = schedule_by_id(&scheduler, ScheduleRequest { task_id: "ghost".into() }).await;
    assert_eq!(ghost.status, ScheduleStatus::Failed);
    assert!(ghost.reason.unwrap().contains("ghost"));

    let actions: Vec<_> = audit.events().iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            ScheduleAction::Scheduled,
            ScheduleAction::Scheduled,
            ScheduleAction::Scheduled,
            ScheduleAction::NotApplicable,
        ]
    );
    assert!(health().ok);
}

#[tokio::test]
async fn test_backpressure_status_when_full() {
    let scheduler = SchedulerBuilder::default()
        .specification(Arc::new(spec()))
        .calculator(Arc::new(UniformCapacity::new(1).unwrap()))
        .build(TokioSpawner::current())
        .unwrap();

    let first = schedule_by_id(&scheduler, ScheduleRequest { task_id: "resize".into() }).await;
    assert_eq!(first.status, ScheduleStatus::Scheduled);
    let second = schedule_by_id(&scheduler, ScheduleRequest { task_id: "thumb".into() }).await;
    assert_eq!(second.status, ScheduleStatus::Backpressure);
    assert!(second.mappings.is_empty());
}

#[tokio::test]
async fn test_multi_placement_commits_every_choice() {
    let config = SchedulerConfig {
        placement: PlacementMode::Multi,
        ..SchedulerConfig::default()
    };
    let scheduler = SchedulerBuilder::new(config)
        .specification(Arc::new(spec()))
        .calculator(Arc::new(UniformCapacity::new(4).unwrap()))
        .policy(Arc::new(AllOptionsPolicy))
        .build(TokioSpawner::current())
        .unwrap();

    let schedule = scheduler.schedule(&Task::user("encode")).await.unwrap();
    assert_eq!(schedule.len(), 2);
    for res in ["edge", "lambda"] {
        assert!(scheduler.specification().resource(res).unwrap().is_used_by("encode"));
    }
    assert!(matches!(
        schedule.single(),
        Err(SchedulerError::InvalidSchedule { count: 2, .. })
    ));
}

#[tokio::test]
async fn test_single_placement_rejects_multi_choice() {
    let scheduler = SchedulerBuilder::default()
        .specification(Arc::new(spec()))
        .calculator(Arc::new(UniformCapacity::new(4).unwrap()))
        .policy(Arc::new(AllOptionsPolicy))
        .build(TokioSpawner::current())
        .unwrap();

    let handle = scheduler.schedule_task(&Task::user("encode")).unwrap();
    assert!(matches!(
        handle.wait().await,
        Err(SchedulerError::PolicyContract(_))
    ));
    assert!(!scheduler.specification().resource("edge").unwrap().is_used_by("encode"));
    assert!(!scheduler.specification().resource("lambda").unwrap().is_used_by("encode"));
}
