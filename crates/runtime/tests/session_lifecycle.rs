use std::sync::Arc;
use std::time::Duration;

use battle_core::{
    Army, BattleEvent, BattleOutcome, BattleStatus, BuildingKind, BuildingSpec, DeployError, Point,
    TroopId, TroopKind, VillageLayout,
};
use battle_runtime::{
    AttackerId, BattleId, EventEnvelope, InMemoryResultSink, RuntimeConfig, RuntimeError,
    SessionManager, StaticVillageOracle, Subscription, VillageId, Viewer,
};

const VILLAGE: VillageId = VillageId(1);
const ATTACKER: AttackerId = AttackerId(7);

fn manager_with(config: RuntimeConfig) -> (SessionManager, Arc<InMemoryResultSink>) {
    let layout = VillageLayout::new(vec![BuildingSpec::new(1, BuildingKind::GoldMine, 10, 10)]);
    let villages = StaticVillageOracle::new().with_village(VILLAGE, layout);
    let sink = Arc::new(InMemoryResultSink::new());
    let manager = SessionManager::new(config, Arc::new(villages), sink.clone());
    (manager, sink)
}

fn manager() -> (SessionManager, Arc<InMemoryResultSink>) {
    manager_with(RuntimeConfig::default())
}

async fn drain(feed: &mut Subscription) -> Vec<EventEnvelope> {
    let mut events = Vec::new();
    while let Some(envelope) = feed.recv().await {
        events.push(envelope);
    }
    events
}

fn final_result(events: &[EventEnvelope]) -> battle_core::BattleResult {
    match &events.last().expect("stream was empty").event {
        BattleEvent::BattleEnd(result) => result.clone(),
        other => panic!("last event was {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn raid_runs_to_full_destruction() {
    let (manager, sink) = manager();
    let handle = manager
        .create_battle(ATTACKER, VILLAGE, Army::new().with(TroopKind::Barbarian, 3))
        .await
        .unwrap();
    assert_eq!(handle.battle_id(), BattleId(1));
    assert_eq!(manager.active_battles().await, vec![BattleId(1)]);

    let mut feed = manager
        .join_battle(handle.battle_id(), VILLAGE, Viewer::Attacker)
        .await
        .unwrap();
    for expected in 0..3 {
        let troop = handle
            .deploy_troop(TroopKind::Barbarian, Point::new(5.5, 5.5))
            .await
            .unwrap();
        assert_eq!(troop, TroopId(expected));
    }

    let events = drain(&mut feed).await;

    for (index, envelope) in events.iter().enumerate() {
        assert_eq!(envelope.sequence, index as u64);
        assert_eq!(envelope.battle_id, handle.battle_id());
    }
    assert!(events.windows(2).all(|pair| pair[0].timestamp_ms <= pair[1].timestamp_ms));
    assert!(events[..3].iter().all(|e| matches!(e.event, BattleEvent::TroopSpawn(_))));
    assert_eq!(events.iter().filter(|e| e.event.is_battle_end()).count(), 1);
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e.event, BattleEvent::BuildingDestroyed(_)))
            .count(),
        1
    );

    let result = final_result(&events);
    assert_eq!(result.outcome, BattleOutcome::AllDestroyed);
    assert_eq!(result.destruction_percentage, 100);
    assert_eq!(result.stars, 2);
    assert_eq!(result.loot_gold, 500);
    assert_eq!(result.loot_elixir, 0);
    assert_eq!(result.duration_ms, events.last().unwrap().timestamp_ms);

    let record = sink.find(handle.battle_id()).unwrap().unwrap();
    assert_eq!(record.village_id, VILLAGE);
    assert_eq!(record.attacker, ATTACKER);
    assert_eq!(record.result, result);
    assert!(manager.active_battles().await.is_empty());
    assert!(handle.is_ended());
}

#[tokio::test(start_paused = true)]
async fn lookups_fail_with_typed_errors() {
    let (manager, _) = manager();

    let err = manager
        .create_battle(ATTACKER, VillageId(99), Army::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::VillageNotFound(VillageId(99))));

    let err = manager
        .deploy_troop(BattleId(42), TroopKind::Giant, Point::new(1.0, 1.0))
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::SessionNotFound(BattleId(42))));

    let handle = manager
        .create_battle(ATTACKER, VILLAGE, Army::new())
        .await
        .unwrap();
    let err = manager
        .join_battle(handle.battle_id(), VillageId(2), Viewer::Spectator(1))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::VillageMismatch {
            expected: VILLAGE,
            provided: VillageId(2),
            ..
        }
    ));

    manager.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn rejected_deployments_leave_the_battle_untouched() {
    let (manager, _) = manager();
    let handle = manager
        .create_battle(ATTACKER, VILLAGE, Army::new().with(TroopKind::Archer, 1))
        .await
        .unwrap();

    let err = handle
        .deploy_troop(TroopKind::Archer, Point::new(-1.0, 5.0))
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Deploy(DeployError::OutOfBounds { .. })));

    let err = handle
        .deploy_troop(TroopKind::Giant, Point::new(1.5, 1.5))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Deploy(DeployError::NoTroopsRemaining {
            kind: TroopKind::Giant
        })
    ));

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.status, BattleStatus::Preparing);
    assert!(snapshot.troops.is_empty());
    assert_eq!(snapshot.army.remaining(TroopKind::Archer), 1);
    assert_eq!(snapshot.elapsed_ms, 0);

    manager.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn surrender_ends_the_battle_and_unregisters_it() {
    let (manager, sink) = manager();
    let handle = manager
        .create_battle(ATTACKER, VILLAGE, Army::new().with(TroopKind::Giant, 2))
        .await
        .unwrap();
    let mut spectator = manager
        .join_battle(handle.battle_id(), VILLAGE, Viewer::Spectator(3))
        .await
        .unwrap();
    assert_eq!(handle.snapshot().await.unwrap().spectators, 1);

    handle
        .deploy_troop(TroopKind::Giant, Point::new(2.5, 2.5))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    let result = manager.surrender(handle.battle_id()).await.unwrap();
    assert_eq!(result.outcome, BattleOutcome::Surrendered);
    assert!(result.duration_ms > 0);

    let events = drain(&mut spectator).await;
    assert_eq!(final_result(&events), result);

    let err = manager.snapshot(handle.battle_id()).await.unwrap_err();
    assert!(matches!(err, RuntimeError::SessionNotFound(_)));
    let err = handle.join(Viewer::Spectator(4)).await.unwrap_err();
    assert!(matches!(err, RuntimeError::SessionEnded(_)));
    assert_eq!(sink.records().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn absent_attacker_abandons_after_the_grace_period() {
    let config = RuntimeConfig::default().with_disconnect_grace(Duration::from_secs(5));
    let (manager, sink) = manager_with(config);
    let handle = manager
        .create_battle(ATTACKER, VILLAGE, Army::new().with(TroopKind::Barbarian, 5))
        .await
        .unwrap();
    let mut feed = handle.join(Viewer::Spectator(1)).await.unwrap();

    handle.leave(Viewer::Attacker).await.unwrap();
    let started = tokio::time::Instant::now();
    let events = drain(&mut feed).await;

    assert!(started.elapsed() >= Duration::from_secs(5));
    let result = final_result(&events);
    assert_eq!(result.outcome, BattleOutcome::Abandoned);
    assert_eq!(result.destruction_percentage, 0);
    assert_eq!(result.stars, 0);
    assert_eq!(sink.find(handle.battle_id()).unwrap().unwrap().result, result);
}

#[tokio::test(start_paused = true)]
async fn deployment_within_the_grace_period_keeps_the_battle_alive() {
    let config = RuntimeConfig::default().with_disconnect_grace(Duration::from_secs(5));
    let (manager, _) = manager_with(config);
    let handle = manager
        .create_battle(ATTACKER, VILLAGE, Army::new().with(TroopKind::Giant, 1))
        .await
        .unwrap();

    handle.leave(Viewer::Attacker).await.unwrap();
    assert!(!handle.snapshot().await.unwrap().attacker_connected);
    tokio::time::sleep(Duration::from_secs(3)).await;

    handle
        .deploy_troop(TroopKind::Giant, Point::new(1.5, 1.5))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(3)).await;

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.status, BattleStatus::Active);
    assert!(snapshot.attacker_connected);
    assert!(snapshot.result.is_none());

    manager.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn idle_battle_times_out_on_the_wall_clock() {
    let config = RuntimeConfig::default().with_max_wall_clock(Duration::from_secs(2));
    let (manager, _) = manager_with(config);
    let handle = manager
        .create_battle(ATTACKER, VILLAGE, Army::new().with(TroopKind::Archer, 1))
        .await
        .unwrap();
    let mut feed = handle.join(Viewer::Attacker).await.unwrap();

    let events = drain(&mut feed).await;
    assert_eq!(events.len(), 1);
    let result = final_result(&events);
    assert_eq!(result.outcome, BattleOutcome::TimeUp);
    assert_eq!(result.duration_ms, 0);
    assert!(manager.active_battles().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn shutdown_abandons_every_running_battle() {
    let (manager, sink) = manager();
    let first = manager
        .create_battle(ATTACKER, VILLAGE, Army::new().with(TroopKind::Barbarian, 1))
        .await
        .unwrap();
    let second = manager
        .create_battle(AttackerId(8), VILLAGE, Army::new().with(TroopKind::Archer, 1))
        .await
        .unwrap();
    assert_eq!(
        manager.active_battles().await,
        vec![first.battle_id(), second.battle_id()]
    );

    manager.shutdown().await.unwrap();

    assert!(manager.active_battles().await.is_empty());
    let records = sink.records().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records
        .iter()
        .all(|record| record.result.outcome == BattleOutcome::Abandoned));
}
