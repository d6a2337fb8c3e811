use criterion::{black_box, criterion_group, criterion_main, Criterion};
use goap_engine::{Action, Planner, PlannerConfig, SimpleAction, SimpleGoal, WorldState};
use std::sync::Arc;
use std::time::Duration;

fn toy_catalog(flags: usize) -> (Vec<Arc<dyn Action>>, SimpleGoal) {
    let mut actions: Vec<Arc<dyn Action>> = Vec::with_capacity(flags);
    let mut goal = SimpleGoal::new("all_flags", 1.0).expect("goal");
    for i in 0..flags {
        let key = format!("flag_{}", i);
        actions.push(Arc::new(
            SimpleAction::new(format!("set_{}", i), 1.0)
                .expect("action")
                .with_effect(key.clone(), true),
        ));
        goal = goal.with_desired(key, true);
    }
    (actions, goal)
}

fn chain_catalog(steps: usize) -> (Vec<Arc<dyn Action>>, SimpleGoal) {
    let mut actions: Vec<Arc<dyn Action>> = Vec::with_capacity(steps);
    for i in 0..steps {
        let mut action = SimpleAction::new(format!("step_{}", i), 1.0)
            .expect("action")
            .with_effect(format!("stage_{}", i + 1), true);
        if i > 0 {
            action = action.with_precondition(format!("stage_{}", i), true);
        }
        actions.push(Arc::new(action));
    }
    let goal = SimpleGoal::new("finish", 1.0)
        .expect("goal")
        .with_desired(format!("stage_{}", steps), true);
    (actions, goal)
}

fn bench_goap_planner(c: &mut Criterion) {
    let planner = Planner::new(PlannerConfig {
        max_iterations: 100_000,
        max_duration: Duration::from_secs(1),
        max_frontier: 100_000,
    })
    .expect("config");
    let start = WorldState::new();

    let (actions, goal) = toy_catalog(8);
    c.bench_function("planner.plan(flags=8)", |b| {
        b.iter(|| {
            let plan = planner.plan(&start, &goal, &actions);
            black_box(plan.len());
        })
    });

    let (actions, goal) = chain_catalog(16);
    c.bench_function("planner.plan(chain=16)", |b| {
        b.iter(|| {
            let plan = planner.plan(&start, &goal, &actions);
            black_box(plan.len());
        })
    });

    let (actions, goal) = toy_catalog(10);
    let bounded = Planner::default();
    c.bench_function("planner.plan(flags=10, default bounds)", |b| {
        b.iter(|| {
            let report = bounded.plan_detailed(&start, &goal, &actions);
            black_box(report.stats.iterations);
        })
    });
}

criterion_group!(benches, bench_goap_planner);
criterion_main!(benches);
