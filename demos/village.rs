//! A small village: three villagers with different personalities share one
//! manager and plan their day.
//!
//! Run with `cargo run --example village`.

use goap_engine::{
    AgentCatalog, FactSources, ManagerConfig, PlanExecutionManager, SimpleAction, SimpleGoal,
    WorldState, WorldStateBuilder,
};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Personality {
    Friendly,
    Shy,
    Curious,
    Lazy,
}

impl Personality {
    fn social_modifier(self) -> f32 {
        match self {
            Personality::Friendly => 1.5,
            Personality::Shy => 0.5,
            Personality::Curious => 1.2,
            Personality::Lazy => 0.8,
        }
    }

    fn work_modifier(self) -> f32 {
        match self {
            Personality::Lazy => 0.5,
            Personality::Curious => 1.1,
            _ => 1.0,
        }
    }

    fn gossip_modifier(self) -> f32 {
        match self {
            Personality::Curious => 2.0,
            Personality::Friendly => 1.3,
            Personality::Shy => 0.5,
            Personality::Lazy => 1.0,
        }
    }

    /// Multiplier on the cost of an activity of the given kind.
    fn cost_modifier(self, activity: &str) -> f32 {
        match (self, activity) {
            (Personality::Friendly, "social") | (Personality::Friendly, "gossip") => 0.7,
            (Personality::Shy, "social") | (Personality::Shy, "gossip") => 1.8,
            (Personality::Curious, "gossip") => 0.5,
            (Personality::Lazy, "work") => 1.5,
            _ => 1.0,
        }
    }
}

struct Villager {
    name: &'static str,
    personality: Personality,
    age: i64,
    happiness: f64,
    loneliness: f64,
    curiosity: f64,
    love: f64,
    villagers_nearby: bool,
    daytime: bool,
}

fn fact_sources() -> FactSources<Villager> {
    let mut sources = FactSources::new();
    sources
        .add("profile", |v: &Villager, state: &mut WorldState| {
            state.set("age", v.age);
            state.set("has_spouse", false);
        })
        .expect("unique source name");
    sources
        .add("emotions", |v: &Villager, state: &mut WorldState| {
            state.set("happiness", v.happiness);
            state.set("loneliness", v.loneliness);
            state.set("curiosity", v.curiosity);
            state.set("love", v.love);
            state.set("is_happy", v.happiness >= 70.0);
        })
        .expect("unique source name");
    sources
        .add("surroundings", |v: &Villager, state: &mut WorldState| {
            state.set("villagers_nearby", v.villagers_nearby);
            state.set("is_daytime", v.daytime);
        })
        .expect("unique source name");
    sources
}

fn catalog_for(personality: Personality) -> AgentCatalog {
    let social = personality.social_modifier();
    let work = personality.work_modifier();
    let gossip = personality.gossip_modifier();

    AgentCatalog::new()
        .with_goal(
            SimpleGoal::new("increase_happiness", 0.7)
                .expect("finite priority")
                .with_desired("is_happy", true)
                .with_validity(|s| s.get_float("happiness") < 70.0)
                .with_dynamic_priority(|s| ((100.0 - s.get_float("happiness")) / 100.0).max(0.1) as f32),
        )
        .with_goal(
            SimpleGoal::new("socialize", 0.5)
                .expect("finite priority")
                .with_desired("has_socialized", true)
                .with_validity(|s| s.get_float("loneliness") > 20.0 || !s.get_bool("has_socialized_today"))
                .with_dynamic_priority(move |s| (s.get_float("loneliness") / 50.0).max(0.1) as f32 * social),
        )
        .with_goal(
            SimpleGoal::new("work", 0.6)
                .expect("finite priority")
                .with_desired("has_worked", true)
                .with_validity(|s| s.get_bool("is_daytime") && !s.get_bool("has_worked_today"))
                .with_dynamic_priority(move |_| work),
        )
        .with_goal(
            SimpleGoal::new("find_love", 0.3)
                .expect("finite priority")
                .with_desired("has_spouse", true)
                .with_validity(|s| {
                    !s.get_bool("has_spouse") && s.get_int("age") > 100 && s.get_float("happiness") > 40.0
                })
                .with_dynamic_priority(|s| {
                    let age_factor = ((s.get_int("age") - 100) as f64 / 200.0).clamp(0.1, 1.0);
                    let emotional = (s.get_float("loneliness") + s.get_float("love")) / 100.0;
                    (age_factor * emotional) as f32
                }),
        )
        .with_goal(
            SimpleGoal::new("learn_gossip", 0.4)
                .expect("finite priority")
                .with_desired("knows_latest_gossip", true)
                .with_validity(|s| s.get_float("curiosity") > 30.0)
                .with_dynamic_priority(move |s| (s.get_float("curiosity") / 100.0) as f32 * gossip),
        )
        .with_action(
            SimpleAction::new("socialize", 5.0)
                .expect("valid cost")
                .with_precondition("villagers_nearby", true)
                .with_effect("has_socialized", true)
                .with_effect("has_socialized_today", true)
                .with_effect("is_happy", true)
                .with_cost_fn(move |base, _| base * personality.cost_modifier("social")),
        )
        .with_action(
            SimpleAction::new("work", 8.0)
                .expect("valid cost")
                .with_guard(|s| s.get_bool("is_daytime"))
                .with_effect("has_worked", true)
                .with_effect("has_worked_today", true)
                .with_cost_fn(move |base, _| base * personality.cost_modifier("work")),
        )
        .with_action(
            SimpleAction::new("gossip", 3.0)
                .expect("valid cost")
                .with_precondition("villagers_nearby", true)
                .with_effect("knows_latest_gossip", true)
                .with_effect("has_socialized", true)
                .with_cost_fn(move |base, _| base * personality.cost_modifier("gossip")),
        )
}

fn main() {
    let config = ManagerConfig::from_json(r#"{ "max_iterations": 500, "max_duration_ms": 10 }"#)
        .expect("valid config");
    let manager = PlanExecutionManager::new(config).expect("valid config");
    let sources = fact_sources();

    let mut villagers = vec![
        Villager {
            name: "Ada",
            personality: Personality::Friendly,
            age: 140,
            happiness: 35.0,
            loneliness: 60.0,
            curiosity: 20.0,
            love: 10.0,
            villagers_nearby: true,
            daytime: true,
        },
        Villager {
            name: "Bo",
            personality: Personality::Curious,
            age: 90,
            happiness: 80.0,
            loneliness: 10.0,
            curiosity: 85.0,
            love: 0.0,
            villagers_nearby: true,
            daytime: true,
        },
        Villager {
            name: "Cy",
            personality: Personality::Lazy,
            age: 220,
            happiness: 75.0,
            loneliness: 5.0,
            curiosity: 10.0,
            love: 40.0,
            villagers_nearby: false,
            daytime: true,
        },
    ];

    for villager in &villagers {
        manager.initialize_agent(villager.name, catalog_for(villager.personality));
    }

    // Facts the villagers accumulate across ticks
    let mut memories: Vec<WorldState> = villagers.iter().map(|_| WorldState::new()).collect();

    for tick in 0..4 {
        println!("--- tick {} ---", tick);
        for (villager, memory) in villagers.iter_mut().zip(memories.iter_mut()) {
            let mut state = sources.build_state(villager);
            state.merge(memory);

            let report = match manager.update_agent(villager.name, &mut state) {
                Ok(report) => report,
                Err(err) => {
                    eprintln!("{}: {}", villager.name, err);
                    continue;
                }
            };

            match (&report.execution, report.idle) {
                (Some(execution), _) => println!(
                    "{:>3} ({:?}) goal={:<20} {} -> {}",
                    villager.name,
                    villager.personality,
                    report.goal.as_deref().unwrap_or("-"),
                    execution.action,
                    if execution.success { "ok" } else { "failed" }
                ),
                (None, idle) => println!(
                    "{:>3} ({:?}) idle: {:?}",
                    villager.name, villager.personality, idle
                ),
            }

            for key in ["has_socialized_today", "has_worked_today", "knows_latest_gossip"] {
                if state.get_bool(key) {
                    memory.set(key, true);
                }
            }
            if state.get_bool("has_socialized") {
                villager.loneliness = (villager.loneliness - 25.0).max(0.0);
                villager.happiness = (villager.happiness + 20.0).min(100.0);
            }
        }
        if tick == 2 {
            villagers[2].daytime = false;
        }
    }

    match manager.analytics().to_json() {
        Ok(json) => println!("analytics: {}", json),
        Err(err) => eprintln!("analytics unavailable: {}", err),
    }
    manager.shutdown();
}
