//! Door Chain Example
//!
//! Demonstrates courier with a small level loaded from RON.
//! A button opens two doors with delayed outputs, the first door lights a
//! row of lamps, and a relay counts up and removes an alarm, cancelling the
//! alarm's queued output.
//!
//! Run with `RUST_LOG=debug` to see every firing and delivery.

use courier_core::{Level, SchedulerConfig, Value, ValueKind};
use courier_script::LevelLoader;
use log::info;

const LEVEL: &str = include_str!("../level.ron");

fn register_handlers(level: &mut Level) {
    level.on_input("func_button", "Press", ValueKind::Void, |ctx| {
        ctx.fire_output("OnPressed", Value::Void, 0.0);
        true
    });

    level.on_input("func_door", "Open", ValueKind::Void, |ctx| {
        if ctx.entity.get("open").and_then(|v| v.as_bool()) == Some(true) {
            return false;
        }
        ctx.entity.set("open", true);
        ctx.fire_output("OnFullyOpen", Value::Void, 0.0);
        true
    });

    level.on_input("light", "TurnOn", ValueKind::Void, |ctx| {
        ctx.entity.set("lit", true);
        true
    });

    level.on_input("light", "TurnOff", ValueKind::Void, |ctx| {
        ctx.entity.set("lit", false);
        true
    });

    level.on_input("logic_relay", "Trigger", ValueKind::Void, |ctx| {
        ctx.fire_output("OnTrigger", Value::Void, 0.0);
        true
    });

    level.on_input("math_counter", "Add", ValueKind::Int, |ctx| {
        let current = match ctx.entity.get("value") {
            Some(Value::Int(n)) => *n,
            Some(Value::String(s)) => s.parse().unwrap_or(0),
            _ => 0,
        };
        let amount = ctx.input.value.as_int().unwrap_or(0);
        ctx.entity.set("value", current + amount);
        true
    });
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    println!("=== Courier Door Chain Example ===\n");

    let mut loader = LevelLoader::new();
    match std::env::args().nth(1) {
        Some(path) => loader.load_file(path)?,
        None => loader.load_str(LEVEL)?,
    }
    let defs = loader.finish();

    let mut level = defs.build_level(SchedulerConfig::default());
    register_handlers(&mut level);
    println!(
        "Loaded {} entities, tick interval {:.3}s\n",
        level.entities().len(),
        level.scheduler().clock().tick_interval()
    );

    if let Some(alarm) = level.entities().find("alarm").map(|e| e.id) {
        level.fire_output(alarm, "OnPlay", Value::Void, None, 0.0)?;
    }
    level.post("button", "Press", Value::Void, 0.0);

    println!("Pending before the first tick:");
    for line in level.scheduler().dump() {
        println!("  {}", line);
    }
    println!();

    let mut ticks = 0;
    while !level.scheduler().is_empty() && ticks < 1000 {
        let delivered = level.tick();
        ticks += 1;
        if delivered > 0 {
            println!("({:.2}) delivered {} events", level.now(), delivered);
        }
    }
    info!("queue drained after {} ticks", ticks);

    println!("\nFinal state:");
    for entity in level.entities().iter() {
        let props: Vec<String> = entity
            .properties
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        println!("  {} ({}): {}", entity.name, entity.class, props.join(", "));
    }
    if level.entities().find("alarm").is_none() {
        println!("  alarm was killed before light_3 could be turned off");
    }

    Ok(())
}
