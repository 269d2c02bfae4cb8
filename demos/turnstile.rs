//! Coin-Operated Turnstile
//!
//! This example demonstrates the classic turnstile machine.
//!
//! Key concepts:
//! - External transitions between Locked and Unlocked
//! - Internal transitions that act without changing state
//! - Entry actions and a shared context counter
//! - A listener reporting every processed event
//!
//! Run with: RUST_LOG=debug cargo run --example turnstile

use statecraft::core::{MachineDetails, Message};
use statecraft::engine::MachineListener;
use statecraft::StateMachineBuilder;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Turnstile {
    Locked,
    Unlocked,
    OutOfOrder,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Input {
    Coin,
    Push,
    Kick,
}

struct Console;

impl MachineListener<Turnstile, Input> for Console {
    fn on_state_changed(
        &self,
        message: &Message<Input>,
        previous: &Turnstile,
        details: &MachineDetails<'_, Turnstile>,
    ) {
        println!(
            "  {:?}: {:?} -> {:?}",
            message.event(),
            previous,
            details.current_state()
        );
    }

    fn on_event_not_accepted(
        &self,
        message: Option<&Message<Input>>,
        details: &MachineDetails<'_, Turnstile>,
    ) {
        println!(
            "  {:?}: ignored in {:?}",
            message.map(Message::event),
            details.current_state()
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Turnstile State Machine ===\n");

    let mut builder = StateMachineBuilder::new();
    builder.define_state(Turnstile::Locked)?.as_initial()?;
    builder
        .define_state(Turnstile::Unlocked)?
        .on_entry(|details| {
            let unlocks = details.context().get::<u32>("unlocks").copied().unwrap_or(0);
            details.context_mut().set_value("unlocks", unlocks + 1);
            Ok(())
        });
    builder.define_state(Turnstile::OutOfOrder)?.as_final()?;

    builder
        .define_external_transition_for(Turnstile::Locked)
        .to(Turnstile::Unlocked)
        .by(Input::Coin);
    builder
        .define_external_transition_for(Turnstile::Unlocked)
        .to(Turnstile::Locked)
        .by(Input::Push);
    builder
        .define_internal_transition_for(Turnstile::Unlocked)
        .by(Input::Coin)
        .with_action(|_, _| {
            println!("  (already unlocked, coin returned)");
            Ok(())
        });
    builder
        .define_external_transition_for(Turnstile::Unlocked)
        .to(Turnstile::OutOfOrder)
        .by(Input::Kick);

    let mut machine = builder.build()?;
    machine.add_listener(Arc::new(Console));
    machine.start()?;

    println!("Feeding inputs:");
    for input in [
        Input::Push,
        Input::Coin,
        Input::Coin,
        Input::Push,
        Input::Coin,
        Input::Kick,
    ] {
        machine.accept(input)?;
    }

    println!(
        "\nFinal state: {:?} (running: {})",
        machine.current_state_id(),
        machine.is_running()
    );
    println!(
        "Unlocked {} times",
        machine.context().get::<u32>("unlocks").copied().unwrap_or(0)
    );

    println!("\n=== Example Complete ===");
    Ok(())
}
