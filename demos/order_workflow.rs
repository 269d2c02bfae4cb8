//! Order Fulfilment Workflow
//!
//! This example demonstrates a business workflow driven by messages.
//!
//! Key concepts:
//! - Guards reading JSON payloads and the shared context
//! - Deferring an event until the machine is ready for it
//! - Start/stop actions
//! - Recording the path with a history listener
//!
//! Run with: RUST_LOG=statecraft=debug cargo run --example order_workflow

use serde::{Deserialize, Serialize};
use statecraft::core::{consider_all, Guard, Message};
use statecraft::engine::HistoryListener;
use statecraft::StateMachineBuilder;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
enum OrderState {
    Created,
    Paid,
    Packed,
    Shipped,
    Closed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
enum OrderEvent {
    Pay,
    Pack,
    Ship,
    Deliver,
    Cancel,
}

#[derive(Debug, Serialize, Deserialize)]
struct Payment {
    amount_cents: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Order Workflow ===\n");

    let mut builder = StateMachineBuilder::new();
    builder
        .define_start_stop_actions()
        .on_start(|details| {
            println!("Order opened in {:?}", details.current_state());
            Ok(())
        })
        .on_stop(|details| {
            println!("Order closed in {:?}", details.current_state());
            Ok(())
        });

    builder.define_state(OrderState::Created)?.as_initial()?;
    builder
        .define_state(OrderState::Paid)?
        .with_deferred_event(OrderEvent::Ship);
    builder.define_states([OrderState::Packed, OrderState::Shipped])?;
    builder.define_state(OrderState::Closed)?.as_final()?;

    let covers_total = Guard::new(|message: &Message<OrderEvent>, details| {
        let total = details.context().get::<u64>("total_cents").copied();
        let paid = message
            .payload_as::<Payment>()
            .map(|payment| payment.amount_cents);
        matches!((paid, total), (Some(paid), Some(total)) if paid >= total)
    });
    let has_stock = Guard::new(|_: &Message<OrderEvent>, details| {
        details.context().get::<bool>("in_stock") == Some(&true)
    });

    builder
        .define_external_transition_for(OrderState::Created)
        .to(OrderState::Paid)
        .by(OrderEvent::Pay)
        .guarded_by(consider_all([covers_total, has_stock]))
        .with_action(|message, details| {
            if let Some(payment) = message.payload_as::<Payment>() {
                details.context_mut().set_value("paid_cents", payment.amount_cents);
            }
            Ok(())
        });
    builder
        .define_external_transition_for(OrderState::Created)
        .to(OrderState::Closed)
        .by(OrderEvent::Cancel);
    builder
        .define_external_transition_for(OrderState::Paid)
        .to(OrderState::Packed)
        .by(OrderEvent::Pack);
    builder
        .define_external_transition_for(OrderState::Paid)
        .to(OrderState::Closed)
        .by(OrderEvent::Cancel)
        .with_action(|_, details| {
            let refund = details.context().get::<u64>("paid_cents").copied().unwrap_or(0);
            println!("Refunding {refund} cents");
            Ok(())
        });
    builder
        .define_external_transition_for(OrderState::Packed)
        .to(OrderState::Shipped)
        .by(OrderEvent::Ship);
    builder
        .define_external_transition_for(OrderState::Shipped)
        .to(OrderState::Closed)
        .by(OrderEvent::Deliver);

    let mut machine = builder.build()?;
    let history = Arc::new(HistoryListener::<OrderState, OrderEvent>::new());
    machine.add_listener(history.clone());

    machine.context_mut().set_value("total_cents", 4_999u64);
    machine.context_mut().set_value("in_stock", true);
    machine.start()?;

    let underpaid = Message::try_with_payload(OrderEvent::Pay, &Payment { amount_cents: 1_000 })?;
    println!("Underpaid accepted: {}", machine.accept_message(underpaid)?);

    let paid = Message::try_with_payload(OrderEvent::Pay, &Payment { amount_cents: 4_999 })?;
    println!("Paid accepted: {}", machine.accept_message(paid)?);

    println!("Ship before packing accepted: {}", machine.accept(OrderEvent::Ship)?);
    println!("Deferred ship waiting: {}", machine.has_deferred_message());

    machine.accept(OrderEvent::Pack)?;
    println!("State after packing: {:?}", machine.current_state_id());

    machine.accept(OrderEvent::Deliver)?;

    let history = history.history();
    println!("\nPath: {:?}", history.get_path());
    println!("History as JSON:\n{}", serde_json::to_string_pretty(&history)?);

    println!("\n=== Example Complete ===");
    Ok(())
}
