//! Demonstration of DevEvent data models and validation
//!
//! Run with: cargo run --example model_demo

use serde_json::json;
use devevent::{
    models::{normalize_date, normalize_email, normalize_time, prepare_booking, prepare_event, slugify},
    test_utils::{sample_event_input, MemoryStore},
    BookingInput, EventInput,
};

#[tokio::main]
async fn main() {
    println!("=== DevEvent Data Models Demo ===\n");

    // Demo 1: Slugs
    demo_slugs();
    println!();

    // Demo 2: Field normalizers
    demo_normalizers();
    println!();

    // Demo 3: Preparing an event
    let store = MemoryStore::new();
    demo_prepare_event(&store).await;
    println!();

    // Demo 4: Invalid events
    demo_invalid_event(&store).await;
    println!();

    // Demo 5: Bookings
    demo_bookings(&store).await;
}

fn demo_slugs() {
    println!("🔗 Demo 1: Slugs");
    println!("----------------");

    for title in ["Dev Summit 2026", "  Rust & WebAssembly: Live!  ", "Hack -- the -- Planet", "!!!"] {
        println!("  {:<32} -> {:?}", format!("{:?}", title), slugify(title));
    }
}

fn demo_normalizers() {
    println!("🧹 Demo 2: Field Normalizers");
    println!("----------------------------");

    for date in ["2026-03-01", "2026-02-30", "03/01/2026"] {
        match normalize_date(date, "date") {
            Ok(value) => println!("  ✅ date {:<12} -> {}", date, value),
            Err(e) => println!("  ❌ date {:<12} -> {}", date, e),
        }
    }

    for time in ["9:30", "23:59", "24:00"] {
        match normalize_time(time, "time") {
            Ok(value) => println!("  ✅ time {:<12} -> {}", time, value),
            Err(e) => println!("  ❌ time {:<12} -> {}", time, e),
        }
    }

    for email in [" Ada@Example.COM ", "ada@example"] {
        match normalize_email(email, "email") {
            Ok(value) => println!("  ✅ email {:<18} -> {}", format!("{:?}", email), value),
            Err(e) => println!("  ❌ email {:<18} -> {}", format!("{:?}", email), e),
        }
    }
}

async fn demo_prepare_event(store: &MemoryStore) {
    println!("📅 Demo 3: Preparing an Event");
    println!("-----------------------------");

    let mut input = sample_event_input("  Launch   Day ");
    input.time = "9:05".to_string();

    println!("Input JSON:");
    println!("{}", serde_json::to_string_pretty(&input).unwrap());

    let event = prepare_event(input.clone(), None, store).await.unwrap();
    println!("\nNormalized Event:");
    println!("  Title: {}", event.title);
    println!("  Slug: {}", event.slug);
    println!("  Date: {} {}", event.date, event.time);
    println!("  Mode: {}", event.mode);
    println!("  Tags: {:?}", event.tags);

    store.seed_event(input.clone());
    let second = prepare_event(input, None, store).await.unwrap();
    println!("\nSame title again, slug already taken:");
    println!("  Slug: {}", second.slug);
}

async fn demo_invalid_event(store: &MemoryStore) {
    println!("❌ Demo 4: Invalid Events");
    println!("-------------------------");

    let input: EventInput = serde_json::from_value(json!({
        "title": "Broken",
        "date": "2026-13-01",
        "time": "noon",
        "mode": "sometimes",
    }))
    .unwrap();

    match prepare_event(input, None, store).await {
        Ok(_) => println!("  Unexpectedly valid"),
        Err(e) => println!("  {}", e),
    }
}

async fn demo_bookings(store: &MemoryStore) {
    println!("🎟️  Demo 5: Bookings");
    println!("--------------------");

    let event = store.seed_event(sample_event_input("Booking Demo"));

    let cases = [
        BookingInput::new(event.id.to_string(), "  Grace@Example.ORG "),
        BookingInput::new("not-a-uuid", "grace@example.org"),
        BookingInput::new(uuid::Uuid::new_v4().to_string(), "grace@example.org"),
    ];

    for input in cases {
        match prepare_booking(input.clone(), None, store).await {
            Ok(booking) => println!("  ✅ {} books {}", booking.email, booking.event_id),
            Err(e) => println!("  ❌ {:?}: {}", input.event_id, e),
        }
    }
}
