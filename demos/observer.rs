//! # Observer Example
//!
//! Wires a sample publisher and two subscribers together:
//! - a free-function observer registered by closure,
//! - a subscriber object whose state is captured by its handler.
//!
//! Exercises subscribe → dispatch → dispatch_async → unsubscribe.
//!
//! ## Run
//! ```bash
//! cargo run --example observer
//! ```

use std::sync::Arc;

use evoke::{Event, Handler};

/// Publisher: owns the event and notifies observers without depending on them.
struct Printer {
    printed: Event<u32>,
}

impl Printer {
    fn new() -> Self {
        Self {
            printed: Event::new(),
        }
    }

    fn print(&self, page: u32) {
        println!("printer: printing page {page}");
        self.printed.dispatch(page);
    }
}

/// Subscriber with its own state; the handler closure captures it.
struct Counter {
    label: &'static str,
}

impl Counter {
    fn notice(&self, page: u32) {
        println!("{}: saw page {page}", self.label);
    }
}

fn pages_observer(page: u32) {
    println!("observer fn: page {page} went out");
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let printer = Printer::new();

    let counter = Arc::new(Counter { label: "counter" });
    let watcher = Handler::new(move |page| counter.notice(page));

    printer.printed.subscribe(watcher.clone());
    let fn_id = printer.printed.subscribe_fn(pages_observer);

    printer.print(1);

    // Same pass, offloaded; awaiting the handle observes completion.
    printer
        .printed
        .dispatch_async(2)
        .await
        .expect("async dispatch should complete");

    assert!(printer.printed.unsubscribe(&watcher));
    assert!(printer.printed.unsubscribe_id(fn_id));

    // Nobody listens anymore.
    printer.print(3);
}
