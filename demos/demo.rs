#[macro_use]
extern crate may;

use log::{error, info};
use may_once::{once, once_owned, Emitter, OnceOptions};

use std::sync::Arc;
use std::time::Duration;

fn wait_first_emission() {
    let emitter = Arc::new(Emitter::new());
    let em = emitter.clone();

    // arm the waiter first
    let guard = once(&*emitter, "changed", OnceOptions::new());

    // trigger the event in another coroutine
    go!(move || em.emit("changed", &["argument"]));

    // this will block until the event fired
    match guard.wait() {
        Ok(args) => info!("changed fired with {:?}", args),
        Err(e) => error!("changed failed: {}", e),
    }
}

fn wait_filtered() {
    let emitter = Arc::new(Emitter::new());
    let opts = OnceOptions::new()
        .with_timeout(Duration::from_millis(500))
        .resolve_on(|args: &[u32]| args.iter().sum::<u32>() > 5)
        .reject_on(|args: &[u32]| args.is_empty());
    let waiter = once_owned(emitter.clone(), "sum", opts);

    let h = go!(move || waiter.wait());
    for n in 1..5u32 {
        emitter.emit("sum", &[n, n]);
        may::coroutine::sleep(Duration::from_millis(10));
    }

    match h.join() {
        Ok(Ok(args)) => info!("sum settled with {:?}", args),
        Ok(Err(e)) => error!("sum failed: {} ({})", e, e.as_label()),
        Err(_) => error!("waiting coroutine panicked"),
    }
}

fn wait_timeout() {
    let emitter = Emitter::<String>::new();
    let guard = once(&emitter, "never", OnceOptions::new().with_timeout_ms(100));
    if let Err(e) = guard.wait() {
        info!("never fired as expected: {}", e);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    wait_first_emission();
    wait_filtered();
    wait_timeout();
}
