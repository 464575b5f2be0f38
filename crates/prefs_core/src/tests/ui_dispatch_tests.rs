use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::*;

#[test]
fn delivers_immediately_on_ui_thread() {
    let dispatcher = UiDispatcher::new();
    let ran = Arc::new(AtomicUsize::new(0));
    let counter = ran.clone();

    dispatcher.handle().deliver(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(ran.load(Ordering::SeqCst), 1);
    assert_eq!(dispatcher.pending(), 0);
}

#[test]
fn queues_off_thread_work_until_drained() {
    let dispatcher = UiDispatcher::new();
    let handle = dispatcher.handle();
    let ran_on = Arc::new(Mutex::new(Vec::new()));
    let sink = ran_on.clone();

    thread::spawn(move || {
        assert!(!handle.is_ui_thread());
        handle.deliver(move || sink.lock().push(thread::current().id()));
    })
    .join()
    .expect("worker");

    assert!(ran_on.lock().is_empty());
    assert_eq!(dispatcher.pending(), 1);
    assert_eq!(dispatcher.run_pending(), 1);
    assert_eq!(*ran_on.lock(), vec![thread::current().id()]);
}

#[test]
fn listener_wrapper_marshals_owned_values() {
    let dispatcher = UiDispatcher::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let listener = dispatcher
        .handle()
        .listener(move |old: String, new: String| sink.lock().push(format!("{old}->{new}")));

    listener(&"light".to_string(), &"dark".to_string());
    let listener = Arc::new(listener);
    let remote = listener.clone();
    thread::spawn(move || remote(&"dark".to_string(), &"solarized".to_string()))
        .join()
        .expect("worker");

    assert_eq!(*seen.lock(), vec!["light->dark".to_string()]);
    dispatcher.run_pending();
    assert_eq!(
        *seen.lock(),
        vec!["light->dark".to_string(), "dark->solarized".to_string()]
    );
}

#[test]
fn panicking_job_does_not_stop_the_queue() {
    let dispatcher = UiDispatcher::new();
    let handle = dispatcher.handle();
    let ran = Arc::new(AtomicUsize::new(0));
    let counter = ran.clone();

    thread::spawn(move || {
        handle.deliver(|| panic!("widget disposed"));
        handle.deliver(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    })
    .join()
    .expect("worker");

    assert_eq!(dispatcher.run_pending(), 2);
    assert_eq!(ran.load(Ordering::SeqCst), 1);
}

#[test]
fn delivery_after_dispatcher_drop_is_discarded() {
    let dispatcher = UiDispatcher::new();
    let handle = dispatcher.handle();
    drop(dispatcher);

    thread::spawn(move || handle.deliver(|| unreachable!("dispatcher is gone")))
        .join()
        .expect("worker");
}
