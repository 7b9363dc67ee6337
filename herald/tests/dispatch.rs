//! Integration tests for synchronous dispatch.

mod common;

use common::*;
use herald::{
    BoxError, DispatchContext, DispatchObserver, DispatchPhase, Dispatcher, FnObserver,
    HandlerError, HandlerId,
    observers::LoggingObserver,
    testing::{CountingHandler, FailingHandler, RecordingHandler, RecordingObserver},
};
use std::sync::{Arc, Mutex};

#[test]
fn test_registered_handler_receives_message_once() {
    init_tracing();
    let dispatcher = Dispatcher::new();
    let handler = Arc::new(RecordingHandler::<OrderCreated>::new());
    dispatcher.register::<OrderCreated, _>(handler.clone());

    dispatcher.dispatch(&OrderCreated { id: 42 });

    assert_eq!(handler.messages(), vec![OrderCreated { id: 42 }]);
}

#[test]
fn test_duplicate_registration_invokes_once() {
    let dispatcher = Dispatcher::new();
    let counter = Arc::new(CountingHandler::new());

    assert!(dispatcher.register::<OrderCreated, _>(counter.clone()));
    assert!(!dispatcher.register::<OrderCreated, _>(counter.clone()));
    dispatcher.dispatch(&OrderCreated { id: 1 });

    assert_eq!(counter.count(), 1);
    assert_eq!(dispatcher.handler_count::<OrderCreated>(), 1);
}

#[test]
fn test_unregistered_handler_is_not_invoked() {
    let dispatcher = Dispatcher::new();
    let counter = Arc::new(CountingHandler::new());
    dispatcher.register::<OrderCreated, _>(counter.clone());

    assert!(dispatcher.unregister::<OrderCreated, _>(&counter));
    dispatcher.dispatch(&OrderCreated { id: 1 });

    assert_eq!(counter.count(), 0);
    assert!(!dispatcher.contains::<OrderCreated, _>(&counter));
}

#[test]
fn test_unregister_unknown_is_noop() {
    let dispatcher = Dispatcher::new();
    let counter = Arc::new(CountingHandler::new());

    assert!(!dispatcher.unregister::<PaymentReceived, _>(&counter));
}

#[test]
fn test_dispatch_without_handlers_notifies_nobody() {
    let recorder = RecordingObserver::new();
    let dispatcher = Dispatcher::builder().observer(recorder.clone()).build();

    dispatcher.dispatch(&OrderCreated { id: 1 });

    assert!(recorder.notifications().is_empty());
}

#[test]
fn test_failing_handler_is_reported_and_skipped() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let observer = FnObserver::new(
        move |phase, ctx: &DispatchContext<'_>, err: Option<&HandlerError>| {
            if phase == DispatchPhase::DispatchFailed {
                sink.lock().unwrap().push((
                    ctx.message::<OrderCreated>().cloned(),
                    ctx.handler::<FailingHandler>().is_some(),
                    err.map(ToString::to_string),
                ));
            }
        },
    );
    let recorder = RecordingObserver::new();
    let dispatcher = Dispatcher::builder()
        .observer(observer)
        .observer(recorder.clone())
        .build();

    let failing = Arc::new(FailingHandler::new("mailbox full"));
    let counter = Arc::new(CountingHandler::new());
    dispatcher.register::<OrderCreated, _>(failing.clone());
    dispatcher.register::<OrderCreated, _>(counter.clone());

    dispatcher.dispatch(&OrderCreated { id: 9 });

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, Some(OrderCreated { id: 9 }));
    assert!(seen[0].1);
    assert!(seen[0].2.as_deref().unwrap().contains("mailbox full"));

    assert_eq!(
        recorder.phases_for(HandlerId::of(&failing)),
        vec![DispatchPhase::Dispatching, DispatchPhase::DispatchFailed]
    );
    assert_eq!(counter.count(), 1);
}

#[test]
fn test_handlers_run_in_registration_order() {
    let dispatcher = Dispatcher::new();
    let order = order_log();
    for id in 1..=3 {
        dispatcher.register::<OrderCreated, _>(recorder(id, &order));
    }

    dispatcher.dispatch(&OrderCreated { id: 1 });

    assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
}

#[test]
fn test_unregister_preserves_order_of_the_rest() {
    let dispatcher = Dispatcher::new();
    let order = order_log();
    let handlers: Vec<_> = (1..=3).map(|id| recorder(id, &order)).collect();
    for handler in &handlers {
        dispatcher.register::<OrderCreated, _>(handler.clone());
    }

    dispatcher.unregister::<OrderCreated, _>(&handlers[1]);
    dispatcher.dispatch(&OrderCreated { id: 1 });

    assert_eq!(*order.lock().unwrap(), vec![1, 3]);
}

#[test]
fn test_clear_removes_every_handler() {
    let dispatcher = Dispatcher::new();
    let counter = Arc::new(CountingHandler::new());
    let total = Arc::new(PaymentTotal::default());
    dispatcher.register::<OrderCreated, _>(counter.clone());
    dispatcher.register::<PaymentReceived, _>(total.clone());

    dispatcher.clear();
    dispatcher.dispatch(&OrderCreated { id: 1 });
    dispatcher.dispatch(&PaymentReceived {
        order: 1,
        cents: 100,
    });

    assert_eq!(counter.count(), 0);
    assert_eq!(total.total(), 0);
    assert!(dispatcher.registry().is_empty());
}

#[test]
fn test_counting_handler_counts_every_dispatch() {
    let dispatcher = Dispatcher::new();
    let counter = Arc::new(CountingHandler::new());
    dispatcher.register::<OrderCreated, _>(counter.clone());

    for id in 0..3 {
        dispatcher.dispatch(&OrderCreated { id });
    }

    assert_eq!(counter.count(), 3);
}

#[test]
fn test_failure_then_success_for_payments() {
    init_tracing();
    let recorder = RecordingObserver::new();
    let dispatcher = Dispatcher::builder()
        .observer(recorder.clone())
        .observer(LoggingObserver::named("payments"))
        .build();

    let failing = Arc::new(FailingHandler::new("card declined"));
    let total = Arc::new(PaymentTotal::default());
    dispatcher.register::<PaymentReceived, _>(failing.clone());
    dispatcher.register::<PaymentReceived, _>(total.clone());

    dispatcher.dispatch(&PaymentReceived {
        order: 3,
        cents: 1250,
    });

    assert_eq!(
        recorder.phases_for(HandlerId::of(&failing)),
        vec![DispatchPhase::Dispatching, DispatchPhase::DispatchFailed]
    );
    assert_eq!(
        recorder.phases_for(HandlerId::of(&total)),
        vec![DispatchPhase::Dispatching, DispatchPhase::Dispatched]
    );
    assert_eq!(
        recorder.phases(),
        vec![
            DispatchPhase::Dispatching,
            DispatchPhase::DispatchFailed,
            DispatchPhase::Dispatching,
            DispatchPhase::Dispatched,
        ]
    );
    assert_eq!(total.total(), 1250);
}

#[test]
fn test_message_type_matching_is_exact() {
    let dispatcher = Dispatcher::new();
    let wrapped = Arc::new(CountingHandler::new());
    let plain = Arc::new(CountingHandler::new());
    dispatcher.register::<Arc<OrderCreated>, _>(wrapped.clone());
    dispatcher.register::<OrderCreated, _>(plain.clone());

    dispatcher.dispatch(&OrderCreated { id: 1 });
    assert_eq!(wrapped.count(), 0);
    assert_eq!(plain.count(), 1);

    dispatcher.dispatch(&Arc::new(OrderCreated { id: 2 }));
    assert_eq!(wrapped.count(), 1);
    assert_eq!(plain.count(), 1);
}

#[test]
fn test_one_instance_under_two_message_types() {
    let dispatcher = Dispatcher::new();
    let counter = Arc::new(CountingHandler::new());
    dispatcher.register::<OrderCreated, _>(counter.clone());
    dispatcher.register::<PaymentReceived, _>(counter.clone());

    dispatcher.dispatch(&OrderCreated { id: 1 });
    dispatcher.dispatch(&PaymentReceived { order: 1, cents: 5 });
    assert_eq!(counter.count(), 2);

    dispatcher.unregister::<OrderCreated, _>(&counter);
    dispatcher.dispatch(&OrderCreated { id: 2 });
    dispatcher.dispatch(&PaymentReceived { order: 2, cents: 5 });
    assert_eq!(counter.count(), 3);
}

#[test]
fn test_closure_handlers() {
    let dispatcher = Dispatcher::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    dispatcher.register::<OrderCreated, _>(Arc::new(
        move |order: &OrderCreated| -> Result<(), BoxError> {
            sink.lock().unwrap().push(order.id);
            Ok(())
        },
    ));
    dispatcher.register::<OrderCreated, _>(Arc::new(
        |_order: &OrderCreated| -> Result<(), std::io::Error> {
            Err(std::io::Error::other("disk full"))
        },
    ));

    dispatcher.dispatch(&OrderCreated { id: 5 });
    dispatcher.dispatch(&OrderCreated { id: 6 });

    assert_eq!(*seen.lock().unwrap(), vec![5, 6]);
}

#[test]
fn test_panicking_handler_is_isolated() {
    init_tracing();
    let recorder = RecordingObserver::new();
    let dispatcher = Dispatcher::builder().observer(recorder.clone()).build();
    let counter = Arc::new(CountingHandler::new());
    dispatcher.register::<OrderCreated, _>(Arc::new(PanickingHandler));
    dispatcher.register::<OrderCreated, _>(counter.clone());

    dispatcher.dispatch(&OrderCreated { id: 1 });

    let failures = recorder.with_phase(DispatchPhase::DispatchFailed);
    assert_eq!(failures.len(), 1);
    assert!(failures[0].error.as_deref().unwrap().contains("handler blew up"));
    assert!(failures[0].handler_type.ends_with("PanickingHandler"));
    assert_eq!(counter.count(), 1);
}

struct PanickingObserver;

impl DispatchObserver for PanickingObserver {
    fn on_dispatching(&self, _ctx: &DispatchContext<'_>) {
        panic!("observer blew up");
    }
}

#[test]
fn test_panicking_observer_does_not_stop_delivery() {
    let recorder = RecordingObserver::new();
    let dispatcher = Dispatcher::builder()
        .observer(PanickingObserver)
        .observer(recorder.clone())
        .build();
    let counter = Arc::new(CountingHandler::new());
    dispatcher.register::<OrderCreated, _>(counter.clone());

    dispatcher.dispatch(&OrderCreated { id: 1 });

    assert_eq!(counter.count(), 1);
    assert_eq!(
        recorder.phases(),
        vec![DispatchPhase::Dispatching, DispatchPhase::Dispatched]
    );
}

#[test]
fn test_removed_observer_stops_receiving() {
    let dispatcher = Dispatcher::new();
    let recorder = RecordingObserver::new();
    let id = dispatcher.add_observer(recorder.clone());
    dispatcher.register::<OrderCreated, _>(Arc::new(CountingHandler::new()));

    dispatcher.dispatch(&OrderCreated { id: 1 });
    assert!(dispatcher.remove_observer(id));
    dispatcher.dispatch(&OrderCreated { id: 2 });

    assert_eq!(recorder.notifications().len(), 2);
    assert!(!dispatcher.remove_observer(id));
}
