//! Tests for configuration validation

use stampede::{op_fn, BoundedExecutor, SequencedNameFactory, Stampede, StampedeError};

use crate::common::GRACE;

#[test]
fn test_zero_workers_is_a_configuration_error() {
    let result = Stampede::new(op_fn(|| Ok(()))).worker_count(0).run();

    match result {
        Err(StampedeError::InvalidConfiguration { message }) => {
            assert!(message.contains("positive"));
        }
        other => panic!("expected InvalidConfiguration, got {:?}", other),
    }
}

#[test]
fn test_zero_thread_executor_is_a_configuration_error() {
    assert!(matches!(
        BoundedExecutor::new(0, SequencedNameFactory::new("worker")),
        Err(StampedeError::InvalidConfiguration { .. })
    ));
}

#[test]
fn test_undersized_retained_executor_is_rejected() {
    let executor = BoundedExecutor::new(2, SequencedNameFactory::new("worker")).unwrap();

    let result = Stampede::new(op_fn(|| Ok(())))
        .worker_count(4)
        .run_on(&executor);

    assert!(matches!(
        result,
        Err(StampedeError::InvalidConfiguration { .. })
    ));
    // Validation failed fast: the pool was never spawned, shutdown is clean.
    assert!(executor.force_shutdown(GRACE));
}

#[test]
fn test_shut_down_executor_rejects_new_runs() {
    let executor = BoundedExecutor::new(2, SequencedNameFactory::new("worker")).unwrap();
    executor.submit(|| {}).unwrap();
    assert!(executor.force_shutdown(GRACE));

    let result = Stampede::new(op_fn(|| Ok(()))).run_on(&executor);
    assert!(matches!(result, Err(StampedeError::ExecutorShutDown)));
}
