// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use async_io::Timer;
use futures::FutureExt;
use job_engine::{Dispatcher, EngineConfig, EngineError};
use payload_relay_tests::recording::Recorder;

fn engine(max_workers: usize, max_queue: usize) -> Dispatcher {
    let mut dispatcher = Dispatcher::new(EngineConfig {
        max_workers,
        max_queue,
        max_pending_handoffs: None,
    })
    .expect("valid configuration");
    dispatcher.run().expect("dispatcher should start");
    dispatcher
}

const JOB_DURATION: Duration = Duration::from_millis(100);

#[test]
fn test_burst_on_single_executor() {
    let recorder = Recorder::new();
    let mut dispatcher = engine(1, 2);
    let queue = dispatcher.queue();

    for i in 0..3 {
        queue
            .enqueue_blocking(recorder.job(i, JOB_DURATION))
            .expect("queue accepts the job");
    }
    // The third job only had to wait until the first one left the queue,
    // not until it finished.
    let third_enqueued_at = recorder.elapsed();

    dispatcher.wait_until_finished();

    let first = recorder.span(0).expect("job 0 ran");
    let second = recorder.span(1).expect("job 1 ran");
    let third = recorder.span(2).expect("job 2 ran");

    assert!(first.started < Duration::from_millis(50), "{first:?}");
    assert!(first.finished >= JOB_DURATION);
    assert!(second.started >= first.finished);
    assert!(third.started >= second.finished);
    assert!(
        third_enqueued_at < JOB_DURATION,
        "third enqueue took {third_enqueued_at:?}"
    );
}

#[test]
fn test_zero_executors_apply_overload_policy() {
    let recorder = Recorder::new();
    let mut dispatcher = engine(0, 2);
    let queue = dispatcher.queue();

    queue.try_enqueue(recorder.job(0, JOB_DURATION)).unwrap();
    queue.try_enqueue(recorder.job(1, JOB_DURATION)).unwrap();

    // reject policy
    assert!(matches!(
        queue.try_enqueue(recorder.job(2, JOB_DURATION)),
        Err(EngineError::QueueFull)
    ));

    // block policy: still waiting after 50ms
    let outcome = futures::executor::block_on(async {
        futures::select! {
            _ = queue.enqueue(recorder.job(3, JOB_DURATION)).fuse() => "enqueued",
            _ = Timer::after(Duration::from_millis(50)).fuse() => "blocked",
        }
    });
    assert_eq!(outcome, "blocked");

    assert_eq!(dispatcher.stats().queued, 2);
    dispatcher.wait_until_finished();
    assert!(recorder.spans().is_empty());
}

#[test]
fn test_many_producers() {
    const PRODUCERS: usize = 4;
    const JOBS_PER_PRODUCER: usize = 25;
    const WORKERS: usize = 3;

    let recorder = Recorder::new();
    let mut dispatcher = engine(WORKERS, 5);

    let producers = (0..PRODUCERS)
        .map(|p| {
            let queue = dispatcher.queue();
            let recorder = recorder.clone();
            thread::spawn(move || {
                for j in 0..JOBS_PER_PRODUCER {
                    let index = p * JOBS_PER_PRODUCER + j;
                    queue
                        .enqueue_blocking(recorder.job(index, Duration::from_millis(2)))
                        .unwrap();
                }
            })
        })
        .collect::<Vec<_>>();
    for producer in producers {
        producer.join().unwrap();
    }

    dispatcher.wait_until_finished();

    let spans = recorder.spans();
    assert_eq!(spans.len(), PRODUCERS * JOBS_PER_PRODUCER);
    let unique = spans.iter().map(|span| span.index).collect::<HashSet<_>>();
    assert_eq!(unique.len(), PRODUCERS * JOBS_PER_PRODUCER);

    // at every start, at most WORKERS jobs are running
    for span in &spans {
        let running = spans
            .iter()
            .filter(|other| other.started <= span.started && span.started < other.finished)
            .count();
        assert!(running <= WORKERS, "{running} jobs running at {:?}", span.started);
    }
}
