// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use crate::job::{Job, JobTask};

pub struct ClosureJob {
    desc: String,
    task_creator: Box<dyn Fn(&ClosureJob) -> JobTask + Send + 'static>,
}

impl ClosureJob {
    pub fn new(
        desc: impl Into<String>,
        f: Box<
            dyn Fn(&ClosureJob) -> JobTask // closure returns any future
                + Send // the closure itself can be sent across threads
                + 'static,
        >,
    ) -> Self {
        Self {
            desc: desc.into(),
            task_creator: f,
        }
    }

    /// Shorthand for closures that do not need to look at the job itself.
    pub fn from_fn<F>(desc: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> JobTask + Send + 'static,
    {
        Self::new(desc, Box::new(move |_job: &ClosureJob| f()))
    }
}

impl Job for ClosureJob {
    fn desc(&self) -> &str {
        &self.desc
    }

    fn create_task(&self) -> JobTask {
        (self.task_creator)(self)
    }
}

/// Example usage
#[test]
pub fn example() {
    use crate::{Dispatcher, EngineConfig};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    let mut dispatcher = Dispatcher::new(EngineConfig {
        max_workers: 1,
        max_queue: 1,
        ..Default::default()
    })
    .unwrap();
    dispatcher.run().unwrap();

    let ran = Arc::new(AtomicBool::new(false));
    let ran_in_job = ran.clone();
    dispatcher
        .queue()
        .enqueue_blocking(Box::new(ClosureJob::new(
            "say hello",
            Box::new(move |job: &ClosureJob| {
                let desc = job.desc().to_string();
                let ran = ran_in_job.clone();
                Box::pin(async move {
                    println!("Running {desc}");
                    ran.store(true, Ordering::SeqCst);
                    Ok(())
                })
            }),
        )))
        .unwrap();

    dispatcher.wait_until_finished();
    assert!(ran.load(Ordering::SeqCst));
}
