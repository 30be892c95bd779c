use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use anyhow::Result;
use log::{debug, warn};

use crate::feed::{FeedClient, Message};

/// Anything that can produce a batch of unread messages.
pub trait Fetch: Send + 'static {
    fn fetch(&self) -> Result<Vec<Message>>;
}

impl Fetch for FeedClient {
    fn fetch(&self) -> Result<Vec<Message>> {
        FeedClient::fetch(self)
    }
}

enum Job {
    Fetch { generation: u64 },
    Shutdown,
}

pub struct FetchOutcome {
    pub generation: u64,
    pub result: Result<Vec<Message>>,
}

/// What draining the outcome channel produced this frame.
pub enum PollEvent {
    Idle,
    Finished(FetchOutcome),
    /// The worker is gone; no more fetches until the pipeline is rebuilt.
    Died,
}

/// Background fetch worker.
///
/// Triggers are generation-numbered. The worker always serves the newest
/// queued trigger, and [`Poller::poll`] discards outcomes from superseded
/// generations, so only the most recent fetch's result is ever applied.
pub struct Poller {
    jobs: Sender<Job>,
    outcomes: Receiver<FetchOutcome>,
    worker: Option<JoinHandle<()>>,
    generation: u64,
}

impl Poller {
    pub fn spawn(fetcher: impl Fetch) -> Self {
        let (job_tx, job_rx) = mpsc::channel();
        let (outcome_tx, outcome_rx) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("feed-poller".to_string())
            .spawn(move || worker_loop(fetcher, job_rx, outcome_tx))
            .ok();
        Self {
            jobs: job_tx,
            outcomes: outcome_rx,
            worker,
            generation: 0,
        }
    }

    /// Dispatch a fetch, superseding any still outstanding one.
    pub fn trigger(&mut self) -> u64 {
        self.generation += 1;
        debug!("fetch #{} dispatched", self.generation);
        let _ = self.jobs.send(Job::Fetch {
            generation: self.generation,
        });
        self.generation
    }

    /// Drain completed fetches. Stale generations are dropped on the floor.
    pub fn poll(&mut self) -> PollEvent {
        loop {
            match self.outcomes.try_recv() {
                Ok(outcome) if outcome.generation == self.generation => {
                    return PollEvent::Finished(outcome);
                }
                Ok(outcome) => {
                    debug!("discarding superseded fetch #{}", outcome.generation);
                }
                Err(TryRecvError::Empty) => return PollEvent::Idle,
                Err(TryRecvError::Disconnected) => return PollEvent::Died,
            }
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        let _ = self.jobs.send(Job::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn worker_loop(fetcher: impl Fetch, jobs: Receiver<Job>, outcomes: Sender<FetchOutcome>) {
    while let Ok(mut job) = jobs.recv() {
        // Collapse any backlog of triggers down to the newest one.
        while let Ok(next) = jobs.try_recv() {
            job = next;
        }
        match job {
            Job::Fetch { generation } => {
                let result = fetcher.fetch();
                if let Err(err) = &result {
                    warn!("fetch #{generation} failed: {err:#}");
                }
                if outcomes.send(FetchOutcome { generation, result }).is_err() {
                    break;
                }
            }
            Job::Shutdown => break,
        }
    }
    debug!("feed poller stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    struct CannedFetch(Vec<Message>);

    impl Fetch for CannedFetch {
        fn fetch(&self) -> Result<Vec<Message>> {
            Ok(self.0.clone())
        }
    }

    struct PanickingFetch;

    impl Fetch for PanickingFetch {
        fn fetch(&self) -> Result<Vec<Message>> {
            panic!("boom");
        }
    }

    fn wait_for(poller: &mut Poller) -> PollEvent {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            match poller.poll() {
                PollEvent::Idle => {
                    assert!(Instant::now() < deadline, "no outcome within 5s");
                    thread::sleep(Duration::from_millis(5));
                }
                event => return event,
            }
        }
    }

    #[test]
    fn delivers_the_current_generation() {
        let mut poller = Poller::spawn(CannedFetch(vec![Message {
            id: "1".to_string(),
            ..Message::default()
        }]));
        let generation = poller.trigger();
        match wait_for(&mut poller) {
            PollEvent::Finished(outcome) => {
                assert_eq!(outcome.generation, generation);
                assert_eq!(outcome.result.unwrap().len(), 1);
            }
            _ => panic!("expected a finished fetch"),
        }
    }

    #[test]
    fn only_the_latest_trigger_wins() {
        let mut poller = Poller::spawn(CannedFetch(vec![]));
        poller.trigger();
        poller.trigger();
        let latest = poller.trigger();
        match wait_for(&mut poller) {
            PollEvent::Finished(outcome) => assert_eq!(outcome.generation, latest),
            _ => panic!("expected a finished fetch"),
        }
    }

    #[test]
    fn dead_worker_is_reported() {
        let mut poller = Poller::spawn(PanickingFetch);
        poller.trigger();
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            match poller.poll() {
                PollEvent::Died => break,
                PollEvent::Finished(_) => panic!("panicking fetch cannot finish"),
                PollEvent::Idle => {
                    assert!(Instant::now() < deadline, "worker death not observed");
                    thread::sleep(Duration::from_millis(5));
                }
            }
        }
    }
}
