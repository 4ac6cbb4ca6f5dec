//! Background persistence worker.
//!
//! Requests drained from the controller are sent to a dedicated thread that
//! runs them through the [`Synchronizer`]; replies come back over a channel
//! polled once per UI frame.
//!
//! The thread executes one request at a time in submission order, so a
//! client never has two reloads in flight and a stale reload cannot land
//! after a newer one. `ReloadPolicy` only matters for stores shared with
//! other writers or for callers that run the [`Synchronizer`] concurrently.

use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::thread::{self, JoinHandle};
use tabletop_core::{SyncReply, SyncRequest, Synchronizer};

/// Called after each reply is queued, so the UI can wake up.
pub type Waker = Box<dyn Fn() + Send>;

pub struct SyncWorker {
    /// Channel to send requests to the worker thread.
    request_tx: Option<Sender<SyncRequest>>,
    /// Channel to receive replies from the worker thread.
    reply_rx: Receiver<SyncReply>,
    in_flight: usize,
    thread: Option<JoinHandle<()>>,
}

impl SyncWorker {
    pub fn spawn(sync: Synchronizer, waker: Waker) -> Self {
        let (request_tx, request_rx) = channel::<SyncRequest>();
        let (reply_tx, reply_rx) = channel::<SyncReply>();

        let handle = thread::spawn(move || {
            log::info!("sync worker started");
            while let Ok(request) = request_rx.recv() {
                log::debug!("sync worker executing {:?}", request_kind(&request));
                let reply = pollster::block_on(sync.execute(request));
                if reply_tx.send(reply).is_err() {
                    break;
                }
                waker();
            }
            log::info!("sync worker exiting");
        });

        Self {
            request_tx: Some(request_tx),
            reply_rx,
            in_flight: 0,
            thread: Some(handle),
        }
    }

    /// Queue requests for execution in order.
    pub fn submit(&mut self, requests: impl IntoIterator<Item = SyncRequest>) {
        let Some(tx) = &self.request_tx else {
            return;
        };
        for request in requests {
            if tx.send(request).is_err() {
                log::error!("sync worker is gone; dropping request");
                return;
            }
            self.in_flight += 1;
        }
    }

    /// Replies received since the last poll.
    pub fn poll(&mut self) -> Vec<SyncReply> {
        let mut replies = Vec::new();
        loop {
            match self.reply_rx.try_recv() {
                Ok(reply) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    replies.push(reply);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        replies
    }

    /// Requests submitted but not yet answered.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

impl Drop for SyncWorker {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop.
        self.request_tx = None;
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

fn request_kind(request: &SyncRequest) -> &'static str {
    match request {
        SyncRequest::ListCampaigns => "list campaigns",
        SyncRequest::ListScenes { .. } => "list scenes",
        SyncRequest::CreateScene { .. } => "create scene",
        SyncRequest::Load(_) => "load scene",
        SyncRequest::Commit { mutation, .. } => mutation.describe(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use tabletop_core::{Campaign, MemoryStore};

    fn wait_for(worker: &mut SyncWorker, count: usize) -> Vec<SyncReply> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut replies = Vec::new();
        while replies.len() < count && Instant::now() < deadline {
            replies.extend(worker.poll());
            thread::sleep(Duration::from_millis(5));
        }
        replies
    }

    #[test]
    fn test_replies_arrive_in_order() {
        let store = MemoryStore::with_campaigns([Campaign {
            id: "c1".to_string(),
            name: "Campaign".to_string(),
        }]);
        let mut worker = SyncWorker::spawn(Synchronizer::new(Arc::new(store)), Box::new(|| {}));

        worker.submit([
            SyncRequest::ListCampaigns,
            SyncRequest::ListScenes {
                campaign_id: "c1".to_string(),
            },
        ]);
        let replies = wait_for(&mut worker, 2);

        assert_eq!(replies.len(), 2);
        assert!(matches!(&replies[0], SyncReply::Campaigns(Ok(c)) if c.len() == 1));
        assert!(matches!(&replies[1], SyncReply::Scenes { result: Ok(s), .. } if s.is_empty()));
        assert_eq!(worker.in_flight(), 0);
    }

    #[test]
    fn test_waker_called_per_reply() {
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = calls.clone();
        let mut worker = SyncWorker::spawn(
            Synchronizer::new(Arc::new(MemoryStore::new())),
            Box::new(move || {
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            }),
        );

        worker.submit([SyncRequest::ListCampaigns]);
        assert_eq!(wait_for(&mut worker, 1).len(), 1);
        drop(worker);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
