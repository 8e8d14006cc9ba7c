use crate::credentials::credential::Credential;
use futures::channel::oneshot;
use std::collections::VecDeque;
use std::sync::Mutex;

/// FIFO store of credentials available to one requester. `send` either
/// fulfills the oldest live waiter or enqueues the credential; `take`
/// suspends until one arrives. This is the only suspension point in the
/// core, and dropping the `take` future cleanly withdraws the wait.
#[derive(Debug, Default)]
pub struct CredentialPool {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    queue: VecDeque<Credential>,
    waiters: VecDeque<oneshot::Sender<Credential>>,
}

impl CredentialPool {
    pub fn new() -> Self {
        CredentialPool::default()
    }

    pub fn send(&self, credential: Credential) {
        let mut inner = self.inner.lock().expect("credential pool lock poisoned");
        let mut credential = credential;
        // Waiters whose take() future was dropped bounce the credential
        // back; skip them until a live one accepts or none remain.
        while let Some(waiter) = inner.waiters.pop_front() {
            match waiter.send(credential) {
                Ok(()) => return,
                Err(returned) => credential = returned,
            }
        }
        inner.queue.push_back(credential);
    }

    /// Non-blocking variant of [`CredentialPool::take`].
    pub fn try_take(&self) -> Option<Credential> {
        self.inner.lock().expect("credential pool lock poisoned").queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("credential pool lock poisoned").queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Takes the next credential, waiting for a `send` if the pool is
    /// empty. Waiters are fulfilled in arrival order regardless of the
    /// credential's value. Cancel by dropping the future; a credential
    /// already routed to the dropped waiter is returned to the pool.
    pub async fn take(&self) -> Credential {
        let receiver = {
            let mut inner = self.inner.lock().expect("credential pool lock poisoned");
            if let Some(credential) = inner.queue.pop_front() {
                return credential;
            }
            let (sender, receiver) = oneshot::channel();
            inner.waiters.push_back(sender);
            receiver
        };
        let mut waiter = Waiter { receiver, pool: self, done: false };
        let credential = (&mut waiter.receiver)
            .await
            .expect("credential pool dropped its waiter list while borrowed");
        waiter.done = true;
        credential
    }
}

/// Restores a credential delivered into a cancelled `take` future. The
/// race window is a `send` completing between the last poll and the drop.
struct Waiter<'a> {
    receiver: oneshot::Receiver<Credential>,
    pool: &'a CredentialPool,
    done: bool,
}

impl Drop for Waiter<'_> {
    fn drop(&mut self) {
        if !self.done {
            if let Ok(Some(credential)) = self.receiver.try_recv() {
                self.pool.send(credential);
            }
        }
    }
}
