//! Single in-flight frame gate.
//!
//! The scheduler submits a new frame only after the previous submission has
//! fully completed on the device. The gate is a flag guarded by a mutex and
//! condvar: acquired before encoding, released from the queue's
//! `on_submitted_work_done` callback, which runs on a device thread.

use std::sync::{Arc, Condvar, Mutex};

#[derive(Debug)]
struct Inner {
    busy: Mutex<bool>,
    done: Condvar,
}

/// Cloneable handle to the gate. Clones share one flag.
#[derive(Debug, Clone)]
pub struct FrameGate {
    inner: Arc<Inner>,
}

impl FrameGate {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                busy: Mutex::new(false),
                done: Condvar::new(),
            }),
        }
    }

    /// Take the gate if no frame is in flight.
    pub fn try_acquire(&self) -> bool {
        let mut busy = self.inner.busy.lock().unwrap();
        if *busy {
            false
        } else {
            *busy = true;
            true
        }
    }

    /// Block until the in-flight frame completes, then take the gate.
    pub fn acquire(&self) {
        let mut busy = self.inner.busy.lock().unwrap();
        while *busy {
            busy = self.inner.done.wait(busy).unwrap();
        }
        *busy = true;
    }

    /// Mark the in-flight frame complete and wake waiters.
    pub fn release(&self) {
        let mut busy = self.inner.busy.lock().unwrap();
        *busy = false;
        self.inner.done.notify_all();
    }

    /// Whether a frame is currently in flight.
    pub fn is_busy(&self) -> bool {
        *self.inner.busy.lock().unwrap()
    }
}

impl Default for FrameGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_acquire_release() {
        let gate = FrameGate::new();
        assert!(!gate.is_busy());

        assert!(gate.try_acquire());
        assert!(gate.is_busy());
        assert!(!gate.try_acquire());

        gate.release();
        assert!(!gate.is_busy());
        assert!(gate.try_acquire());
    }

    #[test]
    fn test_acquire_blocks_until_release() {
        let gate = FrameGate::new();
        gate.acquire();

        let worker = {
            let gate = gate.clone();
            thread::spawn(move || {
                gate.acquire();
                gate.release();
            })
        };

        // Worker cannot finish while we hold the gate.
        thread::sleep(Duration::from_millis(20));
        assert!(!worker.is_finished());

        gate.release();
        worker.join().unwrap();
    }

    #[test]
    fn test_never_two_frames_in_flight() {
        let gate = FrameGate::new();
        let in_flight = Arc::new(Mutex::new(0u32));
        let max_seen = Arc::new(Mutex::new(0u32));

        let mut workers = Vec::new();
        for _ in 0..4 {
            let gate = gate.clone();
            let in_flight = Arc::clone(&in_flight);
            let max_seen = Arc::clone(&max_seen);
            workers.push(thread::spawn(move || {
                for _ in 0..50 {
                    gate.acquire();
                    {
                        let mut count = in_flight.lock().unwrap();
                        *count += 1;
                        let mut max = max_seen.lock().unwrap();
                        *max = (*max).max(*count);
                    }
                    thread::yield_now();
                    *in_flight.lock().unwrap() -= 1;
                    gate.release();
                }
            }));
        }
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(*max_seen.lock().unwrap(), 1);
    }
}
