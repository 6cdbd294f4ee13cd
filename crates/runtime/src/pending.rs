use std::fmt;
use std::task::{Context, Poll};

use futures_util::future::{FutureExt, LocalBoxFuture};

use crate::request::{Generation, Request};

struct Pending<T> {
    request: Request,
    generation: Generation,
    future: LocalBoxFuture<'static, T>,
}

/// Output of a request that resolved during [`PendingSet::poll_ready`].
#[derive(Debug, Clone, PartialEq)]
pub struct Completed<T> {
    pub request: Request,
    pub generation: Generation,
    pub output: T,
}

/// Single-shot futures in flight on the local (single) thread.
///
/// Nothing is spawned: the owner polls the set from its own event loop and
/// applies completions in the order they are reported.
///
/// Ordering contract:
/// - Requests are numbered in submission order.
/// - Completions from one poll are returned in submission order.
pub struct PendingSet<T> {
    next_request: u64,
    items: Vec<Pending<T>>,
}

impl<T> Default for PendingSet<T> {
    fn default() -> Self {
        Self {
            next_request: 1,
            items: Vec::new(),
        }
    }
}

impl<T> fmt::Debug for PendingSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingSet")
            .field("next_request", &self.next_request)
            .field(
                "in_flight",
                &self
                    .items
                    .iter()
                    .map(|p| (p.request, p.generation))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<T> PendingSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn submit(&mut self, generation: Generation, future: LocalBoxFuture<'static, T>) -> Request {
        let request = Request(self.next_request);
        self.next_request = self.next_request.wrapping_add(1);
        self.items.push(Pending {
            request,
            generation,
            future,
        });
        request
    }

    /// Drops every request not issued in `generation`, returning the dropped ids.
    pub fn retain_generation(&mut self, generation: Generation) -> Vec<Request> {
        let mut dropped = Vec::new();
        self.items.retain(|p| {
            let keep = p.generation == generation;
            if !keep {
                dropped.push(p.request);
            }
            keep
        });
        dropped
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Polls each in-flight future once and removes those that resolved.
    pub fn poll_ready(&mut self, cx: &mut Context<'_>) -> Vec<Completed<T>> {
        let mut done = Vec::new();
        let mut still_pending = Vec::with_capacity(self.items.len());

        for mut p in self.items.drain(..) {
            match p.future.poll_unpin(cx) {
                Poll::Ready(output) => done.push(Completed {
                    request: p.request,
                    generation: p.generation,
                    output,
                }),
                Poll::Pending => still_pending.push(p),
            }
        }

        self.items = still_pending;
        done
    }
}
