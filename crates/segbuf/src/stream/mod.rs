//! Reading, writing and encoding adapters over segmented buffers.
//!
//! Readers borrow the buffer shared and writers borrow it exclusively, so a
//! buffer cannot be mutated while a reader is positioned in it.
//!
//! The async entry points never suspend on their own. They hand their work
//! to a [`Scheduler`] together with a [`Priority`], which lets the caller
//! decide where and when the work runs; [`InlineScheduler`] runs it on the
//! spot when the returned future is polled.

mod encode;
mod reader;
mod writer;

use alloc::boxed::Box;

use futures::future::{self, FutureExt, LocalBoxFuture};

pub use encode::{AsciiEncoder, ByteSink, CharsetEncoder, Latin1Encoder, Utf8Encoder, VecSink, encode};
pub use reader::BufferReader;
pub use writer::BufferWriter;

/// Scheduling class of a unit of work, from most to least urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    Urgent,
    Important,
    RatherImportant,
    #[default]
    Normal,
    RatherLessImportant,
    LessImportant,
    Background,
}

/// Runs deferred work on behalf of the stream adapters.
pub trait Scheduler {
    /// Schedules `task` at `priority`. The returned future resolves to the
    /// task's result once it has run.
    fn schedule<'a, R: 'a>(
        &self,
        priority: Priority,
        task: Box<dyn FnOnce() -> R + 'a>,
    ) -> LocalBoxFuture<'a, R>;
}

/// Runs every task in place, the first time its future is polled.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineScheduler;

impl Scheduler for InlineScheduler {
    fn schedule<'a, R: 'a>(
        &self,
        _priority: Priority,
        task: Box<dyn FnOnce() -> R + 'a>,
    ) -> LocalBoxFuture<'a, R> {
        future::lazy(move |_| task()).boxed_local()
    }
}


#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn priorities_order_from_urgent_to_background() {
        assert!(Priority::Urgent < Priority::Normal);
        assert!(Priority::Normal < Priority::Background);
        assert_eq!(Priority::default(), Priority::Normal);
    }

    #[test]
    fn inline_scheduler_runs_on_poll() {
        let mut ran = false;
        let result = block_on(InlineScheduler.schedule(
            Priority::Background,
            Box::new(|| {
                ran = true;
                7
            }),
        ));
        assert_eq!(result, 7);
        assert!(ran);
    }
}
