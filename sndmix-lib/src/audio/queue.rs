//! Producer-fed stream backed by a bounded ring buffer.
//!
//! A decoder or video-sync thread keeps a [`QueueWriter`] and pushes samples
//! as they become available while the mixer owns the matching
//! [`QueuedStream`]. The stream reports end of data whenever the queue runs
//! dry, but only ends for good after [`QueueWriter::finish`].

use dasp_ring_buffer::Bounded;
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

use super::stream::AudioStream;

struct QueueState {
    buffer: Bounded<Vec<i16>>,
    finished: bool,
}

type SharedQueue = Arc<Mutex<QueueState>>;

/// Producer half of a queued stream.
#[derive(Clone)]
pub struct QueueWriter {
    state: SharedQueue,
    channels: usize,
}

/// Consumer half of a queued stream, handed to the mixer.
pub struct QueuedStream {
    state: SharedQueue,
    rate: u32,
    stereo: bool,
}

/// Create a connected writer/stream pair holding up to `capacity` samples.
pub fn queued_stream(rate: u32, stereo: bool, capacity: usize) -> (QueueWriter, QueuedStream) {
    let channels = if stereo { 2 } else { 1 };
    let capacity = capacity.max(channels);
    let state = Arc::new(Mutex::new(QueueState {
        buffer: Bounded::from(vec![0_i16; capacity]),
        finished: false,
    }));
    (
        QueueWriter {
            state: state.clone(),
            channels,
        },
        QueuedStream {
            state,
            rate,
            stereo,
        },
    )
}

impl QueueWriter {
    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|err| err.into_inner())
    }

    /// Queue as many whole frames from `samples` as fit.
    ///
    /// Returns the number of samples accepted; never blocks on a full queue.
    /// Samples pushed after [`QueueWriter::finish`] are ignored.
    pub fn push(&self, samples: &[i16]) -> usize {
        let mut state = self.lock_state();
        if state.finished {
            return 0;
        }
        let space = state.buffer.max_len().saturating_sub(state.buffer.len());
        let mut take = space.min(samples.len());
        take -= take % self.channels;
        for sample in samples[..take].iter().copied() {
            state.buffer.push(sample);
        }
        take
    }

    /// Free space in samples.
    pub fn remaining_space(&self) -> usize {
        let state = self.lock_state();
        state.buffer.max_len().saturating_sub(state.buffer.len())
    }

    /// Samples waiting to be mixed.
    pub fn queued(&self) -> usize {
        self.lock_state().buffer.len()
    }

    /// Mark the stream complete; it ends once the queue drains.
    pub fn finish(&self) {
        self.lock_state().finished = true;
    }
}

impl AudioStream for QueuedStream {
    fn read_buffer(&mut self, buffer: &mut [i16]) -> usize {
        // Never wait on the producer from the render thread.
        let mut state = match self.state.try_lock() {
            Ok(state) => state,
            Err(TryLockError::WouldBlock) => return 0,
            Err(TryLockError::Poisoned(err)) => err.into_inner(),
        };
        let channels = self.channels();
        let mut count = state.buffer.len().min(buffer.len());
        count -= count % channels;
        for slot in buffer[..count].iter_mut() {
            *slot = state.buffer.pop().unwrap_or(0);
        }
        count
    }

    fn is_stereo(&self) -> bool {
        self.stereo
    }

    fn rate(&self) -> u32 {
        self.rate
    }

    fn end_of_data(&self) -> bool {
        match self.state.try_lock() {
            Ok(state) => state.buffer.len() == 0,
            Err(TryLockError::WouldBlock) => true,
            Err(TryLockError::Poisoned(err)) => err.into_inner().buffer.len() == 0,
        }
    }

    fn end_of_stream(&self) -> bool {
        match self.state.try_lock() {
            Ok(state) => state.finished && state.buffer.len() == 0,
            Err(TryLockError::WouldBlock) => false,
            Err(TryLockError::Poisoned(err)) => {
                let state = err.into_inner();
                state.finished && state.buffer.len() == 0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_queue_is_not_finished() {
        let (_writer, mut stream) = queued_stream(22_050, false, 16);
        let mut buf = [0_i16; 4];
        assert_eq!(stream.read_buffer(&mut buf), 0);
        assert!(stream.end_of_data());
        assert!(!stream.end_of_stream());
    }

    #[test]
    fn samples_flow_in_order() {
        let (writer, mut stream) = queued_stream(22_050, false, 16);
        assert_eq!(writer.push(&[1, 2, 3]), 3);
        let mut buf = [0_i16; 2];
        assert_eq!(stream.read_buffer(&mut buf), 2);
        assert_eq!(buf, [1, 2]);
        assert_eq!(writer.queued(), 1);
    }

    #[test]
    fn push_respects_capacity_and_frames() {
        let (writer, _stream) = queued_stream(22_050, true, 5);
        assert_eq!(writer.push(&[1, 2, 3, 4, 5, 6]), 4);
        assert_eq!(writer.remaining_space(), 1);
        assert_eq!(writer.push(&[7, 8]), 0);
    }

    #[test]
    fn finish_ends_after_drain() {
        let (writer, mut stream) = queued_stream(22_050, false, 8);
        writer.push(&[9, 9]);
        writer.finish();
        assert!(!stream.end_of_stream());
        let mut buf = [0_i16; 4];
        assert_eq!(stream.read_buffer(&mut buf), 2);
        assert!(stream.end_of_stream());
        assert_eq!(writer.push(&[1]), 0);
    }

    #[test]
    fn writer_survives_a_poisoned_queue() {
        let (writer, mut stream) = queued_stream(22_050, false, 8);
        let state = writer.state.clone();
        let _ = std::thread::spawn(move || {
            let _guard = state.lock().unwrap();
            panic!("producer thread died holding the queue");
        })
        .join();
        assert!(writer.state.is_poisoned());

        assert_eq!(writer.push(&[4, 5]), 2);
        assert_eq!(writer.queued(), 2);
        assert_eq!(writer.remaining_space(), 6);
        writer.finish();
        let mut buf = [0_i16; 2];
        assert_eq!(stream.read_buffer(&mut buf), 2);
        assert_eq!(buf, [4, 5]);
        assert!(stream.end_of_stream());
    }
}
