//! The real-time mix pass.

use super::engine::MixerEngine;

impl MixerEngine {
    /// Mix every active channel into `out` (interleaved stereo i16).
    ///
    /// Works through the preallocated accumulator one block at a time so the
    /// pass never allocates. Returns the furthest frame any channel reached;
    /// `0` when nothing played.
    pub(crate) fn render(&mut self, out: &mut [i16]) -> usize {
        out.fill(0);
        let frames = out.len() / 2;
        let block_frames = self.accumulator.len() / 2;
        if block_frames == 0 {
            return 0;
        }

        let mut written = 0;
        let mut offset = 0;
        while offset < frames {
            let count = block_frames.min(frames - offset);
            let produced = self.mix_block(count);
            clip_into(
                &self.accumulator[..count * 2],
                &mut out[offset * 2..(offset + count) * 2],
            );
            if produced > 0 {
                written = offset + produced;
            }
            offset += count;
        }
        written
    }

    /// Sum all channels into the first `frames` frames of the accumulator.
    fn mix_block(&mut self, frames: usize) -> usize {
        let Self {
            slots,
            types,
            accumulator,
            ..
        } = self;
        let acc = &mut accumulator[..frames * 2];
        acc.fill(0);

        let mut produced = 0;
        for slot in slots.iter_mut() {
            let Some(channel) = slot.channel.as_mut() else {
                continue;
            };
            if !channel.paused {
                // Muted groups still pull samples so their position advances.
                let (vol_l, vol_r) = channel.side_volumes(types.effective_volume(channel.sound_type));
                produced = produced.max(channel.mix(acc, vol_l, vol_r));
            }
            if channel.is_finished() {
                slot.retire();
            }
        }
        produced
    }
}

/// Saturate the accumulator into 16-bit output.
fn clip_into(acc: &[i32], out: &mut [i16]) {
    for (dst, &sample) in out.iter_mut().zip(acc) {
        *dst = sample.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
    }
}

#[cfg(test)]
mod tests {
    use super::clip_into;

    #[test]
    fn clipping_saturates_both_directions() {
        let acc = [70_000, -70_000, 12, -12];
        let mut out = [0_i16; 4];
        clip_into(&acc, &mut out);
        assert_eq!(out, [i16::MAX, i16::MIN, 12, -12]);
    }
}
