//! Channel table and per-type state behind the [`Mixer`](super::Mixer) facade.
//!
//! Everything here runs with the mixer lock held. Lookups by handle or id
//! that miss are silent no-ops.

use log::{debug, warn};

use crate::audio::timestamp::Timestamp;
use crate::settings::MixerSettings;

use super::channel::{Channel, ChannelStream, StreamFormat};
use super::handle::{next_generation, SoundHandle};
use super::sound_type::{SoundType, SoundTypeTable};
use super::PlayOptions;

pub(crate) struct Slot {
    pub(crate) generation: u32,
    pub(crate) channel: Option<Channel>,
}

impl Slot {
    /// Free the slot, bumping its generation. Returns the retired channel,
    /// whose owned stream is dropped along with it.
    pub(crate) fn retire(&mut self) -> Option<Channel> {
        let channel = self.channel.take();
        if channel.is_some() {
            self.generation = next_generation(self.generation);
        }
        channel
    }
}

pub(crate) struct MixerEngine {
    pub(crate) slots: Vec<Slot>,
    pub(crate) types: SoundTypeTable,
    pub(crate) output_rate: u32,
    /// Interleaved stereo accumulator, sized once from the settings.
    pub(crate) accumulator: Vec<i32>,
}

impl MixerEngine {
    pub(crate) fn new(settings: &MixerSettings) -> Self {
        let slots = (0..settings.channel_count)
            .map(|_| Slot {
                generation: 0,
                channel: None,
            })
            .collect();
        Self {
            slots,
            types: SoundTypeTable::new(&settings.volumes),
            output_rate: settings.output_rate,
            accumulator: vec![0; settings.buffer_frames * 2],
        }
    }

    pub(crate) fn play_stream(
        &mut self,
        sound_type: SoundType,
        stream: ChannelStream,
        format: StreamFormat,
        options: PlayOptions,
    ) -> Option<SoundHandle> {
        let id = options.normalized_id();
        if let Some(id) = id {
            if self.find_id(id).is_some() {
                debug!("sound id {} already playing; dropping request", id);
                return None;
            }
        }

        let Some(index) = self.slots.iter().position(|slot| slot.channel.is_none()) else {
            warn!("out of mixer channels ({} in use)", self.slots.len());
            return None;
        };

        let mut channel = Channel::new(
            sound_type,
            stream,
            format,
            self.output_rate,
            id,
            options.permanent,
            options.reverse_stereo,
        );
        channel.set_volume(options.volume);
        channel.set_balance(options.balance);

        let owned = channel.is_stream_owned();
        let slot = &mut self.slots[index];
        slot.channel = Some(channel);
        let handle = SoundHandle::new(index as u16, slot.generation);
        debug!(
            "playing {} sound in slot {} (generation {}, id {:?}, owned: {})",
            sound_type, index, slot.generation, id, owned
        );
        Some(handle)
    }

    pub(crate) fn channel(&self, handle: SoundHandle) -> Option<&Channel> {
        let slot = self.slots.get(handle.index())?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.channel.as_ref()
    }

    pub(crate) fn channel_mut(&mut self, handle: SoundHandle) -> Option<&mut Channel> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.channel.as_mut()
    }

    pub(crate) fn find_id(&self, id: i32) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.channel.as_ref().is_some_and(|ch| ch.id == Some(id)))
    }

    fn channels_mut(&mut self) -> impl Iterator<Item = &mut Channel> {
        self.slots.iter_mut().filter_map(|slot| slot.channel.as_mut())
    }

    fn retire_where<F: Fn(&Channel) -> bool>(&mut self, predicate: F) -> usize {
        let mut stopped = 0;
        for slot in self.slots.iter_mut() {
            if slot.channel.as_ref().is_some_and(&predicate) {
                slot.retire();
                stopped += 1;
            }
        }
        stopped
    }

    pub(crate) fn stop_all(&mut self) {
        let stopped = self.retire_where(|ch| !ch.permanent);
        debug!("stopped {} channel(s)", stopped);
    }

    pub(crate) fn stop_id(&mut self, id: i32) {
        self.retire_where(|ch| ch.id == Some(id));
    }

    pub(crate) fn stop_handle(&mut self, handle: SoundHandle) {
        if self.channel(handle).is_some() {
            self.slots[handle.index()].retire();
        }
    }

    pub(crate) fn stop_sound_type(&mut self, sound_type: SoundType) {
        self.retire_where(|ch| ch.sound_type == sound_type);
    }

    pub(crate) fn pause_all(&mut self, paused: bool) {
        for channel in self.channels_mut() {
            channel.paused = paused;
        }
    }

    pub(crate) fn pause_id(&mut self, id: i32, paused: bool) {
        for channel in self.channels_mut().filter(|ch| ch.id == Some(id)) {
            channel.paused = paused;
        }
    }

    pub(crate) fn pause_handle(&mut self, handle: SoundHandle, paused: bool) {
        if let Some(channel) = self.channel_mut(handle) {
            channel.paused = paused;
        }
    }

    pub(crate) fn pause_sound_type(&mut self, sound_type: SoundType, paused: bool) {
        for channel in self.channels_mut().filter(|ch| ch.sound_type == sound_type) {
            channel.paused = paused;
        }
    }

    pub(crate) fn has_active_channel_of_type(&self, sound_type: SoundType) -> bool {
        self.slots
            .iter()
            .any(|slot| slot.channel.as_ref().is_some_and(|ch| ch.sound_type == sound_type))
    }

    pub(crate) fn active_channel_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.channel.is_some()).count()
    }

    pub(crate) fn elapsed_time(&self, handle: SoundHandle) -> Timestamp {
        match self.channel(handle) {
            Some(channel) => channel.elapsed(),
            None => Timestamp::zero(self.output_rate),
        }
    }
}
