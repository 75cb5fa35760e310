multiversx_sc::imports!();

use crate::errors::ERR_INVALID_EPOCH_LENGTH;

/// Epoch index of `timestamp`. Timestamps before `start_time` map to epoch 0.
pub fn epoch_at(timestamp: u64, start_time: u64, epoch_length: u64) -> u64 {
    if timestamp < start_time {
        return 0;
    }
    (timestamp - start_time) / epoch_length
}

#[multiversx_sc::module]
pub trait EpochClockModule {
    /// Epoch 0 starts at the last epoch boundary before deployment, shifted
    /// back by `start_offset` seconds.
    fn init_epoch_clock(&self, epoch_length: u64, start_offset: u64) {
        require!(epoch_length > 0, ERR_INVALID_EPOCH_LENGTH);

        let now = self.blockchain().get_block_timestamp();
        let start_time = (now / epoch_length * epoch_length).saturating_sub(start_offset);

        self.epoch_length().set(epoch_length);
        self.start_time().set(start_time);
    }

    fn current_epoch(&self) -> u64 {
        let now = self.blockchain().get_block_timestamp();
        self.epoch_at_timestamp(now)
    }

    fn epoch_at_timestamp(&self, timestamp: u64) -> u64 {
        epoch_at(timestamp, self.start_time().get(), self.epoch_length().get())
    }

    #[view(getCurrentEpoch)]
    fn get_current_epoch(&self) -> u64 {
        self.current_epoch()
    }

    #[view(getEpochAt)]
    fn get_epoch_at(&self, timestamp: u64) -> u64 {
        self.epoch_at_timestamp(timestamp)
    }

    #[view(getStartTime)]
    #[storage_mapper("startTime")]
    fn start_time(&self) -> SingleValueMapper<u64>;

    #[view(getEpochLength)]
    #[storage_mapper("epochLength")]
    fn epoch_length(&self) -> SingleValueMapper<u64>;
}
