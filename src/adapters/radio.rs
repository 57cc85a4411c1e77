//! Log-only radio adapter.
//!
//! Implements [`RadioPort`] by logging each call and handing out
//! advertising-set handles locally.  Used by host runs, and on device
//! until the controller binding lands.

use log::{debug, info};

use crate::app::ports::{AdvertisingParams, RadioPort, ResponseTarget, SyncReceiveParams};
use crate::error::StackError;
use crate::pawr::dispatch::MAX_RESPONSE_LEN;

/// Radio that accepts every request.
#[derive(Debug, Default)]
pub struct LoggingRadio {
    next_advertising_set: u8,
    advertising: Option<u8>,
    responses_sent: u32,
    last_response: heapless::Vec<u8, MAX_RESPONSE_LEN>,
}

impl LoggingRadio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_advertising(&self) -> bool {
        self.advertising.is_some()
    }

    pub fn responses_sent(&self) -> u32 {
        self.responses_sent
    }

    pub fn last_response(&self) -> &[u8] {
        &self.last_response
    }
}

impl RadioPort for LoggingRadio {
    fn set_default_sync_receive_parameters(
        &mut self,
        params: &SyncReceiveParams,
    ) -> Result<(), StackError> {
        info!(
            "radio: sync receive skip={} timeout={} report_all={}",
            params.skip, params.timeout, params.report_all
        );
        Ok(())
    }

    fn start_advertising(&mut self, params: &AdvertisingParams) -> Result<u8, StackError> {
        let set = self.next_advertising_set;
        self.next_advertising_set = self.next_advertising_set.wrapping_add(1);
        self.advertising = Some(set);
        info!("radio: advertising on set {} every {} units", set, params.interval_units);
        Ok(set)
    }

    fn stop_advertising(&mut self, handle: u8) -> Result<(), StackError> {
        info!("radio: advertising set {} stopped", handle);
        if self.advertising == Some(handle) {
            self.advertising = None;
        }
        Ok(())
    }

    fn close_connection(&mut self, connection: u8) -> Result<(), StackError> {
        info!("radio: close connection {}", connection);
        Ok(())
    }

    fn close_sync(&mut self, sync: u16) -> Result<(), StackError> {
        info!("radio: close sync {:#06x}", sync);
        Ok(())
    }

    fn set_response_data(
        &mut self,
        target: &ResponseTarget,
        data: &[u8],
    ) -> Result<(), StackError> {
        debug!(
            "radio: response ev={} sub={} slot={} {:02x?}",
            target.event_counter, target.subevent, target.response_slot, data
        );
        // Callers never exceed MAX_RESPONSE_LEN; keep the prefix if they do.
        let keep = data.len().min(MAX_RESPONSE_LEN);
        self.last_response = heapless::Vec::from_slice(&data[..keep]).unwrap_or_default();
        self.responses_sent += 1;
        Ok(())
    }
}
