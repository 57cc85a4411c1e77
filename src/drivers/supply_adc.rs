//! Supply-voltage ADC channel for the battery monitor.
//!
//! Uses the ESP-IDF oneshot ADC driver on one ADC1 channel with no
//! attenuation, so the input range sits under the internal reference the
//! battery scaling assumes.

use esp_idf_svc::sys::*;

use log::info;

use crate::error::SensorError;
use crate::sensors::battery::SupplySampler;

/// Oneshot ADC1 unit with a single configured channel.
pub struct EspSupplySampler {
    unit: adc_oneshot_unit_handle_t,
    channel: adc_channel_t,
}

impl EspSupplySampler {
    /// Create the ADC1 unit and configure `channel` for 12-bit, 0 dB.
    pub fn new(channel: adc_channel_t) -> Result<Self, SensorError> {
        let init_cfg = adc_oneshot_unit_init_cfg_t {
            unit_id: adc_unit_t_ADC_UNIT_1,
            ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
            ..Default::default()
        };
        let mut unit: adc_oneshot_unit_handle_t = core::ptr::null_mut();
        // SAFETY: init_cfg outlives the call; unit is written on success.
        let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &mut unit) };
        if ret != ESP_OK as i32 {
            log::error!("supply ADC: unit init failed (rc={})", ret);
            return Err(SensorError::AdcReadFailed);
        }

        let chan_cfg = adc_oneshot_chan_cfg_t {
            atten: adc_atten_t_ADC_ATTEN_DB_0,
            bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
        };
        // SAFETY: unit is the handle created above.
        let ret = unsafe { adc_oneshot_config_channel(unit, channel, &chan_cfg) };
        if ret != ESP_OK as i32 {
            log::error!("supply ADC: channel {} config failed (rc={})", channel, ret);
            // SAFETY: the unit is not handed out on this path.
            unsafe {
                adc_oneshot_del_unit(unit);
            }
            return Err(SensorError::AdcReadFailed);
        }

        info!("supply ADC: ADC1 channel {} ready", channel);
        Ok(Self { unit, channel })
    }
}

impl SupplySampler for EspSupplySampler {
    fn sample(&mut self) -> Result<u16, SensorError> {
        let mut raw: i32 = 0;
        // SAFETY: unit is owned by self; main-loop access only.
        let ret = unsafe { adc_oneshot_read(self.unit, self.channel, &mut raw) };
        if ret != ESP_OK as i32 {
            return Err(SensorError::AdcReadFailed);
        }
        Ok(raw.max(0) as u16)
    }
}

impl Drop for EspSupplySampler {
    fn drop(&mut self) {
        // SAFETY: the handle is not used after this.
        unsafe {
            adc_oneshot_del_unit(self.unit);
        }
    }
}
