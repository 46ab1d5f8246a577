// High-level UPS commands
//
// Each command is one fixed-point command write; the delay variants
// embed the caller's delay as the command argument. All of these go
// through the normal write path and therefore carry the session token.

use crate::client::{DATA_DEV_ID, UnityClient};
use crate::error::Error;
use crate::wire::SetValue;

impl UnityClient {
    /// Start a battery self-test.
    pub async fn battery_test(&self) -> Result<(), Error> {
        self.command("v5858", "1", "Start Test").await
    }

    /// Turn the output on after `delay_secs` seconds.
    pub async fn output_on(&self, delay_secs: u32) -> Result<(), Error> {
        self.command("v5816", &delay_secs.to_string(), "ON").await
    }

    /// Turn the output off after `delay_secs` seconds.
    pub async fn output_off(&self, delay_secs: u32) -> Result<(), Error> {
        self.command("v5814", &delay_secs.to_string(), "OFF").await
    }

    /// Reboot the output after `delay_secs` seconds.
    pub async fn output_reboot(&self, delay_secs: u32) -> Result<(), Error> {
        self.command("v5815", &delay_secs.to_string(), "Reboot").await
    }

    /// Silence the audible alarm.
    pub async fn silence_alarm(&self) -> Result<(), Error> {
        self.command("v6257", "1", "Silence").await
    }

    /// Abort a pending output command.
    pub async fn abort(&self) -> Result<(), Error> {
        self.command("v6200", "1", "Abort").await
    }

    /// Reset the black-out / brown-out counters.
    pub async fn reset_power_stats(&self) -> Result<(), Error> {
        self.command("v6216", "1", "Reset").await
    }

    /// Restart the management card itself. The UPS keeps running; the
    /// session is gone once the card comes back.
    pub async fn restart_card(&self) -> Result<(), Error> {
        self.command("v6203", "1", "Restart").await
    }

    async fn command(&self, point: &str, value: &str, label: &str) -> Result<(), Error> {
        self.set_data(&[(point, SetValue::command(value, label))], DATA_DEV_ID)
            .await
    }
}
