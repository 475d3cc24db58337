//! Remote invocations of the dialog library inside the hosted page
//!
//! All of these resolve to an empty result when no window is live.

use super::DialogController;
use crate::error::{AlertError, AlertResult};
use crate::protocol::HostCommand;
use serde_json::Value;
use tracing::{debug, trace};

fn js_string(text: &str) -> String {
    // A JSON string literal is a valid JS string literal
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}

impl DialogController {
    /// Evaluate `code` in the hosted page
    pub async fn exec_js(&self, code: &str) -> AlertResult<Value> {
        let Some(window) = self.window() else {
            return Ok(Value::Null);
        };
        trace!("Evaluating in dialog: {}", code);

        match window.eval(code).await {
            Err(AlertError::WindowDestroyed) => Ok(Value::Null),
            other => other,
        }
    }

    /// Send a command to the hosted page; false when no window is live
    pub fn send_command(&self, command: HostCommand) -> bool {
        match self.window() {
            Some(window) if !window.is_destroyed() => {
                debug!("Sending {:?} to dialog", command);
                window.send(command);
                true
            }
            _ => false,
        }
    }

    /// Refit the window to the popup, optionally after `delay_ms`
    pub fn resize_to_fit(&self, delay_ms: Option<u64>) -> bool {
        self.send_command(HostCommand::ResizeToFit { delay_ms })
    }

    async fn call(&self, method: &str) -> AlertResult<Value> {
        self.exec_js(&format!("Swal.{}", method)).await
    }

    async fn call_unit(&self, method: &str) -> AlertResult<()> {
        self.call(method).await.map(|_| ())
    }

    pub async fn enable_buttons(&self) -> AlertResult<()> {
        self.call_unit("enableButtons()").await
    }

    pub async fn disable_buttons(&self) -> AlertResult<()> {
        self.call_unit("disableButtons()").await
    }

    /// Disable buttons and show the loader
    pub async fn show_loading(&self) -> AlertResult<()> {
        self.call_unit("showLoading()").await
    }

    pub async fn enable_loading(&self) -> AlertResult<()> {
        self.show_loading().await
    }

    pub async fn hide_loading(&self) -> AlertResult<()> {
        self.call_unit("hideLoading()").await
    }

    pub async fn disable_loading(&self) -> AlertResult<()> {
        self.hide_loading().await
    }

    pub async fn is_loading(&self) -> AlertResult<Option<bool>> {
        Ok(self.call("isLoading()").await?.as_bool())
    }

    pub async fn click_confirm(&self) -> AlertResult<()> {
        self.call_unit("clickConfirm()").await
    }

    pub async fn click_cancel(&self) -> AlertResult<()> {
        self.call_unit("clickCancel()").await
    }

    /// Show a validation message and refit the window around it
    pub async fn show_validation_message(&self, message: &str) -> AlertResult<()> {
        self.call_unit(&format!("showValidationMessage({})", js_string(message)))
            .await?;
        self.resize_to_fit(Some(self.runtime.config.validation_resize_delay_ms));
        Ok(())
    }

    pub async fn reset_validation_message(&self) -> AlertResult<()> {
        self.call_unit("resetValidationMessage()").await?;
        self.resize_to_fit(Some(self.runtime.config.validation_resize_delay_ms));
        Ok(())
    }

    pub async fn enable_input(&self) -> AlertResult<()> {
        self.call_unit("enableInput()").await
    }

    pub async fn disable_input(&self) -> AlertResult<()> {
        self.call_unit("disableInput()").await
    }

    /// Milliseconds left on the timer, if one is set
    pub async fn get_timer_left(&self) -> AlertResult<Option<u64>> {
        Ok(self.call("getTimerLeft()").await?.as_u64())
    }

    pub async fn stop_timer(&self) -> AlertResult<Option<u64>> {
        Ok(self.call("stopTimer()").await?.as_u64())
    }

    pub async fn resume_timer(&self) -> AlertResult<Option<u64>> {
        Ok(self.call("resumeTimer()").await?.as_u64())
    }

    pub async fn toggle_timer(&self) -> AlertResult<Option<u64>> {
        Ok(self.call("toggleTimer()").await?.as_u64())
    }

    pub async fn is_timer_running(&self) -> AlertResult<Option<bool>> {
        Ok(self.call("isTimerRunning()").await?.as_bool())
    }

    /// Add `millis` to the timer; returns the updated time left
    pub async fn increase_timer(&self, millis: u64) -> AlertResult<Option<u64>> {
        Ok(self.call(&format!("increaseTimer({})", millis)).await?.as_u64())
    }

    pub async fn show_progress_steps(&self) -> AlertResult<()> {
        self.call_unit("showProgressSteps()").await
    }

    pub async fn hide_progress_steps(&self) -> AlertResult<()> {
        self.call_unit("hideProgressSteps()").await
    }

    pub async fn is_valid_parameter(&self, name: &str) -> AlertResult<Option<bool>> {
        Ok(self
            .call(&format!("isValidParameter({})", js_string(name)))
            .await?
            .as_bool())
    }

    pub async fn is_updatable_parameter(&self, name: &str) -> AlertResult<Option<bool>> {
        Ok(self
            .call(&format!("isUpdatableParameter({})", js_string(name)))
            .await?
            .as_bool())
    }
}
