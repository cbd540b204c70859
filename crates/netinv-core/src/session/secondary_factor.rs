// ── Secondary-factor challenge ──
//
// Drives the out-of-band challenge embedded in the login page. The provider
// fires an automatic push as soon as its frame loads; that push is
// cancelled and, after the anomaly-detection cooldown, a manual push is
// requested instead. Approval happens on the user's device and is only
// observed later through the liveness marker.
//
// Releasing the browser on failure is the controller's job; this handler
// only reports what went wrong.

use netinv_api::{ElementRef, Locator, PortalDriver};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::wait::Deadline;
use crate::config::{PortalSelectors, Timings};
use crate::error::AuthenticationError;

pub struct SecondaryFactorHandler<'a> {
    timings: &'a Timings,
    selectors: &'a PortalSelectors,
}

impl<'a> SecondaryFactorHandler<'a> {
    pub fn new(timings: &'a Timings, selectors: &'a PortalSelectors) -> Self {
        Self { timings, selectors }
    }

    /// Run the full challenge. Each step is a precondition for the next.
    pub async fn run<D: PortalDriver + ?Sized>(&self, driver: &mut D) -> Result<(), AuthenticationError> {
        // 1. Let the challenge frame load, then find it.
        debug!(settle = ?self.timings.factor_settle, "waiting for secondary-factor frame");
        sleep(self.timings.factor_settle).await;
        let frame = match driver.find(&self.selectors.factor_frame).await {
            Ok(frame) => frame,
            Err(e) if e.is_no_such_element() => {
                return Err(AuthenticationError::SecondaryFactorTimeout {
                    control: self.selectors.factor_frame.to_string(),
                    waited: self.timings.factor_settle,
                });
            }
            Err(e) => return Err(e.into()),
        };

        // 2. Inside the frame, wait for the cancel control.
        driver.enter_frame(&frame).await?;
        let cancel = self.await_control(driver, &self.selectors.cancel_control).await?;

        // 3. Abort the automatic push.
        driver.click(&cancel).await?;
        info!("automatic push cancelled");

        // 4. Anomaly-detection cooldown.
        if self.timings.anomaly_cooldown < crate::config::ANOMALY_DETECTION_COOLDOWN {
            warn!(
                configured = ?self.timings.anomaly_cooldown,
                "anomaly-detection cooldown is shorter than the provider requires"
            );
        }
        info!(cooldown = ?self.timings.anomaly_cooldown, "waiting before requesting a manual push");
        sleep(self.timings.anomaly_cooldown).await;

        // 5. Choose the alternate factor and confirm with the push button.
        let choice = driver.find(&self.selectors.alternate_factor).await?;
        driver.click(&choice).await?;
        self.confirm_push(driver).await?;

        // 6. Back to the login page; approval is awaited by the caller.
        driver.leave_frame().await?;
        Ok(())
    }

    async fn await_control<D: PortalDriver + ?Sized>(
        &self,
        driver: &mut D,
        locator: &Locator,
    ) -> Result<ElementRef, AuthenticationError> {
        let deadline = Deadline::after(self.timings.cancel_control_timeout);
        loop {
            match driver.find(locator).await {
                Ok(element) => return Ok(element),
                Err(e) if e.is_no_such_element() => {}
                Err(e) => return Err(e.into()),
            }
            if deadline.expired() {
                warn!(control = %locator, "secondary-factor control never appeared");
                return Err(AuthenticationError::SecondaryFactorTimeout {
                    control: locator.to_string(),
                    waited: deadline.budget(),
                });
            }
            deadline.tick(self.timings.poll_interval).await;
        }
    }

    async fn confirm_push<D: PortalDriver + ?Sized>(&self, driver: &mut D) -> Result<(), AuthenticationError> {
        let buttons = driver.find_all(&self.selectors.confirm_buttons).await?;
        // First match only; clicking every match would send one push per
        // matching button.
        for button in &buttons {
            let label = driver.text(button).await?;
            if label.contains(&self.selectors.push_label) {
                driver.click(button).await?;
                info!(label = %label.trim(), "manual push requested; approve it on your device");
                return Ok(());
            }
        }
        warn!(
            buttons = buttons.len(),
            label = %self.selectors.push_label,
            "no confirm button matched the push label"
        );
        Ok(())
    }
}
