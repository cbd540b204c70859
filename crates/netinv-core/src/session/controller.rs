// ── Session controller ──
//
// Owns the browser session exclusively and interprets the effects produced
// by the state machine. Every path that fails while holding the browser
// goes through `fail`, which records the fault and releases the driver
// before the error reaches the caller.

use netinv_api::{Credential, DriverLauncher, PortalDriver};
use secrecy::ExposeSecret;
use tracing::{debug, info, warn};
use url::Url;

use super::liveness::{self, MARKER_FRAGMENT};
use super::secondary_factor::SecondaryFactorHandler;
use super::state::{Effect, InvalidTransition, SessionEvent, SessionState, Transition, transition};
use super::wait::Deadline;
use crate::config::PortalConfig;
use crate::error::{AuthenticationError, CoreError};

/// Authenticated access to the portal through one browser session.
///
/// Not `Clone`: the browser session is a single cursor. Wrap the
/// controller in a mutex (see [`Inventory`](crate::Inventory)) to share it.
pub struct SessionController<L: DriverLauncher> {
    launcher: L,
    config: PortalConfig,
    credential: Credential,
    state: SessionState,
    driver: Option<L::Driver>,
    last_title: String,
}

impl<L: DriverLauncher> SessionController<L> {
    pub fn new(launcher: L, config: PortalConfig, credential: Credential) -> Self {
        Self {
            launcher,
            config,
            credential,
            state: SessionState::Unauthenticated,
            driver: None,
            last_title: String::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    /// Title of the most recently inspected page.
    pub fn last_title(&self) -> &str {
        &self.last_title
    }

    // ── Login ────────────────────────────────────────────────────────

    /// Launch a browser and log in, running the secondary-factor challenge
    /// in production. On failure the browser has already been released.
    pub async fn authenticate(&mut self) -> Result<(), AuthenticationError> {
        info!(
            user = %self.credential.username,
            environment = %self.config.environment,
            portal = %self.config.base_url,
            "authenticating"
        );
        let first = self.apply(SessionEvent::Begin)?;
        self.run(first).await?;
        info!("session live");
        Ok(())
    }

    /// Re-run the login flow on the existing browser after the session went
    /// stale. A single attempt; any failure is wrapped in
    /// [`AuthenticationError::ReloginFailed`].
    pub async fn refresh(&mut self) -> Result<(), AuthenticationError> {
        let first = self.apply(SessionEvent::Relogin)?;
        info!("session stale, re-authenticating");
        self.run(first)
            .await
            .map_err(|source| AuthenticationError::ReloginFailed {
                source: Box::new(source),
            })
    }

    /// Record that a fetched page failed the liveness check.
    pub fn mark_stale(&mut self) -> Result<(), InvalidTransition> {
        self.apply(SessionEvent::LivenessLost).map(|_| ())
    }

    /// Release the browser session. Idempotent.
    pub async fn close(&mut self) -> Result<(), CoreError> {
        if self.state.is_terminal() {
            return Ok(());
        }
        let closing = self.apply(SessionEvent::Close)?;
        for effect in closing.effects {
            self.execute(effect).await?;
        }
        Ok(())
    }

    // ── Fetching ─────────────────────────────────────────────────────

    /// Navigate to `url` and return the page source. No liveness check.
    pub async fn fetch(&mut self, url: &Url) -> Result<String, CoreError> {
        if !matches!(self.state, SessionState::Live | SessionState::Stale) {
            return Err(CoreError::SessionUnavailable { state: self.state });
        }
        let Some(driver) = self.driver.as_mut() else {
            return Err(CoreError::SessionUnavailable { state: self.state });
        };

        debug!(%url, "fetching");
        let result = match driver.navigate(url).await {
            Ok(()) => driver.page_source().await,
            Err(e) => Err(e),
        };
        match result {
            Ok(page) => Ok(page),
            Err(e) if e.is_session_gone() => {
                let err = self.fail(AuthenticationError::Driver(e)).await;
                Err(err.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch `url` only after confirming the session is live on the base
    /// page. A failed check triggers exactly one refresh; a second failure
    /// is [`CoreError::MissingData`] with the last title and `url`.
    pub async fn fetch_verified(&mut self, url: &Url) -> Result<String, CoreError> {
        let base = self.config.base_url.clone();
        let mut refreshed = false;
        if self.state == SessionState::Stale {
            self.refresh().await?;
            refreshed = true;
        }

        loop {
            let base_page = self.fetch(&base).await?;
            let title = liveness::page_title(&base_page).unwrap_or_default();
            let live = liveness::is_live_title(&title);
            self.last_title = title;

            if live {
                if *url == base {
                    return Ok(base_page);
                }
                return self.fetch(url).await;
            }

            warn!(title = %self.last_title, "liveness check failed");
            if self.state.is_live() {
                self.mark_stale()?;
            }
            if refreshed {
                return Err(CoreError::MissingData {
                    title: self.last_title.clone(),
                    url: url.to_string(),
                });
            }
            self.refresh().await?;
            refreshed = true;
        }
    }

    // ── Effect interpretation ────────────────────────────────────────

    fn apply(&mut self, event: SessionEvent) -> Result<Transition, InvalidTransition> {
        let next = transition(self.state, event, self.config.environment)?;
        debug!(from = %self.state, %event, to = %next.next, "session transition");
        self.state = next.next;
        Ok(next)
    }

    /// Execute effects until a transition produces none.
    async fn run(&mut self, mut pending: Transition) -> Result<(), AuthenticationError> {
        loop {
            let mut follow_up = None;
            for effect in pending.effects {
                match self.execute(effect).await {
                    Ok(Some(event)) => follow_up = Some(event),
                    Ok(None) => {}
                    Err(e) => return Err(self.fail(e).await),
                }
            }

            let Some(event) = follow_up else {
                return Ok(());
            };
            pending = match self.apply(event) {
                Ok(next) => next,
                Err(e) => return Err(self.fail(e.into()).await),
            };
        }
    }

    async fn execute(&mut self, effect: Effect) -> Result<Option<SessionEvent>, AuthenticationError> {
        match effect {
            Effect::LaunchDriver => {
                let driver = self.launcher.launch().await?;
                self.driver = Some(driver);
                Ok(None)
            }
            Effect::SubmitCredentials => {
                let driver = self.driver.as_mut().ok_or(netinv_api::Error::SessionClosed)?;
                submit_credentials(driver, &self.config, &self.credential).await?;
                Ok(Some(SessionEvent::CredentialsSubmitted))
            }
            Effect::RunSecondaryFactor => {
                let driver = self.driver.as_mut().ok_or(netinv_api::Error::SessionClosed)?;
                SecondaryFactorHandler::new(&self.config.timings, &self.config.selectors)
                    .run(driver)
                    .await?;
                Ok(Some(SessionEvent::PushRequested))
            }
            Effect::AwaitMarker => {
                let driver = self.driver.as_mut().ok_or(netinv_api::Error::SessionClosed)?;
                let outcome = await_marker(driver, &self.config).await;
                match outcome {
                    Ok(title) => {
                        self.last_title = title;
                        Ok(Some(SessionEvent::MarkerConfirmed))
                    }
                    Err(e) => {
                        if let AuthenticationError::CredentialRejected { title } = &e {
                            self.last_title.clone_from(title);
                        }
                        Err(e)
                    }
                }
            }
            Effect::Release => {
                self.release().await;
                Ok(None)
            }
        }
    }

    /// Move to `Failed`, release the browser and hand `err` back.
    async fn fail(&mut self, err: AuthenticationError) -> AuthenticationError {
        warn!(error = %err, state = %self.state, "session failed, releasing browser");
        match self.apply(SessionEvent::Fault) {
            Ok(next) => {
                for effect in next.effects {
                    if effect == Effect::Release {
                        self.release().await;
                    }
                }
            }
            Err(_) => self.release().await,
        }
        err
    }

    async fn release(&mut self) {
        if let Some(mut driver) = self.driver.take() {
            if let Err(e) = driver.quit().await {
                warn!(error = %e, "failed to release browser session");
            }
        }
    }
}

// ── Login steps ──────────────────────────────────────────────────────

async fn submit_credentials<D: PortalDriver>(
    driver: &mut D,
    config: &PortalConfig,
    credential: &Credential,
) -> Result<(), netinv_api::Error> {
    let selectors = &config.selectors;
    driver.navigate(&config.base_url).await?;

    let username = driver.find(&selectors.username).await?;
    driver.send_keys(&username, &credential.username).await?;
    let password = driver.find(&selectors.password).await?;
    driver
        .send_keys(&password, credential.password.expose_secret())
        .await?;

    let submit = driver.find(&selectors.submit).await?;
    driver.click(&submit).await?;
    debug!(user = %credential.username, "credentials submitted");
    Ok(())
}

/// Wait for the post-login marker, then confirm liveness on the base page.
/// Returns the confirmed title.
async fn await_marker<D: PortalDriver>(
    driver: &mut D,
    config: &PortalConfig,
) -> Result<String, AuthenticationError> {
    let timings = &config.timings;
    let deadline = Deadline::after(timings.marker_timeout);
    loop {
        let title = driver.title().await?;
        if title.contains(MARKER_FRAGMENT) {
            break;
        }
        if deadline.expired() {
            return Err(AuthenticationError::CredentialRejected { title });
        }
        deadline.tick(timings.poll_interval).await;
    }

    driver.navigate(&config.base_url).await?;
    let page = driver.page_source().await?;
    let title = liveness::page_title(&page).unwrap_or_default();
    if liveness::is_live_title(&title) {
        Ok(title)
    } else {
        Err(AuthenticationError::CredentialRejected { title })
    }
}
