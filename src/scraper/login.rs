//! One-time login, including the wait for a two-factor approval.

use std::time::Duration;

use chromiumoxide::Element;
use tracing::{debug, info};

use crate::app::{PostwatchError, Result};
use crate::scraper::chrome::ChromeSession;
use crate::scraper::config::{Credentials, LoginConfig};
use crate::scraper::scripts::FeedScripts;
use crate::scraper::wait::{self, RetryPolicy};

const ELEMENT_WAIT: RetryPolicy = RetryPolicy {
    attempts: 10,
    interval: Duration::from_secs(1),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginState {
    Pending,
    TwoFactor,
    LoggedIn,
}

impl LoginState {
    fn from_page(value: &str) -> Self {
        match value {
            "two_factor" => Self::TwoFactor,
            "logged_in" => Self::LoggedIn,
            _ => Self::Pending,
        }
    }
}

impl ChromeSession {
    /// Log in with the configured credentials.
    ///
    /// Without credentials the browser profile is assumed to be logged in
    /// already and only the main landmark is awaited.
    pub async fn login(&self, login: &LoginConfig) -> Result<()> {
        let Some(ref creds) = login.credentials else {
            info!("No credentials configured, relying on existing browser profile");
            self.navigate(self.main_page(), &login.url).await?;
            return self.await_state(login, LoginState::LoggedIn).await;
        };

        info!(url = %login.url, "Logging in");
        self.navigate(self.main_page(), &login.url).await?;

        if let Ok(button) = self.main_page().find_element(login.decline_cookies.as_str()).await {
            debug!("Declining cookies");
            button
                .click()
                .await
                .map_err(|e| PostwatchError::Browser(format!("Failed to decline cookies: {}", e)))?;
        }

        self.submit_credentials(login, creds).await?;
        self.await_authentication(login).await?;

        info!("Login successful");
        Ok(())
    }

    async fn submit_credentials(&self, login: &LoginConfig, creds: &Credentials) -> Result<()> {
        let email = self.wait_for_element(&login.email_input).await?;
        type_slowly(&email, &creds.email, login.typing_delay()).await?;

        let password = self.wait_for_element(&login.password_input).await?;
        type_slowly(&password, &creds.password, login.typing_delay()).await?;

        password
            .press_key("Enter")
            .await
            .map_err(|e| PostwatchError::Browser(format!("Failed to submit login: {}", e)))?;
        Ok(())
    }

    async fn await_authentication(&self, login: &LoginConfig) -> Result<()> {
        info!("Waiting for authentication");

        match self.poll_state(login, ELEMENT_WAIT, |s| s != LoginState::Pending).await? {
            Some(LoginState::LoggedIn) => return Ok(()),
            Some(LoginState::TwoFactor) => info!("2FA required"),
            _ => {
                return Err(PostwatchError::Authentication(
                    "Login page never settled".to_string(),
                ))
            }
        }

        if !login.wait_for_two_factor {
            return Err(PostwatchError::Authentication(
                "Two-factor approval required".to_string(),
            ));
        }

        info!("Waiting for 2FA approval");
        let approval = two_factor_policy(login.two_factor_timeout_secs);
        if self
            .poll_state(login, approval, |s| s != LoginState::TwoFactor)
            .await?
            .is_none()
        {
            return Err(PostwatchError::Authentication(format!(
                "Two-factor approval not received within {}s",
                login.two_factor_timeout_secs
            )));
        }
        info!("2FA successful");

        self.await_state(login, LoginState::LoggedIn).await
    }

    async fn await_state(&self, login: &LoginConfig, target: LoginState) -> Result<()> {
        match self.poll_state(login, ELEMENT_WAIT, |s| s == target).await? {
            Some(_) => Ok(()),
            None => Err(PostwatchError::Authentication(format!(
                "{} did not appear",
                login.main_landmark
            ))),
        }
    }

    async fn poll_state(
        &self,
        login: &LoginConfig,
        policy: RetryPolicy,
        done: impl Fn(LoginState) -> bool,
    ) -> Result<Option<LoginState>> {
        let script = FeedScripts::login_state(&login.code_prompt_text, &login.main_landmark);
        let done = &done;
        wait::poll(policy, move |_| {
            let script = script.clone();
            async move {
                let raw: String = self.evaluate(self.main_page(), script).await?;
                let state = LoginState::from_page(&raw);
                Ok(done(state).then_some(state))
            }
        })
        .await
    }

    async fn wait_for_element(&self, selector: &str) -> Result<Element> {
        let page = self.main_page();
        wait::poll(ELEMENT_WAIT, move |_| async move {
            Ok(page.find_element(selector).await.ok())
        })
        .await?
        .ok_or_else(|| PostwatchError::Browser(format!("Could not find element: {}", selector)))
    }
}

/// One approval check per second for `timeout_secs`, at least once
fn two_factor_policy(timeout_secs: u64) -> RetryPolicy {
    let attempts = u32::try_from(timeout_secs.max(1)).unwrap_or(u32::MAX);
    RetryPolicy::new(attempts, Duration::from_secs(1))
}

async fn type_slowly(element: &Element, text: &str, delay: Duration) -> Result<()> {
    element
        .click()
        .await
        .map_err(|e| PostwatchError::Browser(format!("Failed to focus input: {}", e)))?;

    let mut buf = [0u8; 4];
    for ch in text.chars() {
        element
            .type_str(ch.encode_utf8(&mut buf))
            .await
            .map_err(|e| PostwatchError::Browser(format!("Failed to type: {}", e)))?;
        tokio::time::sleep(delay).await;
    }
    Ok(())
}
