use crate::config::TwilioConfig;
use crate::error::{AppError, AppResult};
use reqwest::Client;

#[derive(Clone)]
pub struct TwilioService {
    client: Client,
    config: TwilioConfig,
}

impl TwilioService {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Sends an SMS to a normalized (digits-only) mobile number. Callers
    /// decide whether delivery failure is fatal; OTP issuance treats it as
    /// best-effort.
    pub async fn send_sms(&self, mobile: &str, body: &str) -> AppResult<()> {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.config.account_sid
        );

        let to = format!("{}{}", self.config.country_prefix, mobile);

        let params = [
            ("To", to.as_str()),
            ("From", self.config.from_phone.as_str()),
            ("Body", body),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&params)
            .send()
            .await?;

        if response.status().is_success() {
            log::info!("SMS sent to {mobile}");
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("SMS to {mobile} failed: {error_text}");
            Err(AppError::ExternalApiError(format!(
                "SMS sending failed: {error_text}"
            )))
        }
    }

    pub async fn send_otp_sms(&self, mobile: &str, code: &str) -> AppResult<()> {
        self.send_sms(mobile, &format!("Your Occamy OTP is {code}"))
            .await
    }

    pub async fn send_welcome_sms(&self, mobile: &str, distributor_code: &str) -> AppResult<()> {
        let body = format!(
            "Welcome to Occamy!\n\nYour Distributor ID is {distributor_code}\n\nUse this ID with OTP to login."
        );
        self.send_sms(mobile, &body).await
    }
}
