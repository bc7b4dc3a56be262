//! Telegram channel publisher.
//!
//! Posts formatted offers as plain messages, or as photos with the text as
//! caption when the offer carries an image.

use std::time::{Duration, Instant};

use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode, Recipient};
use tracing::{debug, info, warn, Instrument};

use crate::config::TelegramConfig;
use crate::errors::{AppError, AppResult};
use crate::observability::{record_publish_metrics, telegram_span};

/// Anything that can deliver a post to the channel
#[allow(async_fn_in_trait)]
pub trait Publisher {
    /// Send `text`, as a photo caption when `image_url` is given
    async fn publish(&self, text: &str, image_url: Option<&str>) -> AppResult<()>;
}

/// Turn a configured channel id into a Bot API recipient.
///
/// Numeric ids address the chat directly, anything else is a public
/// channel username.
pub fn parse_recipient(channel_id: &str) -> Recipient {
    let channel_id = channel_id.trim();
    match channel_id.parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) if channel_id.starts_with('@') => Recipient::ChannelUsername(channel_id.to_string()),
        Err(_) => Recipient::ChannelUsername(format!("@{}", channel_id)),
    }
}

/// Publisher backed by the Telegram Bot API
#[derive(Debug, Clone)]
pub struct TelegramPublisher {
    bot: Bot,
    chat: Recipient,
    http: reqwest::Client,
    max_image_bytes: u64,
}

impl TelegramPublisher {
    pub fn new(config: &TelegramConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        let mut bot = Bot::with_client(config.token.clone(), http.clone());
        if let Some(api_url) = &config.api_url {
            let url = reqwest::Url::parse(api_url)
                .map_err(|e| AppError::Config(format!("Invalid Telegram API URL: {}", e)))?;
            bot = bot.set_api_url(url);
        }

        info!(
            timeout_secs = config.http_timeout_secs,
            custom_api_url = config.api_url.is_some(),
            "Telegram publisher initialized"
        );

        Ok(Self {
            bot,
            chat: parse_recipient(&config.channel_id),
            http,
            max_image_bytes: config.max_image_bytes,
        })
    }

    /// Download an offer image, enforcing the size limit
    pub async fn download_image(&self, url: &str) -> AppResult<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Image download failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Network(format!(
                "Image download returned status {}",
                status
            )));
        }

        // Check Content-Length header to prevent downloading oversized files
        if let Some(content_length) = response.content_length() {
            if content_length > self.max_image_bytes {
                return Err(AppError::Validation(format!(
                    "Image too large: {} bytes (maximum allowed: {} bytes)",
                    content_length, self.max_image_bytes
                )));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Network(format!("Image download failed: {}", e)))?;

        if bytes.len() as u64 > self.max_image_bytes {
            return Err(AppError::Validation(format!(
                "Image too large: {} bytes (maximum allowed: {} bytes)",
                bytes.len(),
                self.max_image_bytes
            )));
        }

        debug!(url = %url, size_bytes = bytes.len(), "Image downloaded");
        Ok(bytes.to_vec())
    }

    async fn send_text(&self, text: &str) -> AppResult<()> {
        self.bot
            .send_message(self.chat.clone(), text)
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }

    async fn send_photo(&self, text: &str, image: Vec<u8>) -> AppResult<()> {
        let photo = InputFile::memory(image).file_name("offer.jpg");

        self.bot
            .send_photo(self.chat.clone(), photo)
            .caption(text)
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }
}

impl Publisher for TelegramPublisher {
    /// Posts a photo when the image downloads, otherwise falls back to text
    async fn publish(&self, text: &str, image_url: Option<&str>) -> AppResult<()> {
        let start = Instant::now();

        let image = match image_url {
            Some(url) => match self.download_image(url).await {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    warn!(url = %url, error = %e, "Image unavailable, posting text only");
                    None
                }
            },
            None => None,
        };

        let with_image = image.is_some();
        let result = match image {
            Some(bytes) => {
                self.send_photo(text, bytes)
                    .instrument(telegram_span("send_photo"))
                    .await
            }
            None => {
                self.send_text(text)
                    .instrument(telegram_span("send_message"))
                    .await
            }
        };

        record_publish_metrics(with_image, result.is_ok(), start.elapsed());
        result
    }
}
