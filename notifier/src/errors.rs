use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),
}
