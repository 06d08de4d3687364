use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::{ChatSession, Result};
use crate::transport::{HttpTransport, QueryTransport};

pub fn create_transport(config: &AppConfig) -> Result<Arc<dyn QueryTransport>> {
    let base_url = config.base_url()?;
    let transport = HttpTransport::with_http_config(base_url, config.http_config())?;
    tracing::debug!(endpoint = %transport.endpoint(), "Transport ready");
    Ok(Arc::new(transport))
}

pub fn create_session(config: &AppConfig) -> Result<ChatSession> {
    let transport = create_transport(config)?;
    Ok(ChatSession::new(transport, config.mode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ChatError, ResponseMode};

    #[test]
    fn test_create_session_uses_configured_mode() {
        let config = AppConfig::default().with_overrides(None, true);
        let session = create_session(&config).expect("session");
        assert_eq!(session.mode(), ResponseMode::SingleShot);
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let config = AppConfig::default().with_overrides(Some("localhost:5000".into()), false);
        let err = create_transport(&config).err().expect("should fail");
        assert!(matches!(err, ChatError::Config(_)));
    }
}
