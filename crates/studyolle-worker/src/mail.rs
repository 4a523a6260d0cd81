//! Outbound email.

use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub message: String,
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait EmailSender: Send + Sync {
    async fn send_email(&self, message: &EmailMessage) -> AppResult<()>;
}

/// Logs messages instead of delivering them. Used when no mail provider is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleEmailSender;

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl EmailSender for ConsoleEmailSender {
    async fn send_email(&self, message: &EmailMessage) -> AppResult<()> {
        tracing::info!(to = %message.to, subject = %message.subject, "sent email: {}", message.message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    struct BufferWriter(Arc<Mutex<Vec<u8>>>);

    impl<'a> MakeWriter<'a> for SharedBuffer {
        type Writer = BufferWriter;

        fn make_writer(&'a self) -> Self::Writer {
            BufferWriter(Arc::clone(&self.0))
        }
    }

    impl io::Write for BufferWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("buffer").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn console_sender_logs_the_verification_link() {
        let sink = SharedBuffer::default();
        let _guard = tracing::subscriber::set_default(crate::logging::subscriber(sink.clone()));

        let message = EmailMessage {
            to: "oomi@example.com".to_string(),
            subject: "Studyolle sign-up confirmation".to_string(),
            message: "<a href=\"https://studyolle.test/check-email-token?token=abc&email=oomi%40example.com\">confirm</a>".to_string(),
        };
        ConsoleEmailSender.send_email(&message).await.expect("console send");

        let text = String::from_utf8(sink.0.lock().expect("buffer").clone()).expect("utf8");
        assert!(text.contains("oomi@example.com"), "{text}");
        assert!(text.contains("/check-email-token?token=abc"), "{text}");
    }
}
