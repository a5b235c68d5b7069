//! [`KeySender`] that encodes boot-protocol reports onto a [`HidTransport`].

use std::sync::Arc;

use btkb_core::{HidUsage, KeyMapper, KeyboardReport, ModifierMask, NamedKey};
use tracing::{debug, trace};

use crate::application::connection_guard::{HidTransport, TransportError};
use crate::application::dispatch::KeySender;

/// Production report encoder.
pub struct ReportKeySender {
    transport: Arc<dyn HidTransport>,
}

impl ReportKeySender {
    pub fn new(transport: Arc<dyn HidTransport>) -> Self {
        Self { transport }
    }

    fn write(&self, report: KeyboardReport) -> Result<(), TransportError> {
        trace!(%report, "report");
        self.transport.send_report(&report)
    }
}

impl KeySender for ReportKeySender {
    fn send_char(&self, c: char) -> Result<(), TransportError> {
        let Some((modifier, usage)) = KeyMapper::char_usage(c) else {
            debug!(?c, "no usage for character; dropped");
            return Ok(());
        };
        self.send_key_down(modifier, usage)?;
        self.send_keys_up(ModifierMask::NONE)
    }

    fn send_special_key(&self, key: NamedKey) -> Result<(), TransportError> {
        self.send_key_down(ModifierMask::NONE, KeyMapper::named_usage(key))?;
        self.send_keys_up(ModifierMask::NONE)
    }

    fn send_key_down(&self, modifier: ModifierMask, usage: HidUsage) -> Result<(), TransportError> {
        self.write(KeyboardReport::key_down(modifier, usage))
    }

    fn send_keys_up(&self, modifier: ModifierMask) -> Result<(), TransportError> {
        self.write(KeyboardReport::keys_up(modifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::transport::mock::MockTransport;

    fn sender() -> (Arc<MockTransport>, ReportKeySender) {
        let transport = Arc::new(MockTransport::connected());
        let sender = ReportKeySender::new(Arc::clone(&transport) as Arc<dyn HidTransport>);
        (transport, sender)
    }

    #[test]
    fn test_lowercase_char_is_press_then_release_without_modifier() {
        // Arrange
        let (transport, sender) = sender();

        // Act
        sender.send_char('a').expect("send must succeed");

        // Assert
        assert_eq!(
            transport.reports(),
            vec![
                KeyboardReport::key_down(ModifierMask::NONE, HidUsage::A),
                KeyboardReport::released(),
            ]
        );
    }

    #[test]
    fn test_shifted_char_carries_left_shift_on_key_down_only() {
        let (transport, sender) = sender();

        sender.send_char('!').expect("send must succeed");

        let reports = transport.reports();
        assert_eq!(reports[0].to_bytes(), [0x02, 0, 0x1E, 0, 0, 0, 0, 0]);
        assert_eq!(reports[1], KeyboardReport::released());
    }

    #[test]
    fn test_unmapped_char_sends_nothing() {
        let (transport, sender) = sender();

        sender.send_char('ß').expect("dropping is not an error");

        assert!(transport.reports().is_empty());
    }

    #[test]
    fn test_special_key_uses_scancode_table() {
        let (transport, sender) = sender();

        sender.send_special_key(NamedKey::Esc).expect("send must succeed");

        assert_eq!(transport.reports()[0].keys[0], 41);
        assert_eq!(transport.reports().len(), 2);
    }

    #[test]
    fn test_transport_error_is_propagated_and_stops_the_pair() {
        let transport = Arc::new(MockTransport::new());
        let sender = ReportKeySender::new(Arc::clone(&transport) as Arc<dyn HidTransport>);

        let result = sender.send_char('a');

        assert_eq!(result, Err(TransportError::NotConnected));
        assert!(transport.reports().is_empty());
    }
}
