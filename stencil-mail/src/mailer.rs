//! High-level mailer interface.

use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::{
    Attachment, DeliveryObserver, OutboundMessage, RenderEngine, RenderedMessageParts, Result,
    TemplateStore, TracingObserver, Transport,
};

/// Renders template namespaces and hands the result to a transport.
///
/// Cloning is cheap; clones share the template cache.
#[derive(Clone)]
pub struct Mailer {
    store: Arc<TemplateStore>,
    engine: Arc<dyn RenderEngine>,
    transport: Arc<dyn Transport>,
    observer: Arc<dyn DeliveryObserver>,
}

impl Mailer {
    /// Create a mailer from its collaborators.
    pub fn new(
        store: TemplateStore,
        engine: impl RenderEngine + 'static,
        transport: impl Transport + 'static,
    ) -> Self {
        Self {
            store: Arc::new(store),
            engine: Arc::new(engine),
            transport: Arc::new(transport),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Create a Handlebars + SMTP mailer from settings.
    #[cfg(feature = "handlebars")]
    pub fn from_settings(settings: &crate::MailSettings) -> Self {
        let store = TemplateStore::with_caching(&settings.templates_root, settings.cache_templates);
        let transport = crate::SmtpTransport::new(settings.smtp.clone());
        Self::new(store, crate::HandlebarsEngine::new(), transport)
    }

    /// Report delivery outcomes to a custom observer.
    pub fn with_observer(mut self, observer: impl DeliveryObserver + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    /// The template store.
    pub fn store(&self) -> &TemplateStore {
        &self.store
    }

    /// Send a templated email.
    ///
    /// ```rust,ignore
    /// mailer.send_template(
    ///     "jim@example.com",
    ///     "password/update",
    ///     &json!({ "firstname": "Jim", "passwordtoken": "askf238fuhawf2983ghf" }),
    ///     Vec::new(),
    /// )?;
    /// ```
    ///
    /// Template, metadata, address and rendering errors are returned. Once the
    /// message is assembled, transport failures go to the observer and this
    /// returns `Ok(())`.
    pub fn send_template<T: Serialize + ?Sized>(
        &self,
        to: &str,
        namespace: &str,
        data: &T,
        attachments: Vec<Attachment>,
    ) -> Result<()> {
        let parts = self.render_template(to, namespace, data, attachments)?;
        self.dispatch(parts)
    }

    /// Send a non-templated plain text email.
    pub fn send(
        &self,
        to: &str,
        from: &str,
        subject: &str,
        body: &str,
        attachments: Vec<Attachment>,
    ) -> Result<()> {
        self.dispatch(RenderedMessageParts::raw(to, from, subject, body, attachments))
    }

    /// Render a namespace without sending it.
    pub fn render_template<T: Serialize + ?Sized>(
        &self,
        to: &str,
        namespace: &str,
        data: &T,
        attachments: Vec<Attachment>,
    ) -> Result<RenderedMessageParts> {
        let template = self.store.resolve(namespace)?;
        let from = template.metadata.require("from")?;
        let subject = template.metadata.require("subject")?;

        let data = serde_json::to_value(data)?;

        let from = self.engine.render(from, &data)?;
        let subject = self.engine.render(subject, &data)?;
        let html = template
            .html
            .as_deref()
            .map(|html| self.engine.render(html, &data))
            .transpose()?;
        let text = template
            .text
            .as_deref()
            .map(|text| self.engine.render(text, &data))
            .transpose()?;

        debug!(namespace, to, "Rendered email template");

        Ok(RenderedMessageParts {
            to: to.to_string(),
            from,
            subject,
            html,
            text,
            attachments,
        })
    }

    /// Check if the transport is healthy.
    pub fn is_healthy(&self) -> bool {
        self.transport.is_healthy()
    }

    fn dispatch(&self, parts: RenderedMessageParts) -> Result<()> {
        let message = OutboundMessage::assemble(parts)?;

        match self.transport.send(&message) {
            Ok(()) => self.observer.delivered(&message),
            Err(e) => self.observer.failed(&message, &e),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MailError, MessageBody};
    use parking_lot::Mutex;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recording {
        sent: Mutex<Vec<OutboundMessage>>,
    }

    impl Transport for Arc<Recording> {
        fn send(&self, message: &OutboundMessage) -> Result<()> {
            self.sent.lock().push(message.clone());
            Ok(())
        }
    }

    #[cfg(feature = "handlebars")]
    struct Failing;

    #[cfg(feature = "handlebars")]
    impl Transport for Failing {
        fn send(&self, _message: &OutboundMessage) -> Result<()> {
            Err(MailError::Smtp("connection refused".into()))
        }

        fn is_healthy(&self) -> bool {
            false
        }
    }

    #[derive(Default)]
    struct Outcomes {
        delivered: Mutex<Vec<String>>,
        failed: Mutex<Vec<String>>,
    }

    impl DeliveryObserver for Arc<Outcomes> {
        fn delivered(&self, message: &OutboundMessage) {
            self.delivered.lock().push(message.to.clone());
        }

        fn failed(&self, _message: &OutboundMessage, error: &MailError) {
            self.failed.lock().push(error.to_string());
        }
    }

    /// Counts renders to prove which steps ran.
    #[derive(Default)]
    struct Counting {
        calls: Mutex<usize>,
    }

    impl RenderEngine for Arc<Counting> {
        fn render(&self, template: &str, _data: &serde_json::Value) -> Result<String> {
            *self.calls.lock() += 1;
            Ok(template.to_string())
        }
    }

    fn templates() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("password")).unwrap();
        fs::write(
            dir.path().join("password/update.cfg"),
            "from: {{site}} <noreply@example.com>\nsubject: Reset for {{firstname}}\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("password/update.html"),
            "<p>Hi {{firstname}}, token {{token}}</p>",
        )
        .unwrap();
        fs::write(
            dir.path().join("password/update.txt"),
            "Hi {{firstname}}, token {{token}}",
        )
        .unwrap();
        fs::write(dir.path().join("nofrom.cfg"), "subject: hi\n").unwrap();
        fs::write(dir.path().join("nofrom.html"), [0xff, 0xfe, 0x00]).unwrap();
        fs::write(dir.path().join("nosubject.cfg"), "from: a@example.com\n").unwrap();
        dir
    }

    #[cfg(feature = "handlebars")]
    fn mailer(dir: &TempDir) -> (Mailer, Arc<Recording>) {
        let recording = Arc::new(Recording::default());
        let mailer = Mailer::new(
            TemplateStore::new(dir.path()),
            crate::HandlebarsEngine::new(),
            Arc::clone(&recording),
        );
        (mailer, recording)
    }

    fn verbatim_mailer(dir: &TempDir) -> (Mailer, Arc<Recording>) {
        let recording = Arc::new(Recording::default());
        let mailer = Mailer::new(
            TemplateStore::new(dir.path()),
            Arc::new(Counting::default()),
            Arc::clone(&recording),
        );
        (mailer, recording)
    }

    #[test]
    #[cfg(feature = "handlebars")]
    fn test_render_template() {
        let dir = templates();
        let (mailer, _) = mailer(&dir);

        let parts = mailer
            .render_template(
                "jim@example.com",
                "password/update",
                &json!({"site": "Shop", "firstname": "Jim", "token": "abc"}),
                Vec::new(),
            )
            .unwrap();

        assert_eq!(parts.from, "Shop <noreply@example.com>");
        assert_eq!(parts.subject, "Reset for Jim");
        assert_eq!(parts.html.as_deref(), Some("<p>Hi Jim, token abc</p>"));
        assert_eq!(parts.text.as_deref(), Some("Hi Jim, token abc"));
    }

    #[test]
    #[cfg(feature = "handlebars")]
    fn test_send_template_dispatches_multipart() {
        let dir = templates();
        let (mailer, recording) = mailer(&dir);

        mailer
            .send_template(
                "jim@example.com",
                "password\\update",
                &json!({"site": "Shop", "firstname": "Jim", "token": "abc"}),
                vec![Attachment::new("a.pdf", "application/pdf", vec![1])],
            )
            .unwrap();

        let sent = recording.sent.lock();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.is_multipart());
        assert_eq!(sent[0].attachments.len(), 1);
    }

    #[test]
    fn test_missing_fields_fail_before_rendering() {
        let dir = templates();
        let counting = Arc::new(Counting::default());
        let recording = Arc::new(Recording::default());
        let mailer = Mailer::new(
            TemplateStore::new(dir.path()),
            Arc::clone(&counting),
            Arc::clone(&recording),
        );

        let err = mailer.send_template("a@x.com", "nofrom", &json!({}), Vec::new());
        assert!(matches!(err, Err(MailError::MissingField("from"))));

        let err = mailer.send_template("a@x.com", "nosubject", &json!({}), Vec::new());
        assert!(matches!(err, Err(MailError::MissingField("subject"))));

        let err = mailer.send_template("a@x.com", "nothing/here", &json!({}), Vec::new());
        assert!(matches!(err, Err(MailError::TemplateNotFound(_))));

        assert_eq!(*counting.calls.lock(), 0);
        assert!(recording.sent.lock().is_empty());
    }

    #[test]
    #[cfg(feature = "handlebars")]
    fn test_transport_failure_is_suppressed_and_observed() {
        let dir = templates();
        let outcomes = Arc::new(Outcomes::default());
        let mailer = Mailer::new(
            TemplateStore::new(dir.path()),
            crate::HandlebarsEngine::new(),
            Failing,
        )
        .with_observer(Arc::clone(&outcomes));

        let result = mailer.send_template(
            "jim@example.com",
            "password/update",
            &json!({"site": "Shop", "firstname": "Jim"}),
            Vec::new(),
        );

        assert!(result.is_ok());
        assert!(!mailer.is_healthy());
        assert!(outcomes.delivered.lock().is_empty());
        assert_eq!(
            *outcomes.failed.lock(),
            vec!["SMTP error: connection refused".to_string()]
        );
    }

    #[test]
    fn test_delivery_is_observed() {
        let dir = templates();
        let outcomes = Arc::new(Outcomes::default());
        let (mailer, _) = verbatim_mailer(&dir);
        let mailer = mailer.with_observer(Arc::clone(&outcomes));

        mailer
            .send("bob@example.com", "a@example.com", "Hi", "Body", Vec::new())
            .unwrap();
        assert_eq!(*outcomes.delivered.lock(), vec!["bob@example.com".to_string()]);
    }

    #[test]
    fn test_raw_send_skips_store() {
        let dir = templates();
        let (mailer, recording) = verbatim_mailer(&dir);

        mailer
            .send("bob@example.com", "a@example.com", "Hi", "Plain body", Vec::new())
            .unwrap();

        assert_eq!(mailer.store().cached_len(), 0);
        let sent = recording.sent.lock();
        assert_eq!(sent[0].body, MessageBody::Text("Plain body".into()));
        assert_eq!(sent[0].subject, "Hi");
    }

    #[test]
    #[cfg(feature = "handlebars")]
    fn test_invalid_recipient_is_surfaced() {
        let dir = templates();
        let (mailer, recording) = mailer(&dir);

        let err = mailer.send_template(
            "jim at example dot com",
            "password/update",
            &json!({"site": "Shop"}),
            Vec::new(),
        );
        assert!(matches!(err, Err(MailError::InvalidAddress(_))));
        assert!(recording.sent.lock().is_empty());
    }

    #[test]
    #[cfg(feature = "handlebars")]
    fn test_render_error_propagates() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.cfg"), "from: a@example.com\nsubject: {{#if}}\n").unwrap();
        let (mailer, recording) = mailer(&dir);

        let err = mailer.send_template("jim@example.com", "bad", &json!({}), Vec::new());
        assert!(matches!(err, Err(MailError::Template(_))));
        assert!(recording.sent.lock().is_empty());
    }

    #[test]
    fn test_bad_attachment_type_fails_before_transport() {
        let dir = templates();
        let outcomes = Arc::new(Outcomes::default());
        let (mailer, recording) = verbatim_mailer(&dir);
        let mailer = mailer.with_observer(Arc::clone(&outcomes));

        let err = mailer.send(
            "bob@example.com",
            "a@example.com",
            "Hi",
            "Body",
            vec![Attachment::new("f", "not a mime", vec![1])],
        );

        assert!(matches!(err, Err(MailError::Attachment(_))));
        assert!(recording.sent.lock().is_empty());
        assert!(outcomes.delivered.lock().is_empty());
        assert!(outcomes.failed.lock().is_empty());
    }
}
