// MQTT transport for the weather station telemetry topic
use crate::application::ingestion_service::TelemetryTransport;
use crate::domain::error::TelemetryError;
use crate::infrastructure::config::MqttSettings;
use async_trait::async_trait;
use bytes::Bytes;
use rumqttc::{AsyncClient, Event, EventLoop, Incoming, MqttOptions, Outgoing, QoS, SubscribeReasonCode};
use std::time::Duration;

const REQUEST_CAPACITY: usize = 32;
const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(2);

struct Session {
    client: AsyncClient,
    eventloop: EventLoop,
}

/// A fresh client and event loop is built for every connection attempt, so a
/// failed session never leaks state into the next one.
pub struct MqttTransport {
    settings: MqttSettings,
    session: Option<Session>,
}

impl MqttTransport {
    pub fn new(settings: MqttSettings) -> Self {
        Self {
            settings,
            session: None,
        }
    }

    fn options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(
            self.settings.client_id.clone(),
            self.settings.host.clone(),
            self.settings.port,
        );
        options.set_keep_alive(Duration::from_secs(self.settings.keep_alive_secs.max(5)));
        options.set_clean_session(true);
        if let Some(username) = &self.settings.username {
            options.set_credentials(
                username.clone(),
                self.settings.password.clone().unwrap_or_default(),
            );
        }
        options
    }
}

#[async_trait]
impl TelemetryTransport for MqttTransport {
    async fn connect(&mut self) -> Result<(), TelemetryError> {
        self.session = None;
        let (client, mut eventloop) = AsyncClient::new(self.options(), REQUEST_CAPACITY);

        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Incoming::ConnAck(_))) => break,
                Ok(_) => {}
                Err(err) => {
                    return Err(TelemetryError::transport(format!(
                        "connect to {}:{} failed: {}",
                        self.settings.host, self.settings.port, err
                    )));
                }
            }
        }

        client
            .subscribe(self.settings.topic.clone(), QoS::AtMostOnce)
            .await
            .map_err(|err| TelemetryError::transport(format!("subscribe failed: {err}")))?;

        // Subscribed only once the broker has acknowledged the topic.
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Incoming::SubAck(ack))) => {
                    if ack
                        .return_codes
                        .iter()
                        .any(|code| matches!(code, SubscribeReasonCode::Failure))
                    {
                        return Err(TelemetryError::transport(format!(
                            "broker rejected subscription to {}",
                            self.settings.topic
                        )));
                    }
                    break;
                }
                Ok(_) => {}
                Err(err) => {
                    return Err(TelemetryError::transport(format!("subscribe failed: {err}")));
                }
            }
        }

        tracing::info!(
            host = %self.settings.host,
            topic = %self.settings.topic,
            client_id = %self.settings.client_id,
            "connected to MQTT broker"
        );
        self.session = Some(Session { client, eventloop });
        Ok(())
    }

    async fn next_message(&mut self) -> Result<Bytes, TelemetryError> {
        let Some(session) = self.session.as_mut() else {
            return Err(TelemetryError::transport("not connected"));
        };

        loop {
            match session.eventloop.poll().await {
                Ok(Event::Incoming(Incoming::Publish(publish))) => return Ok(publish.payload),
                Ok(Event::Incoming(Incoming::Disconnect)) => {
                    self.session = None;
                    return Err(TelemetryError::transport("broker closed the connection"));
                }
                Ok(_) => {}
                Err(err) => {
                    self.session = None;
                    return Err(TelemetryError::transport(err));
                }
            }
        }
    }

    async fn disconnect(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        if let Err(err) = session.client.unsubscribe(self.settings.topic.clone()).await {
            tracing::debug!(error = %err, "failed to queue unsubscribe");
        }
        if let Err(err) = session.client.disconnect().await {
            tracing::debug!(error = %err, "failed to queue disconnect");
        }

        // The requests only reach the broker while the event loop is polled.
        let flushed = tokio::time::timeout(DISCONNECT_TIMEOUT, async {
            loop {
                match session.eventloop.poll().await {
                    Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => break,
                    Ok(_) => {}
                }
            }
        })
        .await;

        if flushed.is_err() {
            tracing::warn!("timed out closing MQTT connection");
        } else {
            tracing::info!("disconnected from MQTT broker");
        }
    }
}
