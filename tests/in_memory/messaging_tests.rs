//! Publishing tracker records and ingesting robot reports end to end.

use std::sync::{Arc, Mutex};

use crate::in_memory::helpers::{Fleet, action_ids, delivery_plan, fleet, robot};
use async_trait::async_trait;
use convoy::api::{
    Api, IngestOutcome, Ingestor, MiddlewareKind, Transport, TransportError, TransportFactory,
};
use convoy::config::{MiddlewareSettings, Settings};
use convoy::message::{Message, MessageFactory};
use convoy::task::{
    adapters::memory::InMemoryRequestRepository,
    domain::{ActionStatus, Request, RobotId, TaskState},
    services::RequestService,
};
use eyre::{OptionExt, Result, bail, ensure};
use mockable::DefaultClock;
use rstest::rstest;
use serde_json::json;

/// Transport that keeps every published message.
struct Recorder {
    kind: MiddlewareKind,
    sent: Mutex<Vec<(String, Message)>>,
}

#[async_trait]
impl Transport for Recorder {
    fn kind(&self) -> MiddlewareKind {
        self.kind
    }

    async fn publish(&self, method: &str, message: &Message) -> Result<(), TransportError> {
        self.sent
            .lock()
            .map_err(|err| TransportError::Delivery {
                kind: self.kind,
                reason: err.to_string(),
            })?
            .push((method.to_owned(), message.clone()));
        Ok(())
    }
}

#[derive(Default)]
struct RecorderFactory {
    built: Mutex<Vec<Arc<Recorder>>>,
}

impl TransportFactory for RecorderFactory {
    fn create(
        &self,
        kind: MiddlewareKind,
        _settings: &MiddlewareSettings,
    ) -> Result<Arc<dyn Transport>, TransportError> {
        let recorder = Arc::new(Recorder {
            kind,
            sent: Mutex::new(Vec::new()),
        });
        self.built
            .lock()
            .map_err(|err| TransportError::Configuration {
                kind,
                reason: err.to_string(),
            })?
            .push(Arc::clone(&recorder));
        Ok(recorder)
    }
}

const SETTINGS: &str = r#"
[api]
middleware = ["zyre"]

[api.publish.task]
method = "shout"

[api.zyre]
node_name = "ccu"
groups = ["ROPOD"]
"#;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn allocated_task_is_shouted_to_the_fleet(fleet: Fleet, robot: RobotId) -> Result<()> {
    let settings = Settings::from_toml(SETTINGS)?;
    let factory = RecorderFactory::default();
    let api = Api::from_settings(&settings.api, &factory)?
        .with_message_factory(MessageFactory::new(Some("ropod")));

    let created = fleet
        .service
        .create_from_request(&Request::task(true))
        .await?;
    let task = fleet
        .service
        .update_plan(created.id(), &[robot.clone()], &delivery_plan(&robot))
        .await?;
    let message = api.create_message(&task, vec![robot.as_str().to_owned()], &DefaultClock)?;

    ensure!(api.publish(&message).await? == 1);

    let built = factory.built.lock().map_err(|err| eyre::eyre!("{err}"))?;
    let recorder = built.first().ok_or_eyre("zyre transport")?;
    let sent = recorder.sent.lock().map_err(|err| eyre::eyre!("{err}"))?;
    let Some((method, published)) = sent.first() else {
        bail!("nothing published");
    };
    ensure!(method == "shout");
    ensure!(published.message_type() == "TASK");
    ensure!(published.payload().get("taskId") == Some(&json!(task.id().to_string())));
    ensure!(published.payload().get("metamodel") == Some(&json!("ropod-task-schema.json")));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn robot_reports_flow_into_the_ledger(fleet: Fleet, robot: RobotId) -> Result<()> {
    let ingestor = Ingestor::new(
        fleet.service.clone(),
        RequestService::new(Arc::new(InMemoryRequestRepository::new())),
    );

    let requested = ingestor
        .ingest_batch(vec![
            json!({
                "header": {"type": "TASK-REQUEST", "msgId": "5a1c5bd3-3dbf-4c47-9e9a-4ff0b1e7a1d2",
                           "timestamp": "2024-01-01T09:00:00Z"},
                "payload": {
                    "requestId": "9c1f3a36-6a56-4a43-bb9c-0cf2a3c7f0f1",
                    "pickupLocation": "AMK_D_L-1_C39",
                    "deliveryLocation": "AMK_D_L-1_C41",
                    "earliestPickupTime": "2024-01-01T10:00:00",
                    "latestPickupTime": "2024-01-01T10:15:00",
                },
            }),
            json!({"payload": {}}),
        ])
        .await;
    ensure!(requested.rejected.len() == 1);
    let Some(IngestOutcome::TaskCreated(created)) = requested.applied.first() else {
        bail!("request did not create a task");
    };

    let task = fleet
        .service
        .update_plan(created.id(), &[robot.clone()], &delivery_plan(&robot))
        .await?;
    let first = *action_ids(&task).first().ok_or_eyre("first action")?;

    let reported = ingestor
        .ingest_batch(vec![json!({
            "header": {"type": "TASK-PROGRESS", "msgId": "0b9d7a52-5f5e-4d0e-a1cf-8f7b0d2c3e41",
                       "timestamp": "2024-01-01T10:06:00Z"},
            "payload": {
                "taskId": task.id().to_string(),
                "actionId": first.to_string(),
                "robotId": robot.as_str(),
                "status": "completed",
                "finishTime": "2024-01-01T10:06:00Z",
            },
        })])
        .await;
    ensure!(reported.failed.is_empty() && reported.rejected.is_empty());

    let status = fleet.service.get_task_status(task.id()).await?;
    ensure!(status.status() == TaskState::Planned);
    let progress = status.progress().ok_or_eyre("ledger")?;
    ensure!(progress.get_action(first)?.status() == ActionStatus::Completed);
    ensure!(progress.current_action() != Some(first));
    Ok(())
}
