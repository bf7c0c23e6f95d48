use super::mocks::{RecordingHandler, StubRepository};
use depot_core::config::{QueueManagerConfig, RefreshConfig};
use depot_core::metrics::NotificationMetrics;
use depot_core::orchestration::{
    ArtifactRefreshOrchestrator, ArtifactsPurgeService, NotificationEventHandler,
    NotificationsQueueManager,
};
use depot_core::registry::{ArtifactHandlerRegistry, ArtifactType};
use depot_core::store::{InMemoryNotificationLog, InMemoryNotificationQueue, InMemoryProjectStore};
use depot_core::models::ProjectData;
use std::sync::Arc;

/// A complete in-memory pipeline wired the way a deployment wires it
pub struct TestDepot {
    pub projects: Arc<InMemoryProjectStore>,
    pub queue: Arc<InMemoryNotificationQueue>,
    pub log: Arc<InMemoryNotificationLog>,
    pub repository: Arc<StubRepository>,
    pub entities: Arc<RecordingHandler>,
    pub generations: Arc<RecordingHandler>,
    pub registry: Arc<ArtifactHandlerRegistry>,
    pub orchestrator: Arc<ArtifactRefreshOrchestrator>,
    pub metrics: Arc<NotificationMetrics>,
    pub manager: Arc<NotificationsQueueManager>,
}

impl TestDepot {
    pub fn builder(repository: StubRepository) -> TestDepotBuilder {
        TestDepotBuilder {
            repository,
            projects: Vec::new(),
            queue_config: QueueManagerConfig::default(),
            refresh_config: RefreshConfig::default(),
            entities: RecordingHandler::new(ArtifactType::Entities),
            generations: RecordingHandler::new(ArtifactType::FileGenerations),
            event_handler: None,
        }
    }

    pub fn purge_service(&self) -> ArtifactsPurgeService {
        ArtifactsPurgeService::new(self.projects.clone(), self.registry.clone())
    }
}

pub struct TestDepotBuilder {
    repository: StubRepository,
    projects: Vec<ProjectData>,
    queue_config: QueueManagerConfig,
    refresh_config: RefreshConfig,
    entities: RecordingHandler,
    generations: RecordingHandler,
    event_handler: Option<Arc<dyn NotificationEventHandler>>,
}

impl TestDepotBuilder {
    pub fn project(mut self, project: ProjectData) -> Self {
        self.projects.push(project);
        self
    }

    pub fn queue_config(mut self, config: QueueManagerConfig) -> Self {
        self.queue_config = config;
        self
    }

    pub fn propagate_to_dependants(mut self) -> Self {
        self.refresh_config.propagate_to_dependants = true;
        self
    }

    pub fn entities(mut self, handler: RecordingHandler) -> Self {
        self.entities = handler;
        self
    }

    pub fn generations(mut self, handler: RecordingHandler) -> Self {
        self.generations = handler;
        self
    }

    /// Replaces the orchestrator as the queue manager's event handler
    pub fn event_handler(mut self, handler: Arc<dyn NotificationEventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    pub fn build(self) -> TestDepot {
        let projects = Arc::new(InMemoryProjectStore::with_projects(self.projects));
        let queue = Arc::new(InMemoryNotificationQueue::from_config(&self.queue_config));
        let log = Arc::new(InMemoryNotificationLog::new());
        let repository = Arc::new(self.repository);
        let entities = Arc::new(self.entities);
        let generations = Arc::new(self.generations);

        let registry = Arc::new(
            ArtifactHandlerRegistry::builder()
                .register(ArtifactType::Entities, entities.clone())
                .register(ArtifactType::FileGenerations, generations.clone())
                .build(),
        );
        let orchestrator = Arc::new(ArtifactRefreshOrchestrator::with_config(
            projects.clone(),
            repository.clone(),
            registry.clone(),
            queue.clone(),
            log.clone(),
            self.refresh_config,
        ));
        let event_handler: Arc<dyn NotificationEventHandler> = match self.event_handler {
            Some(handler) => handler,
            None => orchestrator.clone(),
        };
        let metrics = Arc::new(NotificationMetrics::new());
        let manager = Arc::new(NotificationsQueueManager::new(
            projects.clone(),
            log.clone(),
            queue.clone(),
            event_handler,
            metrics.clone(),
            self.queue_config,
        ));

        TestDepot {
            projects,
            queue,
            log,
            repository,
            entities,
            generations,
            registry,
            orchestrator,
            metrics,
            manager,
        }
    }
}
