//! Broadcasts lifecycle events to collaborator subsystems.
//!
//! Order is fixed: sessions, rooms, actions, then storage when registered.
//! Sessions go first since the others depend on whether the server
//! admits sessions.

use std::sync::Arc;

use crate::subsystems::{SettingsProjection, Subsystem};

pub struct SubsystemNotifier {
    ordered: Vec<Arc<dyn Subsystem>>,
}

impl SubsystemNotifier {
    pub fn new(
        sessions: Arc<dyn Subsystem>,
        rooms: Arc<dyn Subsystem>,
        actions: Arc<dyn Subsystem>,
        storage: Option<Arc<dyn Subsystem>>,
    ) -> Self {
        let mut ordered = vec![sessions, rooms, actions];
        ordered.extend(storage);
        Self { ordered }
    }

    /// Subsystem names in notification order.
    pub fn names(&self) -> Vec<&'static str> {
        self.ordered.iter().map(|s| s.name()).collect()
    }

    pub fn apply_settings(&self, settings: &SettingsProjection) {
        for subsystem in &self.ordered {
            subsystem.apply_settings(settings);
        }
    }

    pub fn set_server_started(&self, started: bool) {
        for subsystem in &self.ordered {
            tracing::debug!(subsystem = subsystem.name(), started, "Notifying server started");
            subsystem.set_server_started(started);
        }
    }

    pub fn pause(&self) {
        for subsystem in &self.ordered {
            tracing::debug!(subsystem = subsystem.name(), "Pausing subsystem");
            subsystem.pause();
        }
    }

    pub fn resume(&self) {
        for subsystem in &self.ordered {
            tracing::debug!(subsystem = subsystem.name(), "Resuming subsystem");
            subsystem.resume();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Probe {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Subsystem for Probe {
        fn name(&self) -> &'static str {
            self.name
        }

        fn apply_settings(&self, settings: &SettingsProjection) {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:settings:{}", self.name, settings.server_name));
        }

        fn set_server_started(&self, started: bool) {
            self.log.lock().unwrap().push(format!("{}:started:{started}", self.name));
        }

        fn pause(&self) {
            self.log.lock().unwrap().push(format!("{}:pause", self.name));
        }

        fn resume(&self) {
            self.log.lock().unwrap().push(format!("{}:resume", self.name));
        }
    }

    fn probe(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Arc<dyn Subsystem> {
        Arc::new(Probe {
            name,
            log: log.clone(),
        })
    }

    #[test]
    fn notifies_in_fixed_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let notifier = SubsystemNotifier::new(
            probe("sessions", &log),
            probe("rooms", &log),
            probe("actions", &log),
            Some(probe("storage", &log)),
        );

        notifier.pause();
        notifier.resume();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "sessions:pause",
                "rooms:pause",
                "actions:pause",
                "storage:pause",
                "sessions:resume",
                "rooms:resume",
                "actions:resume",
                "storage:resume",
            ]
        );
    }

    #[test]
    fn storage_is_optional() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let notifier = SubsystemNotifier::new(
            probe("sessions", &log),
            probe("rooms", &log),
            probe("actions", &log),
            None,
        );

        assert_eq!(notifier.names(), vec!["sessions", "rooms", "actions"]);
    }

    #[test]
    fn settings_reach_every_subsystem() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let notifier = SubsystemNotifier::new(
            probe("sessions", &log),
            probe("rooms", &log),
            probe("actions", &log),
            None,
        );

        let mut settings = crate::config::ServerSettings::default();
        settings.server_name = "arena".into();
        notifier.apply_settings(&SettingsProjection::from_settings(&settings));
        notifier.set_server_started(true);

        let log = log.lock().unwrap();
        assert_eq!(log[0], "sessions:settings:arena");
        assert_eq!(log[3], "sessions:started:true");
        assert_eq!(log.len(), 6);
    }
}
