use osp_core::models::request::RequestStatus;

/// Something an applicant might want to hear about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    RequestCreated {
        request_id: String,
        service: String,
        phone: String,
    },
    StatusChanged {
        request_id: String,
        phone: String,
        status: RequestStatus,
    },
}

/// Outbound channel (WhatsApp, email, ...). Fire-and-forget: implementations
/// must not fail the operation that raised the event.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: &LifecycleEvent);
}

/// Default channel: writes the event to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: &LifecycleEvent) {
        match event {
            LifecycleEvent::RequestCreated { request_id, service, .. } => {
                tracing::info!(%request_id, %service, "request created");
            }
            LifecycleEvent::StatusChanged { request_id, status, .. } => {
                tracing::info!(%request_id, %status, "request status changed");
            }
        }
    }
}
