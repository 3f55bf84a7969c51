//! Task Moves
//!
//! Connects the drag-and-drop controller to the server and the page:
//! `POST /tasks/{task}/move/{column}/` through the gateway, a tracking
//! event when it sticks, an alert when it does not.

use async_trait::async_trait;
use board_dragdrop::{MoveBackend, MoveFeedback, MoveRejected};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::analytics::{task_moved_props, EventSink, TASK_MOVED};
use crate::gateway::{HttpTransport, Method, RequestBody, RequestGateway};
use crate::host::PageHost;

const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

pub fn move_url(task_id: &str, column_id: &str) -> String {
    format!(
        "/tasks/{}/move/{}/",
        utf8_percent_encode(task_id, PATH_SEGMENT),
        utf8_percent_encode(column_id, PATH_SEGMENT)
    )
}

#[async_trait(?Send)]
impl<T: HttpTransport> MoveBackend for RequestGateway<T> {
    async fn move_task(&self, task_id: &str, column_id: &str) -> Result<(), MoveRejected> {
        let url = move_url(task_id, column_id);
        match self.send(Method::Post, &url, RequestBody::Empty).await {
            Ok(response) if response.is_success() => Ok(()),
            Ok(response) => Err(MoveRejected::Status(response.status)),
            Err(e) => Err(MoveRejected::Transport(e.to_string())),
        }
    }
}

pub struct BoardFeedback<H, S> {
    host: H,
    sink: S,
    failure_message: String,
}

impl<H: PageHost, S: EventSink> BoardFeedback<H, S> {
    pub fn new(host: H, sink: S, failure_message: impl Into<String>) -> Self {
        Self {
            host,
            sink,
            failure_message: failure_message.into(),
        }
    }
}

impl<H: PageHost, S: EventSink> MoveFeedback for BoardFeedback<H, S> {
    fn moved(&self, _task_id: &str, column_id: &str) {
        self.sink.track(TASK_MOVED, task_moved_props(column_id));
    }

    fn move_failed(&self, _task_id: &str, _error: &MoveRejected) {
        self.host.alert(&self.failure_message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::testing::RecordingSink;
    use crate::gateway::testing::gateway;
    use crate::gateway::CSRF_HEADER;
    use crate::host::testing::RecordingHost;

    #[test]
    fn test_move_url() {
        assert_eq!(move_url("12", "3"), "/tasks/12/move/3/");
        assert_eq!(move_url("a/b", "c d"), "/tasks/a%2Fb/move/c%20d/");
    }

    #[tokio::test]
    async fn test_backend_posts_with_csrf() {
        let gw = gateway();
        gw.transport().status(200, r#"{"ok": true}"#);

        assert_eq!(gw.move_task("7", "2").await, Ok(()));

        let sent = gw.transport().requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::Post);
        assert_eq!(sent[0].url, "/tasks/7/move/2/");
        assert_eq!(sent[0].body, RequestBody::Empty);
        assert_eq!(sent[0].header(CSRF_HEADER), Some("tok"));
    }

    #[tokio::test]
    async fn test_backend_maps_failures() {
        let gw = gateway();
        gw.transport().status(500, "").status(403, "").fail();

        assert_eq!(gw.move_task("7", "2").await, Err(MoveRejected::Status(500)));
        assert_eq!(gw.move_task("7", "2").await, Err(MoveRejected::Status(403)));
        assert!(matches!(gw.move_task("7", "2").await, Err(MoveRejected::Transport(_))));
    }

    #[test]
    fn test_feedback_tracks_and_alerts() {
        let feedback = BoardFeedback::new(RecordingHost::default(), RecordingSink::default(), "nope");

        feedback.moved("T1", "B");
        let events = feedback.sink.events.borrow();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "task-moved");
        assert_eq!(events[0].1["column"], "B");
        assert!(feedback.host.alerts.borrow().is_empty());
        drop(events);

        feedback.move_failed("T1", &MoveRejected::Status(500));
        assert_eq!(feedback.host.alerts.borrow().as_slice(), &["nope".to_string()]);
        assert_eq!(feedback.sink.events.borrow().len(), 1);
    }
}
