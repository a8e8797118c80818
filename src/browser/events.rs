//! Relay of in-page console output, script errors and resource failures.

use std::collections::HashMap;
use std::sync::Arc;

use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent, ResourceType,
};
use chromiumoxide::cdp::js_protocol::runtime::{
    EventConsoleApiCalled, EventExceptionThrown, RemoteObject,
};
use chromiumoxide::Page;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::debug;

use super::net_error::{is_timeout, net_error_code};
use crate::progress::MessageSink;
use crate::Result;

/// Something the page reported that is worth telling the user about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    Console(String),
    ScriptError(String),
    ResourceFailed {
        url: String,
        code: i32,
        description: String,
    },
    ResourceTimeout {
        url: String,
    },
}

impl PageEvent {
    pub fn resource_failure(url: impl Into<String>, error_text: &str) -> Self {
        let url = url.into();
        if is_timeout(error_text) {
            PageEvent::ResourceTimeout { url }
        } else {
            PageEvent::ResourceFailed {
                url,
                code: net_error_code(error_text),
                description: error_text.to_string(),
            }
        }
    }

    /// Output lines for this event; console messages only show when verbose.
    pub fn lines(&self, verbose: bool) -> Vec<String> {
        match self {
            PageEvent::Console(msg) if verbose => vec![format!("Console: {msg}")],
            PageEvent::Console(_) => Vec::new(),
            PageEvent::ScriptError(msg) => vec![msg.clone()],
            PageEvent::ResourceFailed {
                url,
                code,
                description,
            } => vec![
                format!("Failed to load resource: {url}"),
                format!("{code}: {description}"),
            ],
            PageEvent::ResourceTimeout { url } => vec![format!("Request timeout: {url}")],
        }
    }
}

/// Renders one console argument the way `console.log` prints it.
pub fn remote_value_text(value: Option<&Value>, description: Option<&str>) -> String {
    match (value, description) {
        (Some(Value::String(s)), _) => s.clone(),
        (Some(v), _) => v.to_string(),
        (None, Some(desc)) => desc.to_string(),
        (None, None) => "undefined".to_string(),
    }
}

/// Picks the readable part of a thrown exception: the first line of its
/// description (`TypeError: x is undefined`), else the protocol's summary text.
pub fn exception_message(text: &str, description: Option<&str>) -> String {
    description
        .and_then(|d| d.lines().next())
        .filter(|line| !line.trim().is_empty())
        .unwrap_or(text)
        .to_string()
}

fn console_text(args: &[RemoteObject]) -> String {
    args.iter()
        .map(|arg| remote_value_text(arg.value.as_ref(), arg.description.as_deref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Requests tracked per generation before the oldest generation is dropped.
const MAX_IN_FLIGHT: usize = 1024;

/// URLs of requests that have started but not yet finished or failed.
///
/// Failure events only carry the request id, so the URL is remembered here.
/// Entries live for at most two generations: a main-frame navigation or a
/// full generation starts a new one and drops the one before the previous.
#[derive(Debug, Default)]
struct InFlight {
    current: HashMap<String, String>,
    previous: HashMap<String, String>,
}

impl InFlight {
    fn start(&mut self, id: &str, url: &str, navigation: bool) {
        if navigation || self.current.len() >= MAX_IN_FLIGHT {
            self.previous = std::mem::take(&mut self.current);
        }
        self.current.insert(id.to_string(), url.to_string());
    }

    fn finish(&mut self, id: &str) -> Option<String> {
        self.current
            .remove(id)
            .or_else(|| self.previous.remove(id))
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.current.len() + self.previous.len()
    }
}

enum RawEvent {
    Request(Arc<EventRequestWillBeSent>),
    Finished(Arc<EventLoadingFinished>),
    Failed(Arc<EventLoadingFailed>),
    Console(Arc<EventConsoleApiCalled>),
    Exception(Arc<EventExceptionThrown>),
}

/// Subscribes to the page's events and forwards them to `sink` from a
/// background task. The task ends when the page goes away.
pub async fn spawn_event_relay(
    page: &Page,
    verbose: bool,
    sink: MessageSink,
) -> Result<JoinHandle<()>> {
    let requests = page
        .event_listener::<EventRequestWillBeSent>()
        .await?
        .map(RawEvent::Request)
        .boxed();
    let finished = page
        .event_listener::<EventLoadingFinished>()
        .await?
        .map(RawEvent::Finished)
        .boxed();
    let failures = page
        .event_listener::<EventLoadingFailed>()
        .await?
        .map(RawEvent::Failed)
        .boxed();
    let console = page
        .event_listener::<EventConsoleApiCalled>()
        .await?
        .map(RawEvent::Console)
        .boxed();
    let exceptions = page
        .event_listener::<EventExceptionThrown>()
        .await?
        .map(RawEvent::Exception)
        .boxed();

    let mut events = stream::select_all(vec![requests, finished, failures, console, exceptions]);
    let main_frame = page.mainframe().await?;

    Ok(tokio::spawn(async move {
        let mut in_flight = InFlight::default();
        while let Some(raw) = events.next().await {
            let event = match raw {
                RawEvent::Request(req) => {
                    let navigation = req.r#type == Some(ResourceType::Document)
                        && (main_frame.is_none() || req.frame_id == main_frame);
                    in_flight.start(req.request_id.inner(), &req.request.url, navigation);
                    continue;
                }
                RawEvent::Finished(done) => {
                    in_flight.finish(done.request_id.inner());
                    continue;
                }
                RawEvent::Failed(failed) => {
                    let url = in_flight
                        .finish(failed.request_id.inner())
                        .unwrap_or_default();
                    PageEvent::resource_failure(url, &failed.error_text)
                }
                RawEvent::Console(msg) => PageEvent::Console(console_text(&msg.args)),
                RawEvent::Exception(thrown) => {
                    let details = &thrown.exception_details;
                    let description = details
                        .exception
                        .as_ref()
                        .and_then(|e| e.description.as_deref());
                    PageEvent::ScriptError(exception_message(&details.text, description))
                }
            };
            for line in event.lines(verbose) {
                sink(&line);
            }
        }
        debug!("page event stream closed");
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn console_lines_are_verbose_only() {
        let event = PageEvent::Console("hello".to_string());
        assert_eq!(event.lines(true), vec!["Console: hello".to_string()]);
        assert!(event.lines(false).is_empty());
    }

    #[test]
    fn script_errors_always_print_raw() {
        let event = PageEvent::ScriptError("ReferenceError: x is not defined".to_string());
        assert_eq!(event.lines(false), vec!["ReferenceError: x is not defined"]);
        assert_eq!(event.lines(true), event.lines(false));
    }

    #[test]
    fn resource_failure_prints_url_then_code() {
        let event =
            PageEvent::resource_failure("http://example.com/a.js", "net::ERR_NAME_NOT_RESOLVED");
        assert_eq!(
            event.lines(false),
            vec![
                "Failed to load resource: http://example.com/a.js".to_string(),
                "-105: net::ERR_NAME_NOT_RESOLVED".to_string(),
            ]
        );
    }

    #[test]
    fn timed_out_resources_are_reported_as_timeouts() {
        let event = PageEvent::resource_failure("http://slow.test/", "net::ERR_TIMED_OUT");
        assert_eq!(
            event,
            PageEvent::ResourceTimeout {
                url: "http://slow.test/".to_string()
            }
        );
        assert_eq!(event.lines(true), vec!["Request timeout: http://slow.test/"]);
    }

    #[test]
    fn in_flight_keeps_requests_across_one_navigation() {
        let mut in_flight = InFlight::default();
        in_flight.start("1", "http://example.com/", true);
        in_flight.start("2", "http://example.com/stalled.js", false);

        // Requests of the old page may still fail once the next one starts.
        in_flight.start("3", "http://example.com/", true);
        assert_eq!(
            in_flight.finish("2").as_deref(),
            Some("http://example.com/stalled.js")
        );

        in_flight.start("4", "http://example.com/never-finishes.js", false);
        in_flight.start("5", "http://example.com/", true);
        in_flight.start("6", "http://example.com/", true);
        assert_eq!(in_flight.finish("4"), None);
        assert_eq!(in_flight.len(), 2);
    }

    #[test]
    fn in_flight_stays_bounded_without_navigations() {
        let mut in_flight = InFlight::default();
        for id in 0..(MAX_IN_FLIGHT * 5) {
            in_flight.start(&id.to_string(), "http://example.com/poll", false);
        }
        assert!(in_flight.len() <= MAX_IN_FLIGHT * 2);
        let last = (MAX_IN_FLIGHT * 5 - 1).to_string();
        assert_eq!(
            in_flight.finish(&last).as_deref(),
            Some("http://example.com/poll")
        );
    }

    #[test]
    fn remote_values_render_like_console_log() {
        assert_eq!(remote_value_text(Some(&json!("plain")), None), "plain");
        assert_eq!(remote_value_text(Some(&json!(42)), None), "42");
        assert_eq!(remote_value_text(Some(&json!(true)), None), "true");
        assert_eq!(remote_value_text(None, Some("Array(3)")), "Array(3)");
        assert_eq!(remote_value_text(None, None), "undefined");
    }

    #[test]
    fn exception_message_prefers_first_description_line() {
        assert_eq!(
            exception_message(
                "Uncaught",
                Some("TypeError: a is undefined\n    at <anonymous>:1:3")
            ),
            "TypeError: a is undefined"
        );
        assert_eq!(exception_message("Uncaught", None), "Uncaught");
        assert_eq!(exception_message("Uncaught", Some("")), "Uncaught");
    }
}
