//! Request and response types for the agendakit protocol.

use agendakit_core::{MeetingDetails, ScheduledItem};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::PROTOCOL_VERSION;

/// Envelope around every message on the wire.
///
/// Carries the protocol version, a correlation id chosen by the client, and
/// the session the payload operates on. Responses echo both ids back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Wire protocol version, compared against [`PROTOCOL_VERSION`].
    pub protocol_version: String,
    /// Client-chosen id tying a response to its request.
    pub request_id: String,
    /// Session the payload applies to. Responses echo it back.
    pub session_id: String,
    /// Request or response body.
    pub payload: T,
}

impl<T> Envelope<T> {
    /// Wraps a payload with the current protocol version.
    pub fn new(request_id: impl Into<String>, session_id: impl Into<String>, payload: T) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            request_id: request_id.into(),
            session_id: session_id.into(),
            payload,
        }
    }

    /// Wraps an outgoing request.
    pub fn request(
        request_id: impl Into<String>,
        session_id: impl Into<String>,
        request: T,
    ) -> Self {
        Self::new(request_id, session_id, request)
    }

    /// Wraps an outgoing response, echoing the request's ids.
    pub fn response(
        request_id: impl Into<String>,
        session_id: impl Into<String>,
        response: T,
    ) -> Self {
        Self::new(request_id, session_id, response)
    }

    /// True when the sender speaks our protocol version.
    pub fn is_compatible(&self) -> bool {
        self.protocol_version == PROTOCOL_VERSION
    }
}

/// Requests the client can send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Append one agenda item to the session.
    AddItem {
        /// Topic label. Must be non-empty after trimming.
        topic: String,
        /// Who runs the slot.
        #[serde(default)]
        owner: String,
        /// Wall-clock start time.
        start_time: NaiveTime,
        /// Slot length in minutes.
        duration_minutes: u32,
        /// Free-form notes.
        #[serde(default)]
        notes: String,
    },

    /// Drop every item in the session.
    Clear,

    /// Replace the session's items with the scripted example agenda.
    LoadExample,

    /// Update some or all of the session's meeting details.
    SetDetails {
        #[serde(flatten)]
        patch: DetailsPatch,
    },

    /// Get the session's details and its time-sorted items.
    GetAgenda,

    /// Render the session as an iCalendar document.
    ExportIcs,

    /// Render the session as a JSON document.
    ExportJson,

    /// Ask for uptime and session count.
    Status,

    /// Ask the server to stop.
    Shutdown,

    /// Liveness probe.
    Ping,
}

impl Request {
    /// AddItem with owned strings converted in one place.
    pub fn add_item(
        topic: impl Into<String>,
        owner: impl Into<String>,
        start_time: NaiveTime,
        duration_minutes: u32,
        notes: impl Into<String>,
    ) -> Self {
        Self::AddItem {
            topic: topic.into(),
            owner: owner.into(),
            start_time,
            duration_minutes,
            notes: notes.into(),
        }
    }

    /// SetDetails from a prepared patch.
    pub fn set_details(patch: DetailsPatch) -> Self {
        Self::SetDetails { patch }
    }
}

/// Partial update of the meeting details.
///
/// Absent fields keep their current value on the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailsPatch {
    /// New meeting title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// New meeting date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    /// New location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// New host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

impl DetailsPatch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder: set the date.
    #[must_use]
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Builder: set the location.
    #[must_use]
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder: set the host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.date.is_none()
            && self.location.is_none()
            && self.host.is_none()
    }

    /// Applies the patch to the given details. Absent fields are untouched.
    pub fn apply_to(&self, details: &mut MeetingDetails) {
        if let Some(ref title) = self.title {
            details.title = title.clone();
        }
        if let Some(date) = self.date {
            details.date = date;
        }
        if let Some(ref location) = self.location {
            details.location = location.clone();
        }
        if let Some(ref host) = self.host {
            details.host = host.clone();
        }
    }
}

/// Responses the server can send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// The session's details and its time-sorted items.
    Agenda {
        /// Meeting details the items share.
        details: MeetingDetails,
        /// Items sorted by start instant.
        items: Vec<ScheduledItem>,
    },

    /// A rendered export artifact.
    Document {
        /// Suggested file name.
        filename: String,
        /// MIME type of the content.
        media_type: String,
        /// The document text.
        content: String,
    },

    /// Uptime and session count, answering [`Request::Status`].
    Status {
        #[serde(flatten)]
        info: StatusInfo,
    },

    /// The request was applied and has nothing to report back.
    Ok,

    /// The request was understood but not applied.
    Warning {
        /// What was wrong with the input.
        message: String,
    },

    /// The request failed. See the code for the category.
    Error {
        #[serde(flatten)]
        error: ErrorResponse,
    },

    /// Answer to [`Request::Ping`].
    Pong,
}

impl Response {
    /// Bundles the session's details and sorted items into an Agenda reply.
    pub fn agenda(details: MeetingDetails, items: Vec<ScheduledItem>) -> Self {
        Self::Agenda { details, items }
    }

    /// Packages an export result for the client to write to disk.
    pub fn document(
        filename: impl Into<String>,
        media_type: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::Document {
            filename: filename.into(),
            media_type: media_type.into(),
            content: content.into(),
        }
    }

    /// Wraps server status in a reply.
    pub fn status(info: StatusInfo) -> Self {
        Self::Status { info }
    }

    /// Reply for requests that were understood but not applied.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning {
            message: message.into(),
        }
    }

    /// Builds an Error reply from a code and message.
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            error: ErrorResponse::new(code, message),
        }
    }

    /// Returns true unless this is an error response. Warnings count as
    /// success: the request was handled, the input was not applied.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Error { .. })
    }

    /// The error payload, when there is one.
    pub fn as_error(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Error { error } => Some(error),
            _ => None,
        }
    }
}

/// Snapshot reported by the Status request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
    /// Seconds since the server started.
    pub uptime_seconds: u64,

    /// Sessions currently held in memory.
    pub active_sessions: usize,
}

impl StatusInfo {
    pub fn new(uptime_seconds: u64, active_sessions: usize) -> Self {
        Self {
            uptime_seconds,
            active_sessions,
        }
    }
}

/// Machine-readable category carried by every error reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Something broke inside the server.
    InternalError,

    /// The request failed validation.
    InvalidRequest,

    /// The client spoke a protocol version this server does not.
    UnsupportedVersion,

    /// Server is stopping and takes no new work.
    ShuttingDown,
}

impl ErrorCode {
    /// Short phrase prefixed to error messages in [`ErrorResponse`]'s Display.
    pub fn description(&self) -> &'static str {
        match self {
            Self::InternalError => "the server hit an unexpected error",
            Self::InvalidRequest => "the request did not pass validation",
            Self::UnsupportedVersion => "the protocol versions do not match",
            Self::ShuttingDown => "the server is stopping",
        }
    }
}

/// Code plus human-readable detail, the body of [`Response::Error`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// What went wrong, categorically.
    pub code: ErrorCode,
    /// What went wrong, specifically.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

impl std::error::Error for ErrorResponse {}

#[cfg(test)]
mod tests {
    use super::*;
    use agendakit_core::{AgendaItem, build_schedule};

    fn time(hour: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, min, 0).unwrap()
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn envelope_request_stamps_current_version() {
        let envelope = Envelope::request("req-7", "planning", Request::GetAgenda);
        assert_eq!(envelope.protocol_version, PROTOCOL_VERSION);
        assert_eq!(envelope.request_id, "req-7");
        assert_eq!(envelope.session_id, "planning");
        assert!(envelope.is_compatible());
    }

    #[test]
    fn envelope_from_the_future_is_incompatible() {
        let envelope = Envelope {
            protocol_version: "99".to_string(),
            request_id: "req-7".to_string(),
            session_id: "planning".to_string(),
            payload: Request::Ping,
        };
        assert!(!envelope.is_compatible());
    }

    #[test]
    fn request_serde_add_item() {
        let request = Request::add_item("Kickoff", "Ana", time(9, 0), 15, "Intro");
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(
            json,
            r#"{"type":"add_item","topic":"Kickoff","owner":"Ana","start_time":"09:00:00","duration_minutes":15,"notes":"Intro"}"#
        );

        let parsed: Request = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, request);
    }

    #[test]
    fn request_add_item_defaults_optional_fields() {
        let json = r#"{"type":"add_item","topic":"Kickoff","start_time":"09:00:00","duration_minutes":15}"#;
        let parsed: Request = serde_json::from_str(json).unwrap();

        match parsed {
            Request::AddItem { owner, notes, .. } => {
                assert!(owner.is_empty());
                assert!(notes.is_empty());
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn request_serde_set_details_is_flat() {
        let patch = DetailsPatch::new().title("Retro").date(date(2024, 1, 10));
        let request = Request::set_details(patch);
        let json = serde_json::to_string(&request).unwrap();

        assert_eq!(
            json,
            r#"{"type":"set_details","title":"Retro","date":"2024-01-10"}"#
        );

        let parsed: Request = serde_json::from_str(&json).unwrap();
        match parsed {
            Request::SetDetails { patch } => {
                assert_eq!(patch.title.as_deref(), Some("Retro"));
                assert_eq!(patch.date, Some(date(2024, 1, 10)));
                assert!(patch.location.is_none());
                assert!(patch.host.is_none());
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn request_serde_simple_variants() {
        for (request, expected) in [
            (Request::Ping, r#"{"type":"ping"}"#),
            (Request::Clear, r#"{"type":"clear"}"#),
            (Request::LoadExample, r#"{"type":"load_example"}"#),
            (Request::GetAgenda, r#"{"type":"get_agenda"}"#),
            (Request::ExportIcs, r#"{"type":"export_ics"}"#),
            (Request::ExportJson, r#"{"type":"export_json"}"#),
            (Request::Status, r#"{"type":"status"}"#),
            (Request::Shutdown, r#"{"type":"shutdown"}"#),
        ] {
            let json = serde_json::to_string(&request).unwrap();
            assert_eq!(json, expected);

            let parsed: Request = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, request);
        }
    }

    #[test]
    fn details_patch_builder() {
        let patch = DetailsPatch::new()
            .title("Sprint review")
            .date(date(2024, 2, 1))
            .location("Sala 3")
            .host("Ana");

        assert_eq!(patch.title.as_deref(), Some("Sprint review"));
        assert_eq!(patch.date, Some(date(2024, 2, 1)));
        assert_eq!(patch.location.as_deref(), Some("Sala 3"));
        assert_eq!(patch.host.as_deref(), Some("Ana"));
        assert!(!patch.is_empty());
        assert!(DetailsPatch::new().is_empty());
    }

    #[test]
    fn details_patch_apply_overwrites_only_present_fields() {
        let mut details = MeetingDetails::new(date(2024, 1, 10));

        DetailsPatch::new()
            .title("Retro")
            .host("Ana")
            .apply_to(&mut details);

        assert_eq!(details.title, "Retro");
        assert_eq!(details.host, "Ana");
        // Untouched fields keep the stock defaults.
        assert_eq!(details.date, date(2024, 1, 10));
        assert_eq!(details.location, "Remoto");
    }

    #[test]
    fn details_patch_empty_apply_is_noop() {
        let mut details = MeetingDetails::new(date(2024, 1, 10)).with_title("Kickoff");
        let before = details.clone();

        DetailsPatch::new().apply_to(&mut details);

        assert_eq!(details, before);
    }

    #[test]
    fn response_serde_simple_variants() {
        for (response, expected) in [
            (Response::Ok, r#"{"type":"ok"}"#),
            (Response::Pong, r#"{"type":"pong"}"#),
        ] {
            let json = serde_json::to_string(&response).unwrap();
            assert_eq!(json, expected);

            let parsed: Response = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, response);
            assert!(parsed.is_success());
        }
    }

    #[test]
    fn response_serde_warning() {
        let response = Response::warning("topic must not be empty");
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(
            json,
            r#"{"type":"warning","message":"topic must not be empty"}"#
        );

        let parsed: Response = serde_json::from_str(&json).unwrap();
        assert!(parsed.is_success());
    }

    #[test]
    fn response_serde_error_is_flat() {
        let response = Response::error(ErrorCode::InvalidRequest, "missing field");
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(
            json,
            r#"{"type":"error","code":"invalid_request","message":"missing field"}"#
        );

        let parsed: Response = serde_json::from_str(&json).unwrap();
        assert!(!parsed.is_success());
        assert_eq!(parsed.as_error().unwrap().code, ErrorCode::InvalidRequest);
    }

    #[test]
    fn response_serde_status_is_flat() {
        let response = Response::status(StatusInfo::new(3600, 2));
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(
            json,
            r#"{"type":"status","uptime_seconds":3600,"active_sessions":2}"#
        );

        let parsed: Response = serde_json::from_str(&json).unwrap();
        assert!(parsed.is_success());
        assert!(parsed.as_error().is_none());
    }

    #[test]
    fn response_serde_agenda() {
        let items = vec![AgendaItem::new("Kickoff", time(9, 0), 15).with_owner("Ana")];
        let schedule = build_schedule(&items, date(2024, 1, 10));
        let details = MeetingDetails::new(date(2024, 1, 10));
        let response = Response::agenda(details.clone(), schedule.clone());

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""type":"agenda""#));
        assert!(json.contains("Reunión de seguimiento"));
        assert!(json.contains("2024-01-10T09:00:00"));

        let parsed: Response = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Response::Agenda { details, items: schedule });
    }

    #[test]
    fn response_serde_document() {
        let response = Response::document("agenda.ics", "text/calendar", "BEGIN:VCALENDAR");
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(
            json,
            r#"{"type":"document","filename":"agenda.ics","media_type":"text/calendar","content":"BEGIN:VCALENDAR"}"#
        );

        let parsed: Response = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, response);
    }

    #[test]
    fn every_error_code_describes_itself() {
        for code in [
            ErrorCode::InternalError,
            ErrorCode::InvalidRequest,
            ErrorCode::UnsupportedVersion,
            ErrorCode::ShuttingDown,
        ] {
            assert!(!code.description().is_empty(), "{code:?}");
        }
    }

    #[test]
    fn error_display_joins_description_and_detail() {
        let error = ErrorResponse::new(ErrorCode::InvalidRequest, "topic must not be empty");
        assert_eq!(
            error.to_string(),
            "the request did not pass validation: topic must not be empty"
        );
    }

    #[test]
    fn envelopes_round_trip_in_both_directions() {
        let request = Envelope::request("req-abc", "planning", Request::GetAgenda);
        let json = serde_json::to_string(&request).unwrap();
        let parsed: Envelope<Request> = serde_json::from_str(&json).unwrap();
        assert_eq!(request, parsed);

        let response = Envelope::response("req-abc", "planning", Response::Ok);
        let json = serde_json::to_string(&response).unwrap();
        let parsed: Envelope<Response> = serde_json::from_str(&json).unwrap();
        assert_eq!(response, parsed);
    }
}
