// SPDX-FileCopyrightText: 2026 Guichet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire protocol: tagged JSON messages over the WebSocket.
//!
//! Client -> Server:
//! ```json
//! {"type": "generate-ticket", "category": "Normal"}
//! {"type": "call-next", "category": "Normal", "counterId": "1", "attendantId": "alice"}
//! {"type": "finish-service", "ticket": {"number": "N001", ...}, "attendantId": "alice"}
//! {"type": "redirect-ticket", "ticket": {...}, "targetCategory": "Priority", "attendantId": "alice"}
//! ```
//!
//! Server -> Client: `initial-state` to a new connection; `ticket-generated`,
//! `ticket-called`, `service-finished`, `ticket-redirected` broadcast to all;
//! `generate-error` / `call-error` / `finish-error` / `redirect-error` only
//! to the requester.

use serde::{Deserialize, Serialize};

use guichet_core::{Category, HallError, HallEvent, HallRequest, QueueSnapshot, Ticket};

/// Ticket reference in inbound payloads.
///
/// Clients echo the full ticket object they were handed, but identity is by
/// number only; every other field is ignored on the way in.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketRef {
    pub number: String,
}

/// A request from a connected client.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientRequest {
    #[serde(rename_all = "camelCase")]
    GenerateTicket { category: String },
    #[serde(rename_all = "camelCase")]
    CallNext {
        category: String,
        counter_id: String,
        attendant_id: String,
    },
    #[serde(rename_all = "camelCase")]
    FinishService {
        ticket: TicketRef,
        attendant_id: String,
    },
    #[serde(rename_all = "camelCase")]
    RedirectTicket {
        ticket: TicketRef,
        target_category: String,
        attendant_id: String,
    },
}

impl ClientRequest {
    /// The request family, used to pick the matching `*-error` event.
    pub fn kind(&self) -> RequestKind {
        match self {
            ClientRequest::GenerateTicket { .. } => RequestKind::Generate,
            ClientRequest::CallNext { .. } => RequestKind::Call,
            ClientRequest::FinishService { .. } => RequestKind::Finish,
            ClientRequest::RedirectTicket { .. } => RequestKind::Redirect,
        }
    }

    /// Lower into the hall's request type.
    pub fn into_hall_request(self) -> HallRequest {
        match self {
            ClientRequest::GenerateTicket { category } => HallRequest::Generate { category },
            ClientRequest::CallNext {
                category,
                counter_id,
                attendant_id,
            } => HallRequest::CallNext {
                category,
                counter_id,
                attendant_id,
            },
            ClientRequest::FinishService {
                ticket,
                attendant_id,
            } => HallRequest::Finish {
                ticket_number: ticket.number,
                attendant_id,
            },
            ClientRequest::RedirectTicket {
                ticket,
                target_category,
                attendant_id,
            } => HallRequest::Redirect {
                ticket_number: ticket.number,
                target_category,
                attendant_id,
            },
        }
    }
}

/// Which `*-error` event a failed request maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Generate,
    Call,
    Finish,
    Redirect,
}

impl RequestKind {
    /// Build the requester-only error event for a failed request.
    pub fn error_event(self, err: &HallError) -> ServerEvent {
        let message = err.to_string();
        match self {
            RequestKind::Generate => ServerEvent::GenerateError { message },
            RequestKind::Call => ServerEvent::CallError { message },
            RequestKind::Finish => ServerEvent::FinishError { message },
            RequestKind::Redirect => ServerEvent::RedirectError { message },
        }
    }
}

/// An event sent to one connection or broadcast to all.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    #[serde(rename_all = "camelCase")]
    InitialState { all_queues: QueueSnapshot },
    #[serde(rename_all = "camelCase")]
    TicketGenerated {
        ticket: Ticket,
        all_queues: QueueSnapshot,
    },
    #[serde(rename_all = "camelCase")]
    TicketCalled {
        ticket: Ticket,
        counter_id: String,
        attendant_id: String,
        all_queues: QueueSnapshot,
    },
    #[serde(rename_all = "camelCase")]
    ServiceFinished {
        ticket: Ticket,
        attendant_id: String,
        all_queues: QueueSnapshot,
    },
    #[serde(rename_all = "camelCase")]
    TicketRedirected {
        ticket: Ticket,
        target_category: Category,
        attendant_id: String,
        all_queues: QueueSnapshot,
    },
    #[serde(rename_all = "camelCase")]
    GenerateError { message: String },
    #[serde(rename_all = "camelCase")]
    CallError { message: String },
    #[serde(rename_all = "camelCase")]
    FinishError { message: String },
    #[serde(rename_all = "camelCase")]
    RedirectError { message: String },
}

impl From<HallEvent> for ServerEvent {
    fn from(event: HallEvent) -> Self {
        match event {
            HallEvent::TicketGenerated { ticket, queues } => ServerEvent::TicketGenerated {
                ticket,
                all_queues: queues,
            },
            HallEvent::TicketCalled {
                ticket,
                counter_id,
                attendant_id,
                queues,
            } => ServerEvent::TicketCalled {
                ticket,
                counter_id,
                attendant_id,
                all_queues: queues,
            },
            HallEvent::ServiceFinished {
                ticket,
                attendant_id,
                queues,
            } => ServerEvent::ServiceFinished {
                ticket,
                attendant_id,
                all_queues: queues,
            },
            HallEvent::TicketRedirected {
                ticket,
                target_category,
                attendant_id,
                queues,
            } => ServerEvent::TicketRedirected {
                ticket,
                target_category,
                attendant_id,
                all_queues: queues,
            },
        }
    }
}
