// SPDX-FileCopyrightText: 2026 Guichet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The ticket hall: the request-dispatcher state machine.
//!
//! [`Hall`] owns the queue store, the session registry, and the ticket
//! factory as one injected state object. Every request goes through
//! [`Hall::apply`], which validates, mutates, and returns the event to
//! broadcast; a failed request returns an error having mutated nothing.
//!
//! Multi-field transitions (dequeue-then-bind, clear-then-enqueue) run as
//! plain sequential code inside a single `apply` call. The gateway feeds
//! the hall from one dispatcher task, so transitions are atomic relative
//! to each other without any locking here.

use std::str::FromStr;

use tracing::debug;

use crate::category::Category;
use crate::error::HallError;
use crate::queues::{QueueSnapshot, QueueStore};
use crate::sessions::SessionRegistry;
use crate::ticket::{Ticket, TicketFactory};

/// A validated-on-apply inbound request.
///
/// Category fields stay raw strings: validation order belongs to the hall
/// (for redirect, the session check must precede the target-category
/// check), so parsing happens inside [`Hall::apply`], not at the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HallRequest {
    /// Draw a new ticket in a category.
    Generate { category: String },
    /// Call the next waiting ticket of a category to a counter.
    CallNext {
        category: String,
        counter_id: String,
        attendant_id: String,
    },
    /// Finish service for the ticket the attendant currently holds.
    Finish {
        ticket_number: String,
        attendant_id: String,
    },
    /// Send the held ticket to the tail of another category's queue.
    Redirect {
        ticket_number: String,
        target_category: String,
        attendant_id: String,
    },
}

/// A successful state transition, carrying the post-mutation snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum HallEvent {
    TicketGenerated {
        ticket: Ticket,
        queues: QueueSnapshot,
    },
    TicketCalled {
        ticket: Ticket,
        counter_id: String,
        attendant_id: String,
        queues: QueueSnapshot,
    },
    ServiceFinished {
        ticket: Ticket,
        attendant_id: String,
        queues: QueueSnapshot,
    },
    TicketRedirected {
        ticket: Ticket,
        target_category: Category,
        attendant_id: String,
        queues: QueueSnapshot,
    },
}

/// The combined mutable state: queues, sessions, and sequence counters.
#[derive(Debug, Default)]
pub struct Hall {
    factory: TicketFactory,
    queues: QueueStore,
    sessions: SessionRegistry,
}

impl Hall {
    pub fn new() -> Self {
        Self {
            factory: TicketFactory::new(),
            queues: QueueStore::new(),
            sessions: SessionRegistry::new(),
        }
    }

    /// Apply one request: validate, mutate, and describe the transition.
    ///
    /// Validation always completes before the first mutation, so an `Err`
    /// leaves the hall exactly as it was.
    pub fn apply(&mut self, request: HallRequest) -> Result<HallEvent, HallError> {
        match request {
            HallRequest::Generate { category } => self.generate(&category),
            HallRequest::CallNext {
                category,
                counter_id,
                attendant_id,
            } => self.call_next(&category, counter_id, attendant_id),
            HallRequest::Finish {
                ticket_number,
                attendant_id,
            } => self.finish(&ticket_number, attendant_id),
            HallRequest::Redirect {
                ticket_number,
                target_category,
                attendant_id,
            } => self.redirect(&ticket_number, &target_category, attendant_id),
        }
    }

    /// Point-in-time copy of all queues, for the initial-state event.
    pub fn snapshot(&self) -> QueueSnapshot {
        self.queues.snapshot()
    }

    /// Read access to sessions, for conservation checks and expiry tooling.
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Mutable session access: the expiry extension point.
    pub fn sessions_mut(&mut self) -> &mut SessionRegistry {
        &mut self.sessions
    }

    fn generate(&mut self, category: &str) -> Result<HallEvent, HallError> {
        let category = parse_category(category)?;
        let ticket = self.factory.next(category);
        self.queues.enqueue(category, ticket.clone());
        debug!(number = %ticket.number, %category, "ticket generated");
        Ok(HallEvent::TicketGenerated {
            ticket,
            queues: self.queues.snapshot(),
        })
    }

    fn call_next(
        &mut self,
        category: &str,
        counter_id: String,
        attendant_id: String,
    ) -> Result<HallEvent, HallError> {
        let category = parse_category(category)?;
        let ticket = self.queues.dequeue_front(category)?;
        self.sessions.bind(&attendant_id, &counter_id, ticket.clone());
        debug!(
            number = %ticket.number,
            counter = %counter_id,
            attendant = %attendant_id,
            "ticket called"
        );
        Ok(HallEvent::TicketCalled {
            ticket,
            counter_id,
            attendant_id,
            queues: self.queues.snapshot(),
        })
    }

    fn finish(
        &mut self,
        ticket_number: &str,
        attendant_id: String,
    ) -> Result<HallEvent, HallError> {
        if !self.sessions.matches(&attendant_id, ticket_number) {
            return Err(HallError::NoActiveTicket);
        }
        let Some(ticket) = self.sessions.clear(&attendant_id) else {
            return Err(HallError::NoActiveTicket);
        };
        debug!(number = %ticket.number, attendant = %attendant_id, "service finished");
        Ok(HallEvent::ServiceFinished {
            ticket,
            attendant_id,
            queues: self.queues.snapshot(),
        })
    }

    fn redirect(
        &mut self,
        ticket_number: &str,
        target_category: &str,
        attendant_id: String,
    ) -> Result<HallEvent, HallError> {
        // Session check first, then target validity. The checks are
        // mutually exclusive in that priority order.
        if !self.sessions.matches(&attendant_id, ticket_number) {
            return Err(HallError::NoActiveTicket);
        }
        let target = parse_category(target_category)?;
        let Some(ticket) = self.sessions.clear(&attendant_id) else {
            return Err(HallError::NoActiveTicket);
        };
        // Original identity preserved: same number, same created_at. The
        // ticket joins the target tail regardless of its age.
        self.queues.enqueue(target, ticket.clone());
        debug!(
            number = %ticket.number,
            target = %target,
            attendant = %attendant_id,
            "ticket redirected"
        );
        Ok(HallEvent::TicketRedirected {
            ticket,
            target_category: target,
            attendant_id,
            queues: self.queues.snapshot(),
        })
    }
}

fn parse_category(name: &str) -> Result<Category, HallError> {
    Category::from_str(name).map_err(|_| HallError::InvalidCategory(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(hall: &mut Hall, category: &str) -> Ticket {
        match hall
            .apply(HallRequest::Generate {
                category: category.into(),
            })
            .unwrap()
        {
            HallEvent::TicketGenerated { ticket, .. } => ticket,
            other => panic!("unexpected event: {other:?}"),
        }
    }

    fn call_next(hall: &mut Hall, category: &str, counter: &str, attendant: &str) -> Ticket {
        match hall
            .apply(HallRequest::CallNext {
                category: category.into(),
                counter_id: counter.into(),
                attendant_id: attendant.into(),
            })
            .unwrap()
        {
            HallEvent::TicketCalled { ticket, .. } => ticket,
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn generating_three_normals_builds_n001_to_n003() {
        let mut hall = Hall::new();
        let numbers: Vec<String> = (0..3)
            .map(|_| generate(&mut hall, "Normal").number)
            .collect();
        assert_eq!(numbers, ["N001", "N002", "N003"]);

        let snapshot = hall.snapshot();
        let waiting: Vec<&str> = snapshot
            .waiting(Category::Normal)
            .iter()
            .map(|t| t.number.as_str())
            .collect();
        assert_eq!(waiting, ["N001", "N002", "N003"]);
    }

    #[test]
    fn generate_rejects_unknown_category() {
        let mut hall = Hall::new();
        let err = hall
            .apply(HallRequest::Generate {
                category: "Express".into(),
            })
            .unwrap_err();
        assert_eq!(err, HallError::InvalidCategory("Express".into()));
        assert!(hall.snapshot().waiting(Category::Normal).is_empty());
    }

    #[test]
    fn call_next_is_fifo_and_binds_the_session() {
        let mut hall = Hall::new();
        generate(&mut hall, "Normal");
        generate(&mut hall, "Normal");
        generate(&mut hall, "Normal");

        let called = call_next(&mut hall, "Normal", "1", "alice");
        assert_eq!(called.number, "N001");

        let snapshot = hall.snapshot();
        let waiting: Vec<&str> = snapshot
            .waiting(Category::Normal)
            .iter()
            .map(|t| t.number.as_str())
            .collect();
        assert_eq!(waiting, ["N002", "N003"]);
        assert_eq!(hall.sessions().current("alice").unwrap().number, "N001");
    }

    #[test]
    fn call_next_on_empty_queue_fails_without_mutation() {
        let mut hall = Hall::new();
        let err = hall
            .apply(HallRequest::CallNext {
                category: "Priority".into(),
                counter_id: "2".into(),
                attendant_id: "bob".into(),
            })
            .unwrap_err();
        assert_eq!(err, HallError::EmptyQueue(Category::Priority));
        assert!(hall.sessions().is_empty());
    }

    #[test]
    fn finish_clears_session_and_leaves_queues_alone() {
        let mut hall = Hall::new();
        generate(&mut hall, "Normal");
        generate(&mut hall, "Normal");
        call_next(&mut hall, "Normal", "1", "alice");

        let event = hall
            .apply(HallRequest::Finish {
                ticket_number: "N001".into(),
                attendant_id: "alice".into(),
            })
            .unwrap();
        let HallEvent::ServiceFinished { ticket, queues, .. } = event else {
            panic!("expected ServiceFinished");
        };
        assert_eq!(ticket.number, "N001");
        assert_eq!(queues.waiting(Category::Normal).len(), 1);
        assert!(hall.sessions().current("alice").is_none());
    }

    #[test]
    fn finish_with_wrong_number_is_rejected() {
        let mut hall = Hall::new();
        generate(&mut hall, "Normal");
        call_next(&mut hall, "Normal", "1", "alice");

        let err = hall
            .apply(HallRequest::Finish {
                ticket_number: "N999".into(),
                attendant_id: "alice".into(),
            })
            .unwrap_err();
        assert_eq!(err, HallError::NoActiveTicket);
        assert_eq!(hall.sessions().current("alice").unwrap().number, "N001");
    }

    #[test]
    fn finish_without_a_session_is_rejected() {
        let mut hall = Hall::new();
        let err = hall
            .apply(HallRequest::Finish {
                ticket_number: "N001".into(),
                attendant_id: "nobody".into(),
            })
            .unwrap_err();
        assert_eq!(err, HallError::NoActiveTicket);
    }

    #[test]
    fn redirect_moves_the_held_ticket_to_the_target_tail() {
        let mut hall = Hall::new();
        generate(&mut hall, "Normal");
        generate(&mut hall, "Normal");
        generate(&mut hall, "Priority");
        call_next(&mut hall, "Normal", "1", "bob");
        let held = hall.sessions().current("bob").unwrap().clone();

        let event = hall
            .apply(HallRequest::Redirect {
                ticket_number: "N001".into(),
                target_category: "Priority".into(),
                attendant_id: "bob".into(),
            })
            .unwrap();
        let HallEvent::TicketRedirected {
            ticket,
            target_category,
            queues,
            ..
        } = event
        else {
            panic!("expected TicketRedirected");
        };

        assert_eq!(target_category, Category::Priority);
        // Original identity preserved through the redirect.
        assert_eq!(ticket.number, held.number);
        assert_eq!(ticket.created_at, held.created_at);
        let priority: Vec<&str> = queues
            .waiting(Category::Priority)
            .iter()
            .map(|t| t.number.as_str())
            .collect();
        assert_eq!(priority, ["P001", "N001"], "redirected ticket joins the tail");
        assert!(hall.sessions().current("bob").is_none());
    }

    #[test]
    fn redirect_session_check_outranks_bad_target() {
        let mut hall = Hall::new();
        // No session at all, and the target is also invalid: the session
        // error wins.
        let err = hall
            .apply(HallRequest::Redirect {
                ticket_number: "N001".into(),
                target_category: "Express".into(),
                attendant_id: "nobody".into(),
            })
            .unwrap_err();
        assert_eq!(err, HallError::NoActiveTicket);
    }

    #[test]
    fn redirect_to_invalid_target_keeps_the_session() {
        let mut hall = Hall::new();
        generate(&mut hall, "Normal");
        call_next(&mut hall, "Normal", "1", "alice");

        let err = hall
            .apply(HallRequest::Redirect {
                ticket_number: "N001".into(),
                target_category: "Express".into(),
                attendant_id: "alice".into(),
            })
            .unwrap_err();
        assert_eq!(err, HallError::InvalidCategory("Express".into()));
        assert_eq!(hall.sessions().current("alice").unwrap().number, "N001");
        assert!(hall.snapshot().waiting(Category::Normal).is_empty());
    }

    #[test]
    fn numbers_not_reused_after_call() {
        // Pinned decision: sequences are monotonic for the process
        // lifetime, not derived from queue length. The original system
        // reused numbers once the queue shrank.
        let mut hall = Hall::new();
        generate(&mut hall, "Normal");
        call_next(&mut hall, "Normal", "1", "alice");
        hall.apply(HallRequest::Finish {
            ticket_number: "N001".into(),
            attendant_id: "alice".into(),
        })
        .unwrap();

        assert_eq!(generate(&mut hall, "Normal").number, "N002");
    }

    #[test]
    fn a_live_ticket_is_in_exactly_one_place() {
        let mut hall = Hall::new();
        generate(&mut hall, "Normal");
        generate(&mut hall, "Normal");
        call_next(&mut hall, "Normal", "1", "alice");

        let snapshot = hall.snapshot();
        let queued: Vec<&str> = Category::ALL
            .iter()
            .flat_map(|c| snapshot.waiting(*c))
            .map(|t| t.number.as_str())
            .collect();
        let held: Vec<&str> = hall
            .sessions()
            .held_tickets()
            .map(|t| t.number.as_str())
            .collect();

        assert_eq!(queued, ["N002"]);
        assert_eq!(held, ["N001"]);
        assert!(!queued.iter().any(|n| held.contains(n)));
    }

    #[test]
    fn full_counter_scenario() {
        // The walk-through from the original deployment: three normals,
        // a call, a finish, a failed empty-queue call, and a redirect.
        let mut hall = Hall::new();
        for _ in 0..3 {
            generate(&mut hall, "Normal");
        }

        assert_eq!(call_next(&mut hall, "Normal", "1", "a").number, "N001");
        hall.apply(HallRequest::Finish {
            ticket_number: "N001".into(),
            attendant_id: "a".into(),
        })
        .unwrap();

        assert_eq!(
            hall.apply(HallRequest::CallNext {
                category: "Priority".into(),
                counter_id: "2".into(),
                attendant_id: "b".into(),
            })
            .unwrap_err(),
            HallError::EmptyQueue(Category::Priority)
        );

        assert_eq!(call_next(&mut hall, "Normal", "2", "b").number, "N002");
        hall.apply(HallRequest::Redirect {
            ticket_number: "N002".into(),
            target_category: "Priority".into(),
            attendant_id: "b".into(),
        })
        .unwrap();

        let snapshot = hall.snapshot();
        assert_eq!(snapshot.waiting(Category::Normal).len(), 1);
        assert_eq!(snapshot.waiting(Category::Priority)[0].number, "N002");
        assert!(hall.sessions().current("b").is_none());
    }
}
