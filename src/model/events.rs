//! Typed, synchronous event bus with veto

use tracing::warn;

use crate::error::DesignError;

use super::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesignEvent {
    BeforeCreate { class: String, parent: NodeId },
    AfterCreate { node: NodeId },
    AfterChildAdded { parent: NodeId, child: NodeId },
    BeforeMove { node: NodeId, parent: NodeId },
    AfterMove { node: NodeId },
    BeforeDelete { node: NodeId },
    AfterDelete { node: NodeId },
    BeforeRename { node: NodeId, old: String, new: String },
    BeforeMaterialize { node: NodeId },
    BeforeConvert { node: NodeId, to: &'static str },
}

impl DesignEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DesignEvent::BeforeCreate { .. } => "BeforeCreate",
            DesignEvent::AfterCreate { .. } => "AfterCreate",
            DesignEvent::AfterChildAdded { .. } => "AfterChildAdded",
            DesignEvent::BeforeMove { .. } => "BeforeMove",
            DesignEvent::AfterMove { .. } => "AfterMove",
            DesignEvent::BeforeDelete { .. } => "BeforeDelete",
            DesignEvent::AfterDelete { .. } => "AfterDelete",
            DesignEvent::BeforeRename { .. } => "BeforeRename",
            DesignEvent::BeforeMaterialize { .. } => "BeforeMaterialize",
            DesignEvent::BeforeConvert { .. } => "BeforeConvert",
        }
    }
}

/// Listener response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Proceed,
    Veto(String),
}

type Listener = Box<dyn FnMut(&DesignEvent) -> Verdict>;

/// Listeners are called in registration order; the first veto stops delivery
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&DesignEvent) -> Verdict + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn publish(&mut self, event: &DesignEvent) -> Result<(), DesignError> {
        for listener in &mut self.listeners {
            if let Verdict::Veto(reason) = listener(event) {
                warn!(event = event.name(), %reason, "edit vetoed");
                return Err(DesignError::Vetoed {
                    event: event.name(),
                    reason,
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_delivery_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        for tag in ["first", "second"] {
            let seen = seen.clone();
            bus.subscribe(move |event| {
                seen.borrow_mut().push(format!("{}:{}", tag, event.name()));
                Verdict::Proceed
            });
        }
        bus.publish(&DesignEvent::AfterCreate { node: NodeId(1) })
            .expect("Should deliver");
        assert_eq!(
            *seen.borrow(),
            vec!["first:AfterCreate".to_string(), "second:AfterCreate".to_string()]
        );
    }

    #[test]
    fn test_veto_stops_delivery() {
        let calls = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        bus.subscribe(|event| match event {
            DesignEvent::BeforeDelete { .. } => Verdict::Veto("locked".to_string()),
            _ => Verdict::Proceed,
        });
        let counter = calls.clone();
        bus.subscribe(move |_| {
            *counter.borrow_mut() += 1;
            Verdict::Proceed
        });
        let err = bus
            .publish(&DesignEvent::BeforeDelete { node: NodeId(2) })
            .expect_err("Should veto");
        assert!(matches!(err, DesignError::Vetoed { event: "BeforeDelete", .. }));
        assert_eq!(*calls.borrow(), 0);
    }
}
