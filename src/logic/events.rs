use serde::Serialize;
use strum::{Display, EnumIter, EnumString};

use crate::model::Index;

/// Browser panel content a user can switch to with `choose`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum DisplayType {
    Linkedin,
    Facebook,
    Meeting,
}

/// One-way notification to view collaborators, sent after a command commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UiEvent {
    AddressBookChanged,
    /// The visible list was filtered or reordered; stored data is unchanged.
    PersonListChanged,
    JumpToBrowser { display: DisplayType },
    JumpToListRequest { index: Index },
    ExitAppRequest,
}

pub trait EventObserver {
    fn notify(&mut self, event: &UiEvent);
}

impl<F> EventObserver for F
where
    F: FnMut(&UiEvent),
{
    fn notify(&mut self, event: &UiEvent) {
        self(event)
    }
}

/// Observers are called synchronously, in registration order.
#[derive(Default)]
pub struct Observers {
    observers: Vec<Box<dyn EventObserver>>,
}

impl Observers {
    pub fn register(&mut self, observer: impl EventObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn publish(&mut self, event: &UiEvent) {
        tracing::trace!(?event, observers = self.observers.len(), "publishing ui event");
        for observer in &mut self.observers {
            observer.notify(event);
        }
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("len", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::str::FromStr;

    #[test]
    fn display_type_parses_case_insensitively() {
        assert_eq!(DisplayType::from_str("LinkedIn").unwrap(), DisplayType::Linkedin);
        assert_eq!(DisplayType::Meeting.to_string(), "meeting");
        assert!(DisplayType::from_str("twitter").is_err());
    }

    #[test]
    fn observers_receive_events_in_registration_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut observers = Observers::default();
        for label in ["first", "second"] {
            let seen = Rc::clone(&seen);
            observers.register(move |event: &UiEvent| {
                seen.borrow_mut().push(format!("{label}:{event:?}"));
            });
        }
        observers.publish(&UiEvent::AddressBookChanged);
        assert_eq!(
            *seen.borrow(),
            ["first:AddressBookChanged", "second:AddressBookChanged"]
        );
    }

    #[test]
    fn events_serialize_with_tag() {
        let json = serde_json::to_string(&UiEvent::JumpToBrowser {
            display: DisplayType::Facebook,
        })
        .unwrap();
        assert_eq!(json, r#"{"event":"jump_to_browser","display":"facebook"}"#);
        let json = serde_json::to_string(&UiEvent::PersonListChanged).unwrap();
        assert_eq!(json, r#"{"event":"person_list_changed"}"#);
    }
}
