//! Chain of responsibility: each handler resolves a request or passes it on.
//!
//! Handlers are shared (`Rc`) so a caller can keep a handle to any link and
//! send requests into the middle of a chain. A successor slot is filled at
//! most once. `set_next` does not check for cycles; a chain that loops back
//! on itself never terminates and is caller error. `try_set_next` rejects
//! both double links and cycles.

use std::cell::OnceCell;
use std::fmt;
use std::iter;
use std::ptr;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{instrument, trace, warn};

use crate::domain::error::{DomainError, DomainResult};

pub type HandlerRef = Rc<dyn Handler>;

/// Successor slot shared by all handlers.
#[derive(Debug, Default)]
pub struct Successor {
    next: OnceCell<HandlerRef>,
}

impl Successor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&HandlerRef> {
        self.next.get()
    }

    pub fn is_set(&self) -> bool {
        self.next.get().is_some()
    }

    /// Stores `next` unless a successor is already present, in which case `next` comes back.
    fn link(&self, next: HandlerRef) -> Result<(), HandlerRef> {
        self.next.set(next)
    }

    fn forward(&self, request: &str) -> Option<String> {
        self.get().and_then(|next| next.handle(request))
    }
}

pub trait Handler: fmt::Debug {
    fn name(&self) -> &str;

    fn successor(&self) -> &Successor;

    /// Resolves `request` if it is this handler's own token. Never forwards.
    fn resolve(&self, request: &str) -> Option<String>;

    /// Resolves `request` here or forwards it; None when nobody in the rest of the chain takes it.
    fn handle(&self, request: &str) -> Option<String> {
        match self.resolve(request) {
            Some(result) => Some(result),
            None => {
                trace!(handler = self.name(), request, "forwarding");
                self.successor().forward(request)
            }
        }
    }

    fn next(&self) -> Option<HandlerRef> {
        self.successor().get().cloned()
    }

    /// Links `next` as successor and returns `next`, so
    /// `a.set_next(b).set_next(c)` builds `a -> b -> c`.
    ///
    /// An existing successor is kept.
    fn set_next(&self, next: HandlerRef) -> HandlerRef {
        if let Err(rejected) = self.successor().link(Rc::clone(&next)) {
            warn!(
                handler = self.name(),
                rejected = rejected.name(),
                "successor already set, keeping existing link"
            );
        }
        next
    }

    /// Checked form of [`Handler::set_next`].
    fn try_set_next(&self, next: HandlerRef) -> DomainResult<HandlerRef> {
        if self.successor().is_set() {
            return Err(DomainError::SuccessorAlreadySet(self.name().to_string()));
        }
        let me = self as *const Self;
        if chain_from(Rc::clone(&next)).any(|h| ptr::addr_eq(Rc::as_ptr(&h), me)) {
            return Err(DomainError::CycleDetected(self.name().to_string()));
        }
        Ok(self.set_next(next))
    }
}

/// `start` followed by each of its successors.
pub fn chain_from(start: HandlerRef) -> impl Iterator<Item = HandlerRef> {
    iter::successors(Some(start), |h| h.next())
}

/// The animals of the feeding chain and the food each one eats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Animal {
    Monkey,
    Squirrel,
    Dog,
}

impl Animal {
    pub const ALL: [Animal; 3] = [Animal::Monkey, Animal::Squirrel, Animal::Dog];

    /// Sentinel token this animal handles.
    pub fn food(&self) -> &'static str {
        match self {
            Animal::Monkey => "Banana",
            Animal::Squirrel => "Nut",
            Animal::Dog => "MeatBall",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Animal::Monkey => "Monkey",
            Animal::Squirrel => "Squirrel",
            Animal::Dog => "Dog",
        }
    }
}

impl fmt::Display for Animal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Animal {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Animal::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::UnknownHandler(s.to_string()))
    }
}

#[derive(Debug)]
pub struct AnimalHandler {
    animal: Animal,
    successor: Successor,
}

impl AnimalHandler {
    pub fn new(animal: Animal) -> Self {
        Self {
            animal,
            successor: Successor::new(),
        }
    }

    /// Shared handle, ready for linking.
    pub fn shared(animal: Animal) -> HandlerRef {
        Rc::new(Self::new(animal))
    }

    pub fn animal(&self) -> Animal {
        self.animal
    }
}

impl Handler for AnimalHandler {
    fn name(&self) -> &str {
        self.animal.name()
    }

    fn successor(&self) -> &Successor {
        &self.successor
    }

    #[instrument(level = "trace", skip(self), fields(handler = self.animal.name()))]
    fn resolve(&self, request: &str) -> Option<String> {
        (request == self.animal.food())
            .then(|| format!("{}: I'll eat the {}.", self.animal, request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_matches_only_own_token() {
        let dog = AnimalHandler::new(Animal::Dog);
        assert_eq!(
            dog.resolve("MeatBall").as_deref(),
            Some("Dog: I'll eat the MeatBall.")
        );
        assert_eq!(dog.resolve("meatball"), None);
        assert_eq!(dog.resolve("Nut"), None);
    }

    #[test]
    fn test_lone_handler_returns_none_for_foreign_request() {
        let monkey = AnimalHandler::new(Animal::Monkey);
        assert_eq!(monkey.handle("Nut"), None);
        assert!(monkey.next().is_none());
    }

    #[test]
    fn test_set_next_keeps_first_successor() {
        let monkey = AnimalHandler::shared(Animal::Monkey);
        let squirrel = AnimalHandler::shared(Animal::Squirrel);
        let dog = AnimalHandler::shared(Animal::Dog);

        monkey.set_next(Rc::clone(&squirrel));
        let returned = monkey.set_next(Rc::clone(&dog));

        assert!(Rc::ptr_eq(&returned, &dog));
        let next = monkey.next().expect("successor");
        assert!(Rc::ptr_eq(&next, &squirrel));
    }

    #[test]
    fn test_try_set_next_rejects_self_link() {
        let dog = AnimalHandler::shared(Animal::Dog);
        let err = dog.try_set_next(Rc::clone(&dog)).unwrap_err();
        assert_eq!(err, DomainError::CycleDetected("Dog".to_string()));
        assert!(dog.next().is_none());
    }

    #[test]
    fn test_animal_from_str_ignores_case() {
        assert_eq!("squirrel".parse::<Animal>().unwrap(), Animal::Squirrel);
        assert_eq!(" DOG ".parse::<Animal>().unwrap(), Animal::Dog);
        assert!("cat".parse::<Animal>().is_err());
    }
}
