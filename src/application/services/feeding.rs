//! Feeding service
//!
//! Builds the animal chain from settings and serves requests into it.
//! Reporting who ate what happens here; the handlers only return results.

use std::fmt;
use std::rc::Rc;

use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::ChainConfig;
use crate::domain::{chain_from, Animal, AnimalHandler, HandlerRef};

/// A linked chain plus handles to each of its members.
#[derive(Debug)]
pub struct Chain {
    handlers: Vec<(Animal, HandlerRef)>,
}

impl Chain {
    pub fn head(&self) -> Option<&HandlerRef> {
        self.handlers.first().map(|(_, h)| h)
    }

    /// First handler for `animal`.
    pub fn get(&self, animal: Animal) -> Option<&HandlerRef> {
        self.handlers
            .iter()
            .find(|(a, _)| *a == animal)
            .map(|(_, h)| h)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = match self.head() {
            Some(head) => chain_from(Rc::clone(head))
                .map(|h| h.name().to_string())
                .collect(),
            None => Vec::new(),
        };
        write!(f, "{}", names.join(" -> "))
    }
}

/// Outcome of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Serving {
    pub request: String,
    /// Resolution text, None when nobody took the request
    pub outcome: Option<String>,
}

impl Serving {
    pub fn is_handled(&self) -> bool {
        self.outcome.is_some()
    }
}

impl fmt::Display for Serving {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Some(outcome) => write!(f, "{}", outcome),
            None => write!(f, "{} was left untouched.", self.request),
        }
    }
}

/// Service for building feeding chains and dispatching requests.
pub struct FeedingService {
    config: ChainConfig,
}

impl FeedingService {
    pub fn new(config: ChainConfig) -> Self {
        Self { config }
    }

    /// One handler per configured animal, linked head to tail.
    #[instrument(level = "debug", skip(self))]
    pub fn build_chain(&self) -> ApplicationResult<Chain> {
        let handlers: Vec<(Animal, HandlerRef)> = self
            .config
            .order
            .iter()
            .map(|&animal| (animal, AnimalHandler::shared(animal)))
            .collect();

        let Some((_, head)) = handlers.first() else {
            return Err(ApplicationError::EmptyChain);
        };
        handlers
            .iter()
            .skip(1)
            .try_fold(Rc::clone(head), |prev, (_, next)| {
                prev.try_set_next(Rc::clone(next))
            })?;

        let chain = Chain { handlers };
        debug!("chain built: {}", chain);
        Ok(chain)
    }

    /// Sends each request to `entry`, which may sit anywhere in the chain.
    #[instrument(level = "debug", skip(self, chain, requests))]
    pub fn serve(
        &self,
        chain: &Chain,
        entry: Animal,
        requests: &[String],
    ) -> ApplicationResult<Vec<Serving>> {
        let handler = chain.get(entry).ok_or(ApplicationError::NotInChain(entry))?;

        let servings = requests
            .iter()
            .map(|request| {
                let outcome = handler.handle(request);
                match &outcome {
                    Some(result) => info!(request = %request, "{}", result),
                    None => info!(request = %request, "left untouched"),
                }
                Serving {
                    request: request.clone(),
                    outcome,
                }
            })
            .collect();
        Ok(servings)
    }

    /// Builds the configured chain and serves the configured requests.
    pub fn run(&self) -> ApplicationResult<Vec<Serving>> {
        let chain = self.build_chain()?;
        self.serve(&chain, self.config.entry, &self.config.requests)
    }
}
