//! Handler registry: ability kind → handler, built once per process.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use crate::catalogue::{AbilityKind, Catalogue, ConfigError};

use super::handlers;
use super::{AbilityHandler, HandlerCapabilities};

/// A handler and the capabilities it declared at registration.
#[derive(Clone)]
pub struct RegisteredHandler {
    pub handler: Arc<dyn AbilityHandler>,
    pub capabilities: HandlerCapabilities,
}

impl RegisteredHandler {
    pub fn supports(&self, capability: HandlerCapabilities) -> bool {
        self.capabilities.contains(capability)
    }
}

impl std::fmt::Debug for RegisteredHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredHandler")
            .field("ability", &self.handler.ability())
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

/// Maps ability kinds to handlers. Abilities without an entry run through
/// the generic executor.
#[derive(Clone, Debug, Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<AbilityKind, RegisteredHandler>,
}

static GLOBAL: OnceLock<HandlerRegistry> = OnceLock::new();

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in handler.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        handlers::register_all(&mut registry);
        registry
    }

    /// Process-wide registry, initialised with the built-in handlers on
    /// first use.
    pub fn global() -> &'static HandlerRegistry {
        GLOBAL.get_or_init(Self::builtin)
    }

    /// Registers `handler`, recording its capabilities. Returns the handler
    /// it replaced, if any.
    pub fn register<H>(&mut self, handler: H) -> Option<RegisteredHandler>
    where
        H: AbilityHandler + 'static,
    {
        let capabilities = handler.capabilities();
        let ability = handler.ability();
        self.handlers.insert(
            ability,
            RegisteredHandler {
                handler: Arc::new(handler),
                capabilities,
            },
        )
    }

    pub fn get(&self, ability: AbilityKind) -> Option<&RegisteredHandler> {
        self.handlers.get(&ability)
    }

    pub fn handler(&self, ability: AbilityKind) -> Option<&dyn AbilityHandler> {
        self.get(ability).map(|entry| entry.handler.as_ref())
    }

    /// True if `ability` has a handler declaring `capability`.
    pub fn supports(&self, ability: AbilityKind, capability: HandlerCapabilities) -> bool {
        self.get(ability).is_some_and(|entry| entry.supports(capability))
    }

    pub fn contains(&self, ability: AbilityKind) -> bool {
        self.handlers.contains_key(&ability)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered abilities and their capabilities, in kind order.
    pub fn entries(&self) -> impl Iterator<Item = (AbilityKind, HandlerCapabilities)> + '_ {
        self.handlers
            .iter()
            .map(|(kind, entry)| (*kind, entry.capabilities))
    }

    /// Every handler must map to a catalogue entry that carries the
    /// components it reads.
    pub fn validate_against(&self, catalogue: &Catalogue) -> Result<(), ConfigError> {
        for (ability, entry) in &self.handlers {
            let def = catalogue
                .ability(*ability)
                .ok_or(ConfigError::UnknownAbility { ability: *ability })?;
            for component in entry.handler.requires() {
                if !component.present_in(def) {
                    return Err(ConfigError::MissingComponent {
                        ability: *ability,
                        component: component.into(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::{CastContext, Component, ExecutionResult};
    use crate::catalogue::AbilityDefinition;

    struct Probe;

    impl AbilityHandler for Probe {
        fn ability(&self) -> AbilityKind {
            AbilityKind::ArcaneBlast
        }

        fn capabilities(&self) -> HandlerCapabilities {
            HandlerCapabilities::RECAST | HandlerCapabilities::COMPLETION
        }

        fn requires(&self) -> &'static [Component] {
            &[Component::Damage]
        }

        fn execute(&self, _ctx: &mut CastContext<'_>) -> ExecutionResult {
            ExecutionResult::success()
        }
    }

    #[test]
    fn capabilities_are_recorded_at_registration() {
        let mut registry = HandlerRegistry::new();
        assert!(registry.register(Probe).is_none());
        assert!(registry.supports(AbilityKind::ArcaneBlast, HandlerCapabilities::RECAST));
        assert!(!registry.supports(AbilityKind::ArcaneBlast, HandlerCapabilities::DASH_COLLISION));
        assert!(!registry.supports(AbilityKind::Rally, HandlerCapabilities::RECAST));
        assert!(registry.register(Probe).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn handler_without_catalogue_entry_is_rejected() {
        let mut registry = HandlerRegistry::new();
        registry.register(Probe);
        let empty = Catalogue::default();
        assert_eq!(
            registry.validate_against(&empty),
            Err(ConfigError::UnknownAbility {
                ability: AbilityKind::ArcaneBlast
            })
        );

        let bare = Catalogue::new([AbilityDefinition::new(AbilityKind::ArcaneBlast, 1)], []);
        assert!(matches!(
            registry.validate_against(&bare),
            Err(ConfigError::MissingComponent { component: "damage", .. })
        ));
    }

    #[test]
    fn global_registry_holds_builtin_handlers() {
        let global = HandlerRegistry::global();
        assert!(global.contains(AbilityKind::CompanionOrb));
        assert!(global.contains(AbilityKind::SnareTrap));
        assert!(!global.contains(AbilityKind::ArcaneBlast));
        assert!(global.supports(AbilityKind::BlitzDash, HandlerCapabilities::DASH_COLLISION));
        assert!(std::ptr::eq(global, HandlerRegistry::global()));
    }
}
