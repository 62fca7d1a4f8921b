//! Built-in handlers, one per ability with non-default mechanics.

mod ascension;
mod barrier;
mod blitz;
mod bolt;
mod cleave;
mod companion;
mod sanctuary;
mod siphon;
mod slam;
mod spear;
pub mod trap;

pub use ascension::AscensionHandler;
pub use barrier::WardingBarrierHandler;
pub use blitz::BlitzDashHandler;
pub use bolt::PiercingBoltHandler;
pub use cleave::CleavingArcHandler;
pub use companion::CompanionOrbHandler;
pub use sanctuary::SanctuaryHandler;
pub use siphon::SiphonHandler;
pub use slam::GroundSlamHandler;
pub use spear::ChargedSpearHandler;
pub use trap::SnareTrapHandler;

use super::HandlerRegistry;

pub(crate) fn register_all(registry: &mut HandlerRegistry) {
    registry.register(CompanionOrbHandler);
    registry.register(ChargedSpearHandler);
    registry.register(BlitzDashHandler);
    registry.register(SanctuaryHandler);
    registry.register(WardingBarrierHandler);
    registry.register(SnareTrapHandler);
    registry.register(AscensionHandler);
    registry.register(PiercingBoltHandler);
    registry.register(SiphonHandler);
    registry.register(CleavingArcHandler);
    registry.register(GroundSlamHandler);
}
