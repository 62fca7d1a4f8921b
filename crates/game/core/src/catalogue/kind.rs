/// Identifier of every ability known to the catalogue.
///
/// Each champion archetype binds one `AbilityKind` per slot. Abilities with
/// special mechanics have a handler registered under the same kind; the rest
/// run through the generic executor.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AbilityKind {
    // ===== companion / summoner =====
    /// Sends a persistent orb to a point; recast recalls it.
    CompanionOrb,

    // ===== skirmisher =====
    /// Hold-to-charge spear throw; a hit opens a dash-to-impact recast.
    ChargedSpear,
    /// Self-buffing dash that debuffs whatever it passes through.
    BlitzDash,

    // ===== support =====
    /// Heals every ally around the caster and strips their debuffs.
    Sanctuary,
    /// Shields a single ally.
    WardingBarrier,

    // ===== trapper =====
    /// Places a trap from a replenishing charge pool.
    SnareTrap,
    /// Timed transformation with a damage aura.
    Ascension,

    // ===== marksman / mage =====
    /// Line projectile that marks every enemy it passes through.
    PiercingBolt,
    /// Channel that drains the target when it completes.
    Siphon,

    // ===== bruiser =====
    /// Cone strike in front of the caster.
    CleavingArc,
    /// Circle slam that stuns enemies close to the caster.
    GroundSlam,

    // ===== catalogue-only (generic executor) =====
    /// Ground-targeted area burst.
    ArcaneBlast,
    /// Self-cast buff for the caster and nearby allies.
    Rally,
}
