//! Combat resolution system.
//!
//! Pure functions and collaborators for resolving attacks. Randomness always
//! comes from an explicit [`GameRng`](crate::rng::GameRng).
//!
//! # Collaborators
//!
//! - [`StatCalculator`]: `calculate_stats(species, level)`
//! - [`DamageResolver`]: `resolve_damage(attacker, defender, move)`
//!
//! # Core Functions
//!
//! - `resolve_direct`: area hit around a point, removing fainted NPCs
//! - `apply_damage`: HP reduction (clamped to 0)

pub mod attack;
pub mod damage;
pub mod effect;
pub mod projectile;
pub mod stats;
pub mod types;

pub use attack::{
    AffectedNpc, AttackKind, AttackRequest, PlayerAttack, remove_fainted, resolve_direct, strike,
};
pub use damage::{Combatant, DamageResolver, DamageRoll, StandardDamage, apply_damage};
pub use effect::{
    AppliedEffect, EffectTable, EffectTarget, EffectTrigger, MoveEffect, StatKind,
    StatusCondition,
};
pub use projectile::{
    Projectile, ProjectileHit, ProjectileOutcome, ProjectileOwner, ProjectileView,
};
pub use stats::{SimplifiedStats, StandardStats, StatCalculator, Stats};
pub use types::{ElementType, effectiveness};
