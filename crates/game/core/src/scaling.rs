//! Scaling calculator: per-rank magnitude from a scaling table and the
//! caster's stats.

use crate::catalogue::ScalingTable;
use crate::catalogue::ability::rank_index;
use crate::stats::StatsSnapshot;

/// Stat inputs for one magnitude calculation. Built from a snapshot per call
/// and never stored.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScalingContext {
    pub attack_damage: f32,
    pub ability_power: f32,
    /// Max health minus base health.
    pub bonus_health: f32,
    pub max_health: f32,
}

impl ScalingContext {
    pub fn from_snapshot(snapshot: &StatsSnapshot) -> Self {
        Self {
            attack_damage: snapshot.attack_damage,
            ability_power: snapshot.ability_power,
            bonus_health: snapshot.bonus_health(),
            max_health: snapshot.max_health,
        }
    }
}

/// `(base[rank-1] + ratios · stats) · multiplier`.
///
/// Exactly 0 when the table is absent or `rank` is 0, whatever the stats, so
/// callers can compute damage, heal and shield unconditionally. Ranks past
/// the table are rejected by catalogue validation; here they read as 0.
pub fn compute_magnitude(
    table: Option<&ScalingTable>,
    rank: u8,
    ctx: &ScalingContext,
    multiplier: f32,
) -> f32 {
    let Some(table) = table else {
        return 0.0;
    };
    let Some(base) = rank_index(rank).and_then(|idx| table.base.get(idx)) else {
        return 0.0;
    };

    let scaled = base
        + table.ad_ratio * ctx.attack_damage
        + table.ap_ratio * ctx.ability_power
        + table.bonus_health_ratio * ctx.bonus_health
        + table.max_health_ratio * ctx.max_health;
    scaled * multiplier
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ScalingContext {
        ScalingContext {
            attack_damage: 100.0,
            ability_power: 50.0,
            bonus_health: 200.0,
            max_health: 1200.0,
        }
    }

    fn table() -> ScalingTable {
        ScalingTable {
            base: vec![60.0, 95.0, 130.0, 130.0, 200.0],
            ad_ratio: 0.5,
            ap_ratio: 0.4,
            bonus_health_ratio: 0.1,
            max_health_ratio: 0.01,
        }
    }

    #[test]
    fn combines_base_and_ratios() {
        // 60 + 50 + 20 + 20 + 12
        assert_eq!(compute_magnitude(Some(&table()), 1, &ctx(), 1.0), 162.0);
        assert_eq!(compute_magnitude(Some(&table()), 1, &ctx(), 0.5), 81.0);
    }

    #[test]
    fn absent_component_is_zero_for_any_rank_and_stats() {
        let rich = ScalingContext {
            attack_damage: 9999.0,
            ability_power: 9999.0,
            bonus_health: 9999.0,
            max_health: 9999.0,
        };
        for rank in 0..=5 {
            assert_eq!(compute_magnitude(None, rank, &rich, 1.0), 0.0);
            assert_eq!(compute_magnitude(None, rank, &ScalingContext::default(), 3.0), 0.0);
        }
    }

    #[test]
    fn rank_zero_is_zero() {
        assert_eq!(compute_magnitude(Some(&table()), 0, &ctx(), 1.0), 0.0);
    }

    #[test]
    fn non_decreasing_in_rank_for_non_decreasing_table() {
        let table = table();
        let mut previous = f32::MIN;
        for rank in 1..=table.base.len() as u8 {
            let value = compute_magnitude(Some(&table), rank, &ctx(), 1.0);
            assert!(value >= previous, "rank {rank} dropped to {value}");
            previous = value;
        }
    }
}
