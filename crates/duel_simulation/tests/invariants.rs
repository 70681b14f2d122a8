//! Property tests: инварианты боя при случайном вводе

use std::time::Duration;

use duel_simulation::*;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_bounds_hold_every_tick(seed in any::<u64>(), ticks in 100usize..600) {
        let config = DuelConfig::default();
        let mut duel = DuelMatch::new(config.clone()).unwrap();
        let mut inputs = RandomInputSource::new(seed);
        let mut defeated_seen = [false; 2];

        for _ in 0..ticks {
            duel.tick(Duration::from_millis(16), inputs.next_pair());

            for snapshot in duel.snapshots() {
                prop_assert!(snapshot.health >= 0.0 && snapshot.health <= snapshot.max_health);
                prop_assert!(snapshot.stamina >= 0.0 && snapshot.stamina <= snapshot.max_stamina);

                prop_assert!(snapshot.x >= 0.0);
                prop_assert!(snapshot.x + config.fighter.width <= config.arena.width + 0.001);
                prop_assert!(snapshot.y >= 0.0);
                prop_assert!(snapshot.y + config.fighter.height <= config.arena.ground_y() + 0.001);

                // Нулевое здоровье ⇔ поражение, и оно не отменяется
                prop_assert_eq!(snapshot.health == 0.0, snapshot.is_defeated);
                let seen = &mut defeated_seen[snapshot.id.index()];
                prop_assert!(!*seen || snapshot.is_defeated);
                *seen |= snapshot.is_defeated;
            }

            if defeated_seen.iter().any(|d| *d) {
                prop_assert_eq!(duel.phase(), MatchPhase::Ended);
            }
        }
    }

    #[test]
    fn prop_effect_arena_never_exceeds_capacity(seed in any::<u64>()) {
        let mut duel = DuelMatch::new(DuelConfig::default()).unwrap();
        let mut inputs = RandomInputSource::new(seed);
        let capacity = duel.config().effects.slots;

        for _ in 0..300 {
            duel.tick(Duration::from_millis(16), inputs.next_pair());
            prop_assert!(duel.active_effects().len() <= capacity);
        }
    }
}
