//! Детерминированный источник случайного ввода
//!
//! Не AI: просто "давит кнопки" с заданными вероятностями.
//! Используется headless runner'ом и тестами детерминизма/инвариантов.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::components::FighterInput;

pub struct RandomInputSource {
    rng: ChaCha8Rng,
    seed: u64,
}

impl RandomInputSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Ввод одного бойца на один тик
    pub fn next_input(&mut self) -> FighterInput {
        let direction = self.rng.gen_range(0..3);
        FighterInput {
            left: direction == 1,
            right: direction == 2,
            jump: self.rng.gen_bool(0.05),
            punch: self.rng.gen_bool(0.12),
            kick: self.rng.gen_bool(0.08),
            defend: self.rng.gen_bool(0.1),
        }
    }

    /// Вводы обоих бойцов (сначала первый, потом второй)
    pub fn next_pair(&mut self) -> [FighterInput; 2] {
        [self.next_input(), self.next_input()]
    }
}
