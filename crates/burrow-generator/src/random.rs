use crate::Generator;
use burrow_core::shortcode::CODE_LENGTH;
use burrow_core::ShortCode;
use rand::distr::Alphanumeric;
use rand::Rng;

/// Draws every character uniformly from the 62 alphanumeric symbols using the
/// thread-local CSPRNG, giving a code space of 62^6.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGenerator;

impl RandomGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Generator for RandomGenerator {
    type Output = ShortCode;

    fn generate(&self) -> ShortCode {
        let code: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(CODE_LENGTH)
            .map(char::from)
            .collect();
        ShortCode::new_unchecked(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generates_valid_codes() {
        let generator = RandomGenerator::new();

        for _ in 0..1_000 {
            let code = generator.generate();
            assert!(
                ShortCode::new(code.as_str()).is_ok(),
                "generated code '{}' should pass validation",
                code
            );
        }
    }

    #[test]
    fn codes_are_spread_out() {
        let generator = RandomGenerator::new();
        let codes: HashSet<_> = (0..1_000).map(|_| generator.generate()).collect();

        // 1000 draws from 62^6 collide with probability below 1e-5
        assert_eq!(codes.len(), 1_000);
    }

    #[test]
    fn uses_the_whole_alphabet() {
        let generator = RandomGenerator::new();
        let mut seen = HashSet::new();

        for _ in 0..2_000 {
            seen.extend(generator.generate().as_str().chars());
        }

        assert!(seen.iter().any(|c| c.is_ascii_lowercase()));
        assert!(seen.iter().any(|c| c.is_ascii_uppercase()));
        assert!(seen.iter().any(|c| c.is_ascii_digit()));
        assert_eq!(seen.len(), 62);
    }

    #[test]
    fn generator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RandomGenerator>();
    }
}
