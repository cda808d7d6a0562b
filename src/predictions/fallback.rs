use rand::Rng;

use crate::domain::{AiPrediction, Confidence, Phase, Score, FALLBACK_MARKER};

/// Highest goal count a fallback draws per team
pub const MAX_FALLBACK_GOALS: u32 = 3;

/// Reasoning stored with every fallback; contains `FALLBACK_MARKER`.
pub fn fallback_reasoning() -> String {
    format!(
        "Esta es una {} generada por el sistema porque el servicio de IA no estuvo disponible. \
         Tómala como referencia de baja confianza.",
        FALLBACK_MARKER
    )
}

/// Apply the tie policy to a raw draw.
///
/// Elimination phases cannot end level: home loses a goal, or away gets one
/// when home has none.
pub fn settle_score(phase: &Phase, home: u32, away: u32) -> Score {
    if !phase.is_elimination() || home != away {
        return Score::new(home, away);
    }

    if home > 0 {
        Score::new(home - 1, away)
    } else {
        Score::new(home, 1)
    }
}

/// Uniform 0..=3 goals per side, then the tie policy
pub fn fallback_score<R: Rng + ?Sized>(phase: &Phase, rng: &mut R) -> Score {
    let home = rng.gen_range(0..=MAX_FALLBACK_GOALS);
    let away = rng.gen_range(0..=MAX_FALLBACK_GOALS);
    settle_score(phase, home, away)
}

/// Low-confidence prediction used when generation is exhausted or unavailable
pub fn fallback_prediction<R: Rng + ?Sized>(phase: &Phase, rng: &mut R) -> AiPrediction {
    AiPrediction {
        predicted_score: fallback_score(phase, rng),
        confidence: Confidence::Low,
        reasoning: fallback_reasoning(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::is_fallback;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_final_draw_is_broken() {
        assert_eq!(settle_score(&Phase::Final, 2, 2), Score::new(1, 2));
        assert_eq!(settle_score(&Phase::Final, 0, 0), Score::new(0, 1));
        assert_eq!(settle_score(&Phase::Final, 3, 1), Score::new(3, 1));
    }

    #[test]
    fn test_group_draw_is_kept() {
        assert_eq!(settle_score(&Phase::Group, 2, 2), Score::new(2, 2));
    }

    #[test]
    fn test_elimination_fallbacks_never_tie() {
        let mut rng = StdRng::seed_from_u64(7);
        for phase in [Phase::RoundOf32, Phase::RoundOf16, Phase::Quarter, Phase::Semi, Phase::ThirdPlace, Phase::Final] {
            for _ in 0..200 {
                let score = fallback_score(&phase, &mut rng);
                assert!(!score.is_draw(), "{} produced {}", phase, score);
                assert!(score.home <= MAX_FALLBACK_GOALS && score.away <= MAX_FALLBACK_GOALS);
            }
        }
    }

    #[test]
    fn test_group_fallbacks_can_tie() {
        let mut rng = StdRng::seed_from_u64(42);
        let draws = (0..500)
            .map(|_| fallback_score(&Phase::Group, &mut rng))
            .filter(|s| s.is_draw())
            .count();
        assert!(draws > 0);
        assert!(draws < 500);
    }

    #[test]
    fn test_fallback_prediction_is_marked() {
        let mut rng = StdRng::seed_from_u64(1);
        let prediction = fallback_prediction(&Phase::Group, &mut rng);
        assert_eq!(prediction.confidence, Confidence::Low);

        let json = serde_json::to_string(&prediction).unwrap();
        assert!(is_fallback(None, Some(&json)));
    }
}
