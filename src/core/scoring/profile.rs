use std::collections::HashMap;

use super::EventScorer;
use crate::models::{normalize_sport, Event, SkillLevel, UserProfile};

/// Scores candidates against a user's declared sport preferences
#[derive(Debug, Clone, Default)]
pub struct ProfileScorer {
    /// Normalized sport name -> preferred skill, `None` when the stored skill is unknown
    preferred: HashMap<String, Option<SkillLevel>>,
}

impl ProfileScorer {
    pub fn new(profile: &UserProfile) -> Self {
        let preferred = profile
            .sports_of_preference
            .iter()
            .map(|(sport, skill)| {
                let level = skill.parse::<SkillLevel>().ok();
                if level.is_none() {
                    tracing::debug!(
                        "User {} prefers {} at unknown skill {:?}",
                        profile.user_id,
                        sport,
                        skill
                    );
                }
                (normalize_sport(sport), level)
            })
            .collect();

        Self { preferred }
    }
}

impl EventScorer for ProfileScorer {
    /// Half a point for a preferred sport, the other half for the preferred skill.
    ///
    /// Always one of `0.0`, `0.5` or `1.0`.
    fn score(&self, candidate: &Event) -> f64 {
        let Some(preferred_skill) = self.preferred.get(&normalize_sport(&candidate.sport_type))
        else {
            return 0.0;
        };

        let mut points = 1.0;
        if preferred_skill.is_some_and(|skill| candidate.required_skill_level.contains(&skill)) {
            points += 1.0;
        }

        points / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memory::sample_event;

    fn profile(prefs: &[(&str, &str)]) -> UserProfile {
        UserProfile {
            user_id: "u1".to_string(),
            sports_of_preference: prefs
                .iter()
                .map(|(sport, skill)| (sport.to_string(), skill.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_no_preferences_scores_zero() {
        let scorer = ProfileScorer::new(&profile(&[]));
        let mut event = sample_event("e", 13.4, 52.5);
        event.required_skill_level.insert(SkillLevel::Beginner);

        assert_eq!(scorer.score(&event), 0.0);
    }

    #[test]
    fn test_sport_and_skill_match() {
        let scorer = ProfileScorer::new(&profile(&[("soccer", "intermediate")]));

        let mut both = sample_event("both", 13.4, 52.5);
        both.required_skill_level.insert(SkillLevel::Intermediate);
        assert_eq!(scorer.score(&both), 1.0);

        let mut sport_only = sample_event("sport", 13.4, 52.5);
        sport_only.required_skill_level.insert(SkillLevel::Advanced);
        assert_eq!(scorer.score(&sport_only), 0.5);

        let mut other_sport = sample_event("other", 13.4, 52.5);
        other_sport.sport_type = "Tennis".to_string();
        other_sport.required_skill_level.insert(SkillLevel::Intermediate);
        assert_eq!(scorer.score(&other_sport), 0.0);
    }

    #[test]
    fn test_sport_names_are_normalized() {
        let scorer = ProfileScorer::new(&profile(&[("  Beach  Volleyball ", "BEGINNER")]));
        let mut event = sample_event("e", 13.4, 52.5);
        event.sport_type = "beach volleyball".to_string();
        event.required_skill_level.insert(SkillLevel::Beginner);

        assert_eq!(scorer.score(&event), 1.0);
    }

    #[test]
    fn test_unknown_skill_keeps_sport_point() {
        let scorer = ProfileScorer::new(&profile(&[("soccer", "wizard")]));
        let mut event = sample_event("e", 13.4, 52.5);
        event.required_skill_level.insert(SkillLevel::Beginner);

        assert_eq!(scorer.score(&event), 0.5);
    }
}
