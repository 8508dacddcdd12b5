//! Confidence-weighted (Bayesian) rating.
//!
//! A player's stored rating is blended with [`BASELINE_RATING`] as if the baseline had
//! been observed over `confidence_factor` virtual matches:
//!
//! ```text
//! n      = matches the player took part in
//! rating = round((stored * n + 1500 * c) / (n + c))
//! ```
//!
//! Few matches keep the displayed number near 1500; a long history lets the stored
//! rating dominate. Always recomputed from current match history, never cached.

use crate::models::{Match, Player, BASELINE_RATING};

/// Virtual prior match count used when none is configured.
pub const DEFAULT_CONFIDENCE_FACTOR: u32 = 100;

/// Number of matches in which the player sits on either side.
pub fn matches_played(player_id: &str, matches: &[Match]) -> usize {
    matches.iter().filter(|m| m.involves(player_id)).count()
}

/// Bayesian rating of `player` given the full match history.
///
/// An absent player rates at the baseline, as does a player with no matches and a
/// zero confidence factor (no evidence and no prior).
pub fn bayesian_rating(player: Option<&Player>, matches: &[Match], confidence_factor: u32) -> i32 {
    let Some(player) = player else {
        return BASELINE_RATING;
    };
    let n = matches_played(&player.id, matches) as i64;
    let c = i64::from(confidence_factor);
    let weight = n + c;
    if weight == 0 {
        return BASELINE_RATING;
    }
    let blended = i64::from(player.rating) * n + i64::from(BASELINE_RATING) * c;
    // A weighted mean of two i32 values always fits in i32.
    round_half_up(blended, weight) as i32
}

/// `num / den` rounded to the nearest integer, halves toward +infinity. `den` must be positive.
fn round_half_up(num: i64, den: i64) -> i64 {
    (2 * num + den).div_euclid(2 * den)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchFormat, PlayerRef};

    fn player(id: &str, rating: i32) -> Player {
        let mut p = Player::new("P", rating);
        p.id = id.to_string();
        p
    }

    fn matches_for(id: &str, count: usize) -> Vec<Match> {
        (0..count)
            .map(|i| {
                let opponent = format!("opp{i}");
                if i % 2 == 0 {
                    Match::new(PlayerRef::id(id), PlayerRef::id(opponent), MatchFormat::BestOf3)
                } else {
                    Match::new(PlayerRef::id(opponent), PlayerRef::id(id), MatchFormat::BestOf3)
                }
            })
            .collect()
    }

    #[test]
    fn no_matches_is_baseline() {
        let p = player("1", 1500);
        assert_eq!(bayesian_rating(Some(&p), &[], 100), 1500);
        let strong = player("1", 2400);
        for c in [1, 10, 100, 1000] {
            assert_eq!(bayesian_rating(Some(&strong), &[], c), 1500);
        }
    }

    #[test]
    fn hundred_matches_blends_halfway() {
        let p = player("1", 1800);
        let history = matches_for("1", 100);
        assert_eq!(bayesian_rating(Some(&p), &history, 100), 1650);
    }

    #[test]
    fn absent_player_is_baseline() {
        assert_eq!(bayesian_rating(None, &matches_for("1", 5), 100), 1500);
    }

    #[test]
    fn zero_confidence_uses_stored_rating_once_matches_exist() {
        let p = player("1", 1720);
        assert_eq!(bayesian_rating(Some(&p), &[], 0), 1500);
        assert_eq!(bayesian_rating(Some(&p), &matches_for("1", 1), 0), 1720);
    }

    #[test]
    fn long_history_converges_to_stored_rating() {
        let p = player("1", 1800);
        let short = bayesian_rating(Some(&p), &matches_for("1", 10), 100);
        let long = bayesian_rating(Some(&p), &matches_for("1", 10_000), 100);
        assert!(short < long);
        assert!((1800 - long).abs() <= 3);
    }

    #[test]
    fn order_of_history_does_not_matter() {
        let p = player("1", 1900);
        let mut history = matches_for("1", 7);
        history.extend(matches_for("2", 5));
        let forward = bayesian_rating(Some(&p), &history, 100);
        history.reverse();
        assert_eq!(bayesian_rating(Some(&p), &history, 100), forward);
    }

    #[test]
    fn halves_round_up_like_math_round() {
        assert_eq!(round_half_up(3, 2), 2);
        assert_eq!(round_half_up(-3, 2), -1);
        assert_eq!(round_half_up(5, 4), 1);
    }

    #[test]
    fn other_players_matches_are_not_counted() {
        let history = matches_for("2", 4);
        assert_eq!(matches_played("1", &history), 0);
        assert_eq!(matches_played("2", &history), 4);
    }
}
