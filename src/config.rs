use clap::Parser;
use std::time::Duration;

use crate::game::{session::DEFAULT_LOSING_SCORE, Pacing, PlayRule, Rules};

#[derive(Debug, Clone, Parser)]
#[command(name = "gongzhu")]
#[command(about = "Four-player trick-taking card game server")]
pub struct Config {
    /// Address to bind
    #[arg(long, env = "BIND_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// Whether players must follow the lead suit when able
    #[arg(long, env = "PLAY_RULE", value_enum, default_value_t = PlayRule::Free)]
    pub play_rule: PlayRule,

    /// The game ends once any total reaches this score or lower
    #[arg(long, env = "LOSING_SCORE", default_value_t = DEFAULT_LOSING_SCORE, allow_hyphen_values = true)]
    pub losing_score: i32,

    /// Delay after a card is played before the next turn (ms)
    #[arg(long, env = "TURN_DELAY_MS", default_value_t = 300)]
    pub turn_delay_ms: u64,

    /// Delay after the fourth card before the trick is resolved (ms)
    #[arg(long, env = "TRICK_DELAY_MS", default_value_t = 1000)]
    pub trick_delay_ms: u64,

    /// Delay after a trick is resolved before play continues (ms)
    #[arg(long, env = "SETTLE_DELAY_MS", default_value_t = 1500)]
    pub settle_delay_ms: u64,

    /// Delay after a deal before the first turn (ms)
    #[arg(long, env = "DEAL_DELAY_MS", default_value_t = 1000)]
    pub deal_delay_ms: u64,

    /// Delay after a round summary before the next deal (ms)
    #[arg(long, env = "REDEAL_DELAY_MS", default_value_t = 3000)]
    pub redeal_delay_ms: u64,
}

impl Config {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn rules(&self) -> Rules {
        Rules {
            play_rule: self.play_rule,
            losing_score: self.losing_score,
            pacing: Pacing {
                after_play: Duration::from_millis(self.turn_delay_ms),
                before_resolve: Duration::from_millis(self.trick_delay_ms),
                after_resolve: Duration::from_millis(self.settle_delay_ms),
                after_deal: Duration::from_millis(self.deal_delay_ms),
                between_rounds: Duration::from_millis(self.redeal_delay_ms),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_game_rules() {
        let config = Config::try_parse_from(["gongzhu"]).unwrap();
        assert_eq!(config.port, 3001);
        assert_eq!(config.rules(), Rules::default());
    }

    #[test]
    fn test_overrides() {
        let config = Config::try_parse_from([
            "gongzhu",
            "--port",
            "8080",
            "--play-rule",
            "follow-suit",
            "--losing-score",
            "-500",
            "--turn-delay-ms",
            "0",
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        let rules = config.rules();
        assert_eq!(rules.play_rule, PlayRule::FollowSuit);
        assert_eq!(rules.losing_score, -500);
        assert_eq!(rules.pacing.after_play, Duration::ZERO);
    }

    #[test]
    fn test_unknown_play_rule_is_rejected() {
        assert!(Config::try_parse_from(["gongzhu", "--play-rule", "anything"]).is_err());
    }
}
