use std::collections::HashSet;

use anyhow::{Result, bail};
use game_physics::GameKind;
use regex::Regex;

/// Seed used when no tokens are supplied.
pub const DEFAULT_SEED: &str = "alpha-1";

/// Upper bound on seeds produced by a single range token.
const MAX_RANGE_LEN: u64 = 10_000;

const RANGE_PATTERN: &str = r"^(?P<prefix>.*)\{(?P<start>\d+)\.\.(?P<end>\d+)\}(?P<suffix>.*)$";

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Resolve CLI seed tokens into an ordered, de-duplicated seed list.
///
/// A token of the form `prefix{a..b}suffix` expands to every seed with an
/// inclusive integer in place of the braces.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<String>> {
    let range = Regex::new(RANGE_PATTERN)?;
    let mut seen = HashSet::new();
    let mut seeds = Vec::new();

    for token in tokens {
        for seed in expand_token(&range, token)? {
            if seen.insert(seed.clone()) {
                seeds.push(seed);
            }
        }
    }

    if seeds.is_empty() {
        seeds.push(DEFAULT_SEED.to_string());
    }
    Ok(seeds)
}

fn expand_token(range: &Regex, token: &str) -> Result<Vec<String>> {
    let Some(caps) = range.captures(token) else {
        return Ok(vec![token.to_string()]);
    };
    let start: u64 = caps["start"].parse()?;
    let end: u64 = caps["end"].parse()?;
    if start > end {
        bail!("seed range {token} runs backwards");
    }
    if end - start >= MAX_RANGE_LEN {
        bail!("seed range {token} expands to more than {MAX_RANGE_LEN} seeds");
    }
    let (prefix, suffix) = (&caps["prefix"], &caps["suffix"]);
    Ok((start..=end)
        .map(|n| format!("{prefix}{n}{suffix}"))
        .collect())
}

/// Parse the `--games` list; `all` selects every game.
pub fn resolve_games(tokens: &[String]) -> Result<Vec<GameKind>> {
    let mut games = Vec::new();
    for token in tokens {
        if token.eq_ignore_ascii_case("all") {
            return Ok(GameKind::ALL.to_vec());
        }
        match token.parse::<GameKind>() {
            Ok(kind) if !games.contains(&kind) => games.push(kind),
            Ok(_) => {}
            Err(err) => bail!(err),
        }
    }
    if games.is_empty() {
        bail!("no games selected");
    }
    Ok(games)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &str) -> Vec<String> {
        split_csv(raw)
    }

    #[test]
    fn split_csv_trims_and_filters() {
        assert_eq!(split_csv(" a, ,b,  c "), vec!["a", "b", "c"]);
    }

    #[test]
    fn ranges_expand_and_dedupe() {
        let seeds = resolve_seed_inputs(&tokens("run-{1..3},run-2,alpha-1")).unwrap();
        assert_eq!(seeds, vec!["run-1", "run-2", "run-3", "alpha-1"]);

        let seeds = resolve_seed_inputs(&tokens("s{8..10}x")).unwrap();
        assert_eq!(seeds, vec!["s8x", "s9x", "s10x"]);
    }

    #[test]
    fn bad_ranges_are_refused() {
        assert!(resolve_seed_inputs(&tokens("s{5..1}")).is_err());
        assert!(resolve_seed_inputs(&tokens("s{0..20000}")).is_err());
    }

    #[test]
    fn empty_input_falls_back_to_default() {
        assert_eq!(resolve_seed_inputs(&[]).unwrap(), vec![DEFAULT_SEED]);
    }

    #[test]
    fn games_parse_with_all_shortcut() {
        assert_eq!(resolve_games(&tokens("all")).unwrap(), GameKind::ALL.to_vec());
        assert_eq!(
            resolve_games(&tokens("Warp,warp,rocketsol")).unwrap(),
            vec![GameKind::Warp, GameKind::RocketSol]
        );
        assert!(resolve_games(&tokens("pong")).is_err());
        assert!(resolve_games(&[]).is_err());
    }
}
